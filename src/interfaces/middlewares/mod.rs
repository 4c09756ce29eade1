pub mod referer;
