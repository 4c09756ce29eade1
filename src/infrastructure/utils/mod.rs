pub mod image_sniff;
