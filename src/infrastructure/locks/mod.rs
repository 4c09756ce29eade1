pub mod synthesis_locks;
