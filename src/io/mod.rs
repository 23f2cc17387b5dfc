pub mod config_io;
pub mod local_store;
