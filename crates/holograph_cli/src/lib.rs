pub mod config_loader;
pub mod init;
pub mod serve;
