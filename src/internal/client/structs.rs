pub mod cancel_flag;
pub mod client_config;
pub mod webdav_client;
