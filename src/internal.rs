pub mod auth;
pub mod batch;
pub mod client;
pub mod error;
pub mod lister;
pub mod paths;
pub mod sync;
pub mod webdav;
