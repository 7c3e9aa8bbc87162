pub mod backend;
pub mod config;
pub mod model;
pub mod presenter;
pub mod proxy;
pub mod store;
pub mod uploader;
pub mod utils;
