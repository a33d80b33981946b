pub mod config;
pub mod constants;
pub mod endpoint;
pub mod exchange;
pub mod message;
pub mod transcript;
