pub mod args;
pub mod configs;
pub mod handler;
pub mod server;
pub mod server_error;
