pub mod broker;
pub mod configs;
pub mod consumer;
pub mod error;
pub mod log;
pub mod proto;
pub mod publisher;
pub mod retry;
pub mod supervisor;
pub mod utils;
pub mod validatable;
