pub mod args;
pub mod configs;
pub mod processor;
pub mod worker;
pub mod worker_error;
