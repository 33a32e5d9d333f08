pub mod file;
pub mod memory_broker;
pub mod test_server;
