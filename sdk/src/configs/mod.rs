pub mod broker;
pub mod config_provider;
pub mod logging;
