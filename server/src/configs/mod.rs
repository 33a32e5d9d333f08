pub mod defaults;
pub mod displays;
pub mod server;
pub mod validators;

pub const DEFAULT_CONFIG_PATH: &str = "configs/server.toml";
