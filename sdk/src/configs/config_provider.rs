use crate::error::RelayError;
use crate::validatable::Validatable;
use async_trait::async_trait;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;
use tracing::{info, warn};

const DEFAULT_CONFIG_PROVIDER: &str = "file";
/// Prefix of environment overrides, `__` separates nested keys, e.g. `PINGRELAY_BROKER__URI`.
pub const ENV_PREFIX: &str = "PINGRELAY_";
pub const CONFIG_PATH_ENV: &str = "PINGRELAY_CONFIG_PATH";
const ENV_NESTING_SEPARATOR: &str = "__";

#[async_trait]
pub trait ConfigProvider<T> {
    async fn load_config(&self) -> Result<T, RelayError>;
}

#[derive(Debug)]
pub struct FileConfigProvider {
    path: String,
}

impl FileConfigProvider {
    pub fn new(path: String) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Picks the config provider; the path comes from `PINGRELAY_CONFIG_PATH` when set.
pub fn resolve<T>(
    config_provider_type: &str,
    default_path: &str,
) -> Result<Box<dyn ConfigProvider<T> + Send + Sync>, RelayError>
where
    T: DeserializeOwned + Serialize + Default + Display + Validatable<RelayError> + Send + 'static,
{
    match config_provider_type {
        DEFAULT_CONFIG_PROVIDER => {
            let path =
                std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| default_path.to_owned());
            Ok(Box::new(FileConfigProvider::new(path)))
        }
        _ => Err(RelayError::CannotLoadConfiguration(format!(
            "Invalid configuration provider: {config_provider_type}"
        ))),
    }
}

#[async_trait]
impl<T> ConfigProvider<T> for FileConfigProvider
where
    T: DeserializeOwned + Serialize + Default + Display + Validatable<RelayError> + Send + 'static,
{
    async fn load_config(&self) -> Result<T, RelayError> {
        info!("Loading config from path: '{}'...", self.path);
        let mut config_builder = Figment::from(Serialized::defaults(T::default()));

        if Path::new(&self.path).is_file() {
            let extension = Path::new(&self.path)
                .extension()
                .and_then(|extension| extension.to_str())
                .unwrap_or_default();
            config_builder = match extension {
                "json" => config_builder.merge(Json::file(&self.path)),
                "toml" => config_builder.merge(Toml::file(&self.path)),
                e => {
                    return Err(RelayError::CannotLoadConfiguration(format!(
                        "invalid file extension: {e}, only .json and .toml are supported."
                    )));
                }
            };
        } else {
            warn!(
                "Cannot find configuration file at path: '{}', using defaults.",
                self.path
            );
        }

        let config: T = config_builder
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_NESTING_SEPARATOR))
            .extract()
            .map_err(|error| {
                RelayError::CannotLoadConfiguration(format!(
                    "Failed to load configuration: {error}"
                ))
            })?;

        config.validate()?;
        info!("Using config: {config}");
        Ok(config)
    }
}
