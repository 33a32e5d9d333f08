use pingrelay::configs::broker::BrokerConfig;
use pingrelay::configs::logging::LoggingConfig;
use pingrelay::error::RelayError;
use pingrelay::validatable::Validatable;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const DEFAULT_CONFIG_PATH: &str = "configs/worker.toml";
const DEFAULT_LOG_FILE_PREFIX: &str = "pingrelay-worker.log";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    pub broker: BrokerConfig,
    pub logging: LoggingConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            logging: LoggingConfig {
                file_prefix: DEFAULT_LOG_FILE_PREFIX.to_owned(),
                ..LoggingConfig::default()
            },
        }
    }
}

impl Validatable<RelayError> for WorkerConfig {
    fn validate(&self) -> Result<(), RelayError> {
        self.broker.validate()
    }
}

impl Display for WorkerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ broker: {}, logging: {} }}",
            self.broker, self.logging
        )
    }
}
