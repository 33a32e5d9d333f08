use crate::configs::server::{GrpcConfig, ServerConfig};
use pingrelay::configs::broker::BrokerConfig;
use pingrelay::configs::logging::LoggingConfig;

const DEFAULT_GRPC_ADDRESS: &str = "0.0.0.0:50051";
const DEFAULT_LOG_FILE_PREFIX: &str = "pingrelay-server.log";

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            grpc: GrpcConfig::default(),
            broker: BrokerConfig::default(),
            logging: LoggingConfig {
                file_prefix: DEFAULT_LOG_FILE_PREFIX.to_owned(),
                ..LoggingConfig::default()
            },
        }
    }
}

impl Default for GrpcConfig {
    fn default() -> GrpcConfig {
        GrpcConfig {
            address: DEFAULT_GRPC_ADDRESS.to_owned(),
        }
    }
}
