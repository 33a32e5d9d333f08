use crate::configs::server::{GrpcConfig, ServerConfig};
use pingrelay::error::RelayError;
use pingrelay::validatable::Validatable;
use std::net::SocketAddr;
use tracing::error;

impl Validatable<RelayError> for ServerConfig {
    fn validate(&self) -> Result<(), RelayError> {
        self.grpc.validate()?;
        self.broker.validate()?;
        Ok(())
    }
}

impl Validatable<RelayError> for GrpcConfig {
    fn validate(&self) -> Result<(), RelayError> {
        if self.address.parse::<SocketAddr>().is_err() {
            error!("gRPC configuration -> invalid address: {}", self.address);
            return Err(RelayError::InvalidConfiguration(format!(
                "grpc.address: {} is not a valid socket address",
                self.address
            )));
        }

        Ok(())
    }
}
