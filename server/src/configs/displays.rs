use crate::configs::server::{GrpcConfig, ServerConfig};
use std::fmt::{Display, Formatter};

impl Display for ServerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ grpc: {}, broker: {}, logging: {} }}",
            self.grpc, self.broker, self.logging
        )
    }
}

impl Display for GrpcConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ address: {} }}", self.address)
    }
}
