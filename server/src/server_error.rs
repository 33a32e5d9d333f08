use pingrelay::error::RelayError;
use thiserror::Error;
use tokio::io;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error")]
    IoError(#[from] io::Error),
    #[error("Cannot bind gRPC listener to: {address}, {source}")]
    CannotBindListener { address: String, source: io::Error },
    #[error("Relay error: {0}")]
    RelayError(#[from] RelayError),
    #[error("gRPC transport error: {0}")]
    TransportError(#[from] tonic::transport::Error),
    #[error("Cannot build gRPC reflection service: {0}")]
    CannotBuildReflectionService(#[from] tonic_reflection::server::Error),
}
