use pingrelay::error::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Relay error: {0}")]
    RelayError(#[from] RelayError),
    #[error("Consumer task has failed: {0}")]
    ConsumerTaskFailure(#[from] tokio::task::JoinError),
    #[error("Cannot listen for the shutdown signal: {0}")]
    SignalError(#[from] std::io::Error),
}
