use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid server address: {address}, {reason}")]
    InvalidServerAddress { address: String, reason: String },
    #[error("Ping call has failed: {0}")]
    CallFailed(#[from] tonic::Status),
    #[error("Cannot write report to: {path}, {reason}")]
    CannotWriteReport { path: String, reason: String },
}
