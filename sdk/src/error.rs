use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Cannot establish broker connection after {attempts} attempts: {reason}")]
    CannotEstablishConnection { attempts: u32, reason: String },
    #[error("Cannot connect to broker: {0}")]
    CannotConnect(String),
    #[error("Cannot open broker channel: {0}")]
    CannotOpenChannel(String),
    #[error("Cannot declare queue: {queue}, {reason}")]
    CannotDeclareQueue { queue: String, reason: String },
    #[error("Cannot publish message to queue: {queue}, {reason}")]
    CannotPublish { queue: String, reason: String },
    #[error("Failed to deliver message to queue: {queue} after {attempts} attempts")]
    DeliveryFailed { queue: String, attempts: u32 },
    #[error("Queue: {0} was not declared")]
    QueueNotDeclared(String),
    #[error("Cannot consume from queue: {queue}, {reason}")]
    CannotConsume { queue: String, reason: String },
    #[error("Cannot close broker connection: {0}")]
    CannotCloseConnection(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Cannot load configuration: {0}")]
    CannotLoadConfiguration(String),
    #[error("Logging initialization failure: {0}")]
    LoggingInitFailure(String),
}
