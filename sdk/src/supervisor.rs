use crate::broker::{BrokerConnection, BrokerDialer, BrokerSession, QueueSpec};
use crate::error::RelayError;
use crate::retry::RetryPolicy;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Owns the dial-with-backoff policy used by both the relay publisher and the
/// queue consumer to obtain a broker session.
pub struct ConnectionSupervisor {
    dialer: Arc<dyn BrokerDialer>,
    policy: RetryPolicy,
}

impl ConnectionSupervisor {
    pub fn new(dialer: Arc<dyn BrokerDialer>, policy: RetryPolicy) -> Self {
        Self { dialer, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Dials until a connection is established or the policy is exhausted.
    ///
    /// Delays between attempts grow by the policy's multiplier; there is no
    /// delay after the final attempt. Exhaustion is meant to be fatal for the
    /// calling process.
    pub async fn connect(&self) -> Result<Box<dyn BrokerConnection>, RelayError> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match self.dialer.dial().await {
                Ok(connection) => {
                    info!("Connected to broker on attempt {attempt}/{max_attempts}.");
                    return Ok(connection);
                }
                Err(error) => error,
            };

            warn!("Broker connection attempt {attempt}/{max_attempts} failed: {error}");
            if attempt >= max_attempts {
                error!("Cannot connect to broker after {max_attempts} attempts: {error}");
                return Err(RelayError::CannotEstablishConnection {
                    attempts: attempt,
                    reason: error.to_string(),
                });
            }

            let delay = self.policy.delay_after(attempt);
            info!("Retrying broker connection in: {delay:?}...");
            sleep(delay).await;
        }
    }

    /// Connects, opens the single channel of the session and declares the queue.
    pub async fn open_session(&self, queue: &QueueSpec) -> Result<BrokerSession, RelayError> {
        let connection = self.connect().await?;
        Self::declare_on(connection, queue).await
    }

    /// Same as [`Self::open_session`] with a single dial and no backoff, for callers
    /// that already run their own retry loop.
    pub async fn reopen_session(&self, queue: &QueueSpec) -> Result<BrokerSession, RelayError> {
        let connection = self.dialer.dial().await?;
        Self::declare_on(connection, queue).await
    }

    async fn declare_on(
        connection: Box<dyn BrokerConnection>,
        queue: &QueueSpec,
    ) -> Result<BrokerSession, RelayError> {
        let channel = match connection.open_channel().await {
            Ok(channel) => channel,
            Err(error) => {
                error!("Cannot open broker channel: {error}");
                Self::close_quietly(connection.as_ref()).await;
                return Err(error);
            }
        };

        if let Err(error) = channel.declare_queue(queue).await {
            error!("Cannot declare queue: {queue}, {error}");
            Self::close_quietly(connection.as_ref()).await;
            return Err(error);
        }

        info!("Declared queue: {queue}");
        Ok(BrokerSession::new(connection, channel))
    }

    async fn close_quietly(connection: &dyn BrokerConnection) {
        if let Err(error) = connection.close().await {
            warn!("Cannot close broker connection: {error}");
        }
    }
}
