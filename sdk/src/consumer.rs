use crate::broker::QueueSpec;
use crate::error::RelayError;
use crate::supervisor::ConnectionSupervisor;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

/// Processing step invoked once per delivered message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: Bytes);
}

/// Drains a queue with automatic acknowledgement until shutdown is requested.
///
/// Messages count as delivered as soon as the broker pushes them, so a message
/// being handled when the process dies is lost.
pub struct QueueConsumer {
    supervisor: Arc<ConnectionSupervisor>,
    queue: QueueSpec,
}

impl QueueConsumer {
    pub fn new(supervisor: Arc<ConnectionSupervisor>, queue: QueueSpec) -> Self {
        Self { supervisor, queue }
    }

    /// Runs until `shutdown` is cancelled, which returns `Ok(())`.
    ///
    /// Returns an error when a session cannot be established or the queue cannot
    /// be declared or subscribed to. A delivery stream that fails or ends makes
    /// the consumer re-establish its session.
    pub async fn consume(
        &self,
        handler: Arc<dyn MessageHandler>,
        shutdown: CancellationToken,
    ) -> Result<(), RelayError> {
        let queue = &self.queue.name;
        loop {
            let session = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Ok(()),
                session = self.supervisor.open_session(&self.queue) => session?,
            };

            let mut deliveries = match session.channel().consume(queue).await {
                Ok(deliveries) => deliveries,
                Err(error) => {
                    error!("Cannot subscribe to queue: {queue}, {error}");
                    if let Err(error) = session.close().await {
                        trace!("Cannot close broker session: {error}");
                    }
                    return Err(error);
                }
            };
            info!("Waiting for messages on queue: {queue}...");

            loop {
                let delivery = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        info!("Shutdown requested, stopping consumer of queue: {queue}.");
                        if let Err(error) = session.close().await {
                            warn!("Cannot close broker session: {error}");
                        }
                        return Ok(());
                    }
                    delivery = deliveries.next() => delivery,
                };

                match delivery {
                    Some(Ok(payload)) => {
                        trace!("Received {} bytes from queue: {queue}", payload.len());
                        handler.handle(payload).await;
                    }
                    Some(Err(error)) => {
                        warn!("Delivery from queue: {queue} failed: {error}, reconnecting...");
                        break;
                    }
                    None => {
                        warn!("Delivery stream of queue: {queue} has ended, reconnecting...");
                        break;
                    }
                }
            }

            drop(deliveries);
            if let Err(error) = session.close().await {
                trace!("Cannot close stale broker session: {error}");
            }

            let delay = self.supervisor.policy().delay_after(1);
            info!("Re-subscribing to queue: {queue} in: {delay:?}...");
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Ok(()),
                _ = sleep(delay) => {}
            }
        }
    }
}
