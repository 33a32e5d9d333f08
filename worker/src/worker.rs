use crate::worker_error::WorkerError;
use pingrelay::broker::BrokerDialer;
use pingrelay::configs::broker::BrokerConfig;
use pingrelay::consumer::{MessageHandler, QueueConsumer};
use pingrelay::error::RelayError;
use pingrelay::supervisor::ConnectionSupervisor;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the queue consumer on its own task until `shutdown` is cancelled or
/// the consumer gives up.
pub fn spawn_consumer(
    dialer: Arc<dyn BrokerDialer>,
    config: &BrokerConfig,
    handler: Arc<dyn MessageHandler>,
    shutdown: CancellationToken,
) -> JoinHandle<Result<(), RelayError>> {
    let supervisor = Arc::new(ConnectionSupervisor::new(
        dialer,
        config.connection_retry.to_policy(),
    ));
    let consumer = QueueConsumer::new(supervisor, config.queue.to_spec());
    tokio::spawn(async move { consumer.consume(handler, shutdown).await })
}

/// Waits for either the shutdown signal, which cancels the consumer and waits
/// for it to stop, or the consumer task finishing on its own.
pub async fn run_until_signal<S>(
    mut consumer_task: JoinHandle<Result<(), RelayError>>,
    shutdown: CancellationToken,
    signal: S,
) -> Result<(), WorkerError>
where
    S: Future<Output = io::Result<()>>,
{
    tokio::select! {
        result = &mut consumer_task => {
            result??;
            info!("Consumer has stopped.");
            return Ok(());
        }
        signal = signal => {
            signal?;
            info!("Received shutdown signal, stopping consumer...");
            shutdown.cancel();
        }
    }

    consumer_task.await??;
    info!("Consumer has stopped.");
    Ok(())
}
