use clap::Parser;
use pingrelay::broker::amqp::AmqpDialer;
use pingrelay::configs::config_provider::{self, ConfigProvider, FileConfigProvider};
use pingrelay::log::logger::Logging;
use pingrelay_worker::args::Args;
use pingrelay_worker::configs::{WorkerConfig, DEFAULT_CONFIG_PATH};
use pingrelay_worker::processor::LoggingProcessor;
use pingrelay_worker::worker;
use pingrelay_worker::worker_error::WorkerError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), WorkerError> {
    let args = Args::parse();
    let mut logging = Logging::new();
    logging.early_init()?;

    let config_provider: Box<dyn ConfigProvider<WorkerConfig> + Send + Sync> = match args.config
    {
        Some(path) => Box::new(FileConfigProvider::new(path)),
        None => config_provider::resolve(&args.config_provider, DEFAULT_CONFIG_PATH)?,
    };
    let config = config_provider.load_config().await?;
    logging.late_init("pingrelay-worker", &config.logging)?;

    let shutdown = CancellationToken::new();
    let consumer_task = worker::spawn_consumer(
        Arc::new(AmqpDialer::new(&config.broker.uri)),
        &config.broker,
        Arc::new(LoggingProcessor),
        shutdown.clone(),
    );
    info!(
        "Worker has started, consuming from queue: {}",
        config.broker.queue.name
    );

    if let Err(error) =
        worker::run_until_signal(consumer_task, shutdown, tokio::signal::ctrl_c()).await
    {
        error!("Worker has finished, due to an error: {error}");
        return Err(error);
    }

    info!("Worker has shut down.");
    Ok(())
}
