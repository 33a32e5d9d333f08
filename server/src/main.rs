use clap::Parser;
use pingrelay::broker::amqp::AmqpDialer;
use pingrelay::configs::config_provider::{self, ConfigProvider, FileConfigProvider};
use pingrelay::log::logger::Logging;
use pingrelay_server::args::Args;
use pingrelay_server::configs::server::ServerConfig;
use pingrelay_server::configs::DEFAULT_CONFIG_PATH;
use pingrelay_server::server;
use pingrelay_server::server_error::ServerError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();
    let mut logging = Logging::new();
    logging.early_init()?;

    let config_provider: Box<dyn ConfigProvider<ServerConfig> + Send + Sync> = match args.config
    {
        Some(path) => Box::new(FileConfigProvider::new(path)),
        None => config_provider::resolve(&args.config_provider, DEFAULT_CONFIG_PATH)?,
    };
    let config = config_provider.load_config().await?;
    logging.late_init("pingrelay-server", &config.logging)?;

    if let Err(error) = run(config).await {
        error!("Ping relay server has finished, due to an error: {error}");
        return Err(error);
    }

    info!("Ping relay server has shut down.");
    Ok(())
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let listener = server::bind(&config.grpc.address).await?;
    let dialer = Arc::new(AmqpDialer::new(&config.broker.uri));
    let publisher = server::start_publisher(dialer, &config.broker).await?;

    let shutdown = CancellationToken::new();
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for the shutdown signal: {error}");
            return;
        }
        info!("Received CTRL-C, shutting down...");
        ctrl_c_shutdown.cancel();
    });

    server::serve(listener, publisher, shutdown).await
}
