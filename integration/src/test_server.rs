use crate::memory_broker::MemoryBroker;
use pingrelay::configs::broker::{BrokerConfig, RetryConfig};
use pingrelay::utils::duration::RelayDuration;
use pingrelay_server::server;
use pingrelay_server::server_error::ServerError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const LOCALHOST_EPHEMERAL_ADDRESS: &str = "127.0.0.1:0";

/// Broker config with the production attempt counts but millisecond delays.
pub fn fast_broker_config() -> BrokerConfig {
    let fast = |retry: RetryConfig| RetryConfig {
        initial_delay: RelayDuration::new(Duration::from_millis(10)),
        ..retry
    };
    let defaults = BrokerConfig::default();
    BrokerConfig {
        connection_retry: fast(defaults.connection_retry.clone()),
        publish_retry: fast(defaults.publish_retry.clone()),
        ..defaults
    }
}

/// The relay server running in-process on an ephemeral port.
pub struct TestServer {
    address: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub async fn start(broker: &MemoryBroker) -> Result<Self, ServerError> {
        Self::start_with(broker, &fast_broker_config()).await
    }

    pub async fn start_with(
        broker: &MemoryBroker,
        config: &BrokerConfig,
    ) -> Result<Self, ServerError> {
        let listener = server::bind(LOCALHOST_EPHEMERAL_ADDRESS).await?;
        let address = listener.local_addr()?;
        let publisher = server::start_publisher(broker.dialer(), config).await?;
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(server::serve(listener, publisher, shutdown.clone()));
        Ok(Self {
            address,
            shutdown,
            handle,
        })
    }

    pub fn server_address(&self) -> String {
        format!("http://{}", self.address)
    }

    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.cancel();
        match self.handle.await {
            Ok(result) => result,
            Err(error) => Err(ServerError::IoError(std::io::Error::other(error))),
        }
    }
}
