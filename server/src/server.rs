use crate::handler::PingHandler;
use crate::server_error::ServerError;
use pingrelay::broker::BrokerDialer;
use pingrelay::configs::broker::BrokerConfig;
use pingrelay::proto::ping_service_server::PingServiceServer;
use pingrelay::proto::FILE_DESCRIPTOR_SET;
use pingrelay::publisher::RelayPublisher;
use pingrelay::supervisor::ConnectionSupervisor;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic_reflection::server::v1::{ServerReflection, ServerReflectionServer};
use tracing::info;

/// Binds the gRPC listener before anything else touches the broker, so a taken
/// port fails fast.
pub async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::CannotBindListener {
            address: address.to_owned(),
            source,
        })?;
    info!("gRPC listener bound to: {}", listener.local_addr()?);
    Ok(listener)
}

/// Dials the broker with the connection policy and declares the relay queue.
pub async fn start_publisher(
    dialer: Arc<dyn BrokerDialer>,
    config: &BrokerConfig,
) -> Result<Arc<RelayPublisher>, ServerError> {
    let supervisor = Arc::new(ConnectionSupervisor::new(
        dialer,
        config.connection_retry.to_policy(),
    ));
    let publisher = RelayPublisher::start(
        supervisor,
        config.queue.to_spec(),
        config.publish_retry.to_policy(),
    )
    .await?;
    info!(
        "Relay publisher is ready, queue: {}, publish retry: {}",
        publisher.queue(),
        config.publish_retry
    );
    Ok(Arc::new(publisher))
}

/// Lets tools such as `grpcurl` discover `benchmark.PingService`.
pub fn reflection_service() -> Result<ServerReflectionServer<impl ServerReflection>, ServerError> {
    let service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;
    Ok(service)
}

/// Serves `PingService` and reflection on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    publisher: Arc<RelayPublisher>,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let reflection = reflection_service()?;
    let address = listener.local_addr()?;
    info!("Ping relay server has started on: {address}");
    Server::builder()
        .add_service(PingServiceServer::new(PingHandler::new(publisher)))
        .add_service(reflection)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            shutdown.cancelled().await
        })
        .await?;
    info!("Ping relay server on: {address} has stopped.");
    Ok(())
}
