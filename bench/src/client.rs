use crate::bench_error::BenchError;
use async_trait::async_trait;
use pingrelay::proto::ping_service_client::PingServiceClient;
use pingrelay::proto::{PingRequest, PingResponse};
use tonic::transport::{Channel, Endpoint};

#[async_trait]
pub trait PingClient: Send + Sync {
    async fn ping(&self, message: String) -> Result<PingResponse, BenchError>;
}

/// `PingService` client over one HTTP/2 channel shared by every call.
///
/// The channel connects on first use, so an unreachable server surfaces as
/// failed calls rather than as a startup error.
#[derive(Debug, Clone)]
pub struct GrpcPingClient {
    client: PingServiceClient<Channel>,
}

impl GrpcPingClient {
    pub fn connect_lazy(server_address: &str) -> Result<Self, BenchError> {
        let uri = if server_address.contains("://") {
            server_address.to_owned()
        } else {
            format!("http://{server_address}")
        };
        let endpoint =
            Endpoint::from_shared(uri).map_err(|error| BenchError::InvalidServerAddress {
                address: server_address.to_owned(),
                reason: error.to_string(),
            })?;
        Ok(Self {
            client: PingServiceClient::new(endpoint.connect_lazy()),
        })
    }
}

#[async_trait]
impl PingClient for GrpcPingClient {
    async fn ping(&self, message: String) -> Result<PingResponse, BenchError> {
        let mut client = self.client.clone();
        let response = client.ping(PingRequest { message }).await?;
        Ok(response.into_inner())
    }
}
