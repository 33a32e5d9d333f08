use pingrelay::proto::ping_service_server::PingService;
use pingrelay::proto::{PingRequest, PingResponse};
use pingrelay::publisher::RelayPublisher;
use pingrelay::utils::timestamp::RelayTimestamp;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{error, info};

pub const RELAY_MESSAGE_PREFIX: &str = "Ping received: ";
pub const REPLY_PREFIX: &str = "pong: ";

/// Answers pings only after the relay message reached the broker.
pub struct PingHandler {
    publisher: Arc<RelayPublisher>,
}

impl PingHandler {
    pub fn new(publisher: Arc<RelayPublisher>) -> Self {
        Self { publisher }
    }
}

pub fn relay_message(message: &str) -> String {
    format!("{RELAY_MESSAGE_PREFIX}{message}")
}

pub fn reply_for(message: &str) -> String {
    format!("{REPLY_PREFIX}{message}")
}

#[tonic::async_trait]
impl PingService for PingHandler {
    async fn ping(&self, request: Request<PingRequest>) -> Result<Response<PingResponse>, Status> {
        let message = request.into_inner().message;
        info!("Received ping: {message}");

        let queue = &self.publisher.queue().name;
        if let Err(error) = self
            .publisher
            .publish(queue, relay_message(&message).as_bytes())
            .await
        {
            error!("Cannot relay ping: {message}, {error}");
            return Err(Status::unavailable(error.to_string()));
        }

        Ok(Response::new(PingResponse {
            reply: reply_for(&message),
            timestamp: RelayTimestamp::now().as_millis(),
        }))
    }
}
