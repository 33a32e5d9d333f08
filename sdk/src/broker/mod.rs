//! Broker seam.
//!
//! The relay publisher, the queue consumer and the connection supervisor only
//! talk to the broker through these traits. `amqp` provides the production
//! binding; tests plug in fakes.

pub mod amqp;

use crate::error::RelayError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt::{Display, Formatter};

/// Queue that receives relayed pings.
pub const PING_EVENTS_QUEUE: &str = "ping_events";

/// Deliveries pushed by the broker to a consumer, already acknowledged.
pub type DeliveryStream = BoxStream<'static, Result<Bytes, RelayError>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerDialer: Send + Sync {
    /// Performs exactly one connection attempt.
    async fn dial(&self) -> Result<Box<dyn BrokerConnection>, RelayError>;
}

#[async_trait]
pub trait BrokerConnection: Send + Sync {
    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, RelayError>;
    fn is_connected(&self) -> bool;
    async fn close(&self) -> Result<(), RelayError>;
}

/// Logical sub-session over a connection. Implementations are not required to
/// tolerate concurrent publishes; callers serialize access.
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    async fn declare_queue(&self, queue: &QueueSpec) -> Result<(), RelayError>;
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), RelayError>;
    async fn consume(&self, queue: &str) -> Result<DeliveryStream, RelayError>;
    fn is_open(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSpec {
    pub name: String,
    pub durable: bool,
    pub exclusive: bool,
    pub auto_delete: bool,
}

impl QueueSpec {
    /// Non-durable, non-exclusive queue that is kept when its last consumer leaves.
    pub fn transient(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            durable: false,
            exclusive: false,
            auto_delete: false,
        }
    }
}

impl Default for QueueSpec {
    fn default() -> Self {
        Self::transient(PING_EVENTS_QUEUE)
    }
}

impl Display for QueueSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ name: {}, durable: {}, exclusive: {}, auto_delete: {} }}",
            self.name, self.durable, self.exclusive, self.auto_delete
        )
    }
}

/// An established connection together with the single channel opened on it.
pub struct BrokerSession {
    connection: Box<dyn BrokerConnection>,
    channel: Box<dyn BrokerChannel>,
}

impl BrokerSession {
    pub fn new(connection: Box<dyn BrokerConnection>, channel: Box<dyn BrokerChannel>) -> Self {
        Self {
            connection,
            channel,
        }
    }

    pub fn channel(&self) -> &dyn BrokerChannel {
        self.channel.as_ref()
    }

    pub fn is_healthy(&self) -> bool {
        self.connection.is_connected() && self.channel.is_open()
    }

    pub async fn close(self) -> Result<(), RelayError> {
        self.connection.close().await
    }
}

impl std::fmt::Debug for BrokerSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerSession")
            .field("healthy", &self.is_healthy())
            .finish()
    }
}
