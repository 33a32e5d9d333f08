use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use pingrelay::broker::{BrokerChannel, BrokerConnection, BrokerDialer, DeliveryStream, QueueSpec};
use pingrelay::error::RelayError;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// In-process stand-in for the AMQP broker: named queues, default exchange
/// routing and auto-ack delivery. Failures can be scripted per operation.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    dials: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct BrokerState {
    queues: HashMap<String, QueueState>,
    refused_dials: usize,
    failed_publishes: usize,
    declare_fails: bool,
}

#[derive(Debug)]
struct QueueState {
    spec: QueueSpec,
    pending: VecDeque<Bytes>,
    consumers: Vec<mpsc::UnboundedSender<Bytes>>,
    published: Vec<Bytes>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialer(&self) -> Arc<dyn BrokerDialer> {
        Arc::new(MemoryDialer {
            broker: self.clone(),
        })
    }

    pub fn refuse_next_dials(&self, count: usize) {
        self.state().refused_dials = count;
    }

    pub fn fail_next_publishes(&self, count: usize) {
        self.state().failed_publishes = count;
    }

    pub fn fail_declarations(&self) {
        self.state().declare_fails = true;
    }

    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn queue_spec(&self, queue: &str) -> Option<QueueSpec> {
        self.state().queues.get(queue).map(|state| state.spec.clone())
    }

    /// Every message accepted for `queue`, in publish order.
    pub fn published(&self, queue: &str) -> Vec<Bytes> {
        self.state()
            .queues
            .get(queue)
            .map(|state| state.published.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct MemoryDialer {
    broker: MemoryBroker,
}

#[async_trait]
impl BrokerDialer for MemoryDialer {
    async fn dial(&self) -> Result<Box<dyn BrokerConnection>, RelayError> {
        self.broker.dials.fetch_add(1, Ordering::SeqCst);
        let mut state = self.broker.state();
        if state.refused_dials > 0 {
            state.refused_dials -= 1;
            return Err(RelayError::CannotConnect("connection refused".to_owned()));
        }

        Ok(Box::new(MemoryConnection {
            broker: self.broker.clone(),
            open: Arc::new(AtomicBool::new(true)),
        }))
    }
}

struct MemoryConnection {
    broker: MemoryBroker,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl BrokerConnection for MemoryConnection {
    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, RelayError> {
        if !self.is_connected() {
            return Err(RelayError::CannotOpenChannel("connection is closed".to_owned()));
        }

        Ok(Box::new(MemoryChannel {
            broker: self.broker.clone(),
            open: self.open.clone(),
        }))
    }

    fn is_connected(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), RelayError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}

struct MemoryChannel {
    broker: MemoryBroker,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl BrokerChannel for MemoryChannel {
    async fn declare_queue(&self, queue: &QueueSpec) -> Result<(), RelayError> {
        let mut state = self.broker.state();
        if state.declare_fails {
            return Err(RelayError::CannotDeclareQueue {
                queue: queue.name.clone(),
                reason: "access refused".to_owned(),
            });
        }

        state
            .queues
            .entry(queue.name.clone())
            .or_insert_with(|| QueueState {
                spec: queue.clone(),
                pending: VecDeque::new(),
                consumers: Vec::new(),
                published: Vec::new(),
            });
        Ok(())
    }

    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), RelayError> {
        let mut state = self.broker.state();
        if state.failed_publishes > 0 {
            state.failed_publishes -= 1;
            return Err(RelayError::CannotPublish {
                queue: queue.to_owned(),
                reason: "resource locked".to_owned(),
            });
        }

        let Some(queue_state) = state.queues.get_mut(queue) else {
            return Err(RelayError::CannotPublish {
                queue: queue.to_owned(),
                reason: "no queue with this name".to_owned(),
            });
        };

        let message = Bytes::copy_from_slice(payload);
        queue_state.published.push(message.clone());
        queue_state.consumers.retain(|consumer| !consumer.is_closed());
        match queue_state.consumers.first() {
            Some(consumer) => {
                if let Err(mpsc::error::SendError(message)) = consumer.send(message) {
                    queue_state.pending.push_back(message);
                }
            }
            None => queue_state.pending.push_back(message),
        }
        Ok(())
    }

    async fn consume(&self, queue: &str) -> Result<DeliveryStream, RelayError> {
        let mut state = self.broker.state();
        let Some(queue_state) = state.queues.get_mut(queue) else {
            return Err(RelayError::CannotConsume {
                queue: queue.to_owned(),
                reason: "no queue with this name".to_owned(),
            });
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        while let Some(message) = queue_state.pending.pop_front() {
            // The receiver is alive, it is owned right here.
            let _ = sender.send(message);
        }
        queue_state.consumers.push(sender);
        Ok(UnboundedReceiverStream::new(receiver).map(Ok).boxed())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
