use async_trait::async_trait;
use bytes::Bytes;
use integration::memory_broker::MemoryBroker;
use integration::test_server::{fast_broker_config, TestServer};
use pingrelay::consumer::MessageHandler;
use pingrelay::error::RelayError;
use pingrelay_bench::benchmark::BenchmarkDriver;
use pingrelay_bench::client::GrpcPingClient;
use pingrelay_worker::worker::{run_until_signal, spawn_consumer};
use pingrelay_worker::worker_error::WorkerError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingHandler {
    received: Mutex<Vec<String>>,
}

impl RecordingHandler {
    fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(&self, payload: Bytes) {
        self.received
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(&payload).into_owned());
    }
}

#[tokio::test]
async fn worker_should_process_every_relayed_ping_exactly_once() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();
    let handler = Arc::new(RecordingHandler::default());
    let shutdown = CancellationToken::new();
    let consumer_task = spawn_consumer(
        broker.dialer(),
        &fast_broker_config(),
        handler.clone(),
        shutdown.clone(),
    );
    let client = Arc::new(GrpcPingClient::connect_lazy(&server.server_address()).unwrap());

    let outcome = BenchmarkDriver::new(client, 10, "ping-").run().await;
    assert_eq!(outcome.table.succeeded(), 10);
    tokio::time::timeout(Duration::from_secs(5), async {
        while handler.count() < 10 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    shutdown.cancel();

    assert!(consumer_task.await.unwrap().is_ok());
    let mut received = handler.received.lock().unwrap().clone();
    received.sort();
    let mut expected: Vec<_> = (0..10).map(|i| format!("Ping received: ping-{i}")).collect();
    expected.sort();
    assert_eq!(received, expected);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn worker_should_exit_with_error_when_queue_declaration_fails() {
    let broker = MemoryBroker::new();
    broker.fail_declarations();
    let handler = Arc::new(RecordingHandler::default());
    let shutdown = CancellationToken::new();
    let consumer_task = spawn_consumer(
        broker.dialer(),
        &fast_broker_config(),
        handler.clone(),
        shutdown.clone(),
    );

    let signal = std::future::pending::<std::io::Result<()>>();

    let result = run_until_signal(consumer_task, shutdown, signal).await;

    assert!(matches!(
        result,
        Err(WorkerError::RelayError(RelayError::CannotDeclareQueue { .. }))
    ));
    assert_eq!(handler.count(), 0);
}
