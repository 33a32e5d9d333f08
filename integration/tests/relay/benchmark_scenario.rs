use integration::memory_broker::MemoryBroker;
use integration::test_server::TestServer;
use pingrelay::broker::PING_EVENTS_QUEUE;
use pingrelay_bench::benchmark::BenchmarkDriver;
use pingrelay_bench::client::GrpcPingClient;
use pingrelay_bench::report;
use std::sync::Arc;

#[tokio::test]
async fn every_concurrent_call_should_be_answered_and_relayed() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();
    let client = Arc::new(GrpcPingClient::connect_lazy(&server.server_address()).unwrap());
    let driver = BenchmarkDriver::new(client, 10, "ping-");

    let outcome = driver.run().await;

    assert_eq!(outcome.table.len(), 10);
    assert_eq!(outcome.table.succeeded(), 10);
    for (index, slot) in outcome.table.slots().iter().enumerate() {
        let record = slot.as_ref().unwrap();
        assert_eq!(record.index, index);
        assert_eq!(record.reply, format!("pong: ping-{index}"));
        assert!(outcome.total_elapsed >= record.elapsed);
    }

    let mut relayed: Vec<_> = broker
        .published(PING_EVENTS_QUEUE)
        .iter()
        .map(|message| String::from_utf8(message.to_vec()).unwrap())
        .collect();
    relayed.sort();
    let mut expected: Vec<_> = (0..10).map(|i| format!("Ping received: ping-{i}")).collect();
    expected.sort();
    assert_eq!(relayed, expected);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn report_should_have_a_row_for_every_call() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();
    let client = Arc::new(GrpcPingClient::connect_lazy(&server.server_address()).unwrap());
    let outcome = BenchmarkDriver::new(client, 4, "ping-").run().await;
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("results.csv");

    report::save_report(&outcome.table, path.to_str().unwrap()).unwrap();

    let content = std::fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("id_chamada,tempo_em_ms"));
    for (index, line) in lines.enumerate() {
        let (id, millis) = line.split_once(',').unwrap();
        assert_eq!(id, index.to_string());
        assert_eq!(millis.split_once('.').unwrap().1.len(), 2);
    }
    assert_eq!(content.lines().count(), 5);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn server_should_declare_the_transient_ping_events_queue() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();

    let spec = broker.queue_spec(PING_EVENTS_QUEUE).unwrap();

    assert!(!spec.durable);
    assert!(!spec.exclusive);
    assert!(!spec.auto_delete);
    server.stop().await.unwrap();
}
