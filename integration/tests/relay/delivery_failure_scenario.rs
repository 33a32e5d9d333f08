use integration::memory_broker::MemoryBroker;
use integration::test_server::{fast_broker_config, TestServer};
use pingrelay::broker::PING_EVENTS_QUEUE;
use pingrelay::error::RelayError;
use pingrelay_bench::bench_error::BenchError;
use pingrelay_bench::benchmark::BenchmarkDriver;
use pingrelay_bench::client::{GrpcPingClient, PingClient};
use pingrelay_server::server_error::ServerError;
use std::sync::Arc;
use tonic::Code;

#[tokio::test]
async fn two_failed_publishes_should_be_masked_from_the_caller() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();
    broker.fail_next_publishes(2);
    let client = GrpcPingClient::connect_lazy(&server.server_address()).unwrap();

    let response = client.ping("ping-0".to_owned()).await.unwrap();

    assert_eq!(response.reply, "pong: ping-0");
    assert!(response.timestamp > 0);
    assert_eq!(broker.published(PING_EVENTS_QUEUE).len(), 1);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn exhausted_publish_retries_should_surface_as_unavailable() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();
    broker.fail_next_publishes(3);
    let client = GrpcPingClient::connect_lazy(&server.server_address()).unwrap();

    let result = client.ping("ping-0".to_owned()).await;

    let status = match result {
        Err(BenchError::CallFailed(status)) => status,
        other => panic!("expected a failed call, got: {other:?}"),
    };
    assert_eq!(status.code(), Code::Unavailable);
    assert!(status.message().contains("after 3 attempts"));
    assert!(broker.published(PING_EVENTS_QUEUE).is_empty());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn failed_calls_should_leave_empty_slots_in_the_batch() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();
    broker.fail_next_publishes(3);
    let client = Arc::new(GrpcPingClient::connect_lazy(&server.server_address()).unwrap());

    let outcome = BenchmarkDriver::new(client, 3, "ping-").run().await;

    assert_eq!(outcome.table.len(), 3);
    assert_eq!(outcome.table.succeeded(), 2);
    assert_eq!(outcome.table.failed(), 1);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn unreachable_server_should_fail_every_call_without_aborting() {
    let client = Arc::new(GrpcPingClient::connect_lazy("127.0.0.1:1").unwrap());

    let outcome = BenchmarkDriver::new(client, 3, "ping-").run().await;

    assert_eq!(outcome.table.len(), 3);
    assert_eq!(outcome.table.failed(), 3);
}

#[tokio::test]
async fn server_should_retry_the_broker_connection_before_serving() {
    let broker = MemoryBroker::new();
    broker.refuse_next_dials(2);

    let server = TestServer::start(&broker).await.unwrap();

    assert_eq!(broker.dials(), 3);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn server_should_not_start_when_the_broker_stays_unreachable() {
    let broker = MemoryBroker::new();
    broker.refuse_next_dials(usize::MAX);

    let result = TestServer::start_with(&broker, &fast_broker_config()).await;

    assert!(matches!(
        result,
        Err(ServerError::RelayError(RelayError::CannotEstablishConnection { attempts: 5, .. }))
    ));
    assert_eq!(broker.dials(), 5);
}
