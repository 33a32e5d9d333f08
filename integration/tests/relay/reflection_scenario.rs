use integration::memory_broker::MemoryBroker;
use integration::test_server::TestServer;
use tonic::transport::Endpoint;
use tonic_reflection::pb::v1::server_reflection_client::ServerReflectionClient;
use tonic_reflection::pb::v1::server_reflection_request::MessageRequest;
use tonic_reflection::pb::v1::server_reflection_response::MessageResponse;
use tonic_reflection::pb::v1::ServerReflectionRequest;

#[tokio::test]
async fn reflection_should_list_the_ping_service() {
    let broker = MemoryBroker::new();
    let server = TestServer::start(&broker).await.unwrap();
    let channel = Endpoint::from_shared(server.server_address())
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut client = ServerReflectionClient::new(channel);
    let request = ServerReflectionRequest {
        host: String::new(),
        message_request: Some(MessageRequest::ListServices(String::new())),
    };

    let mut responses = client
        .server_reflection_info(tokio_stream::once(request))
        .await
        .unwrap()
        .into_inner();
    let response = responses.message().await.unwrap().unwrap();

    let listed = match response.message_response {
        Some(MessageResponse::ListServicesResponse(listed)) => listed,
        other => panic!("Unexpected reflection response: {other:?}"),
    };
    let services: Vec<_> = listed
        .service
        .into_iter()
        .map(|service| service.name)
        .collect();
    assert!(services.contains(&"benchmark.PingService".to_owned()));
    server.stop().await.unwrap();
}
