use async_trait::async_trait;
use bytes::Bytes;
use pingrelay::consumer::MessageHandler;
use tracing::info;

/// Processing step of the worker, logs every relayed ping.
#[derive(Debug, Default)]
pub struct LoggingProcessor;

#[async_trait]
impl MessageHandler for LoggingProcessor {
    async fn handle(&self, payload: Bytes) {
        info!("Processing message: {}", String::from_utf8_lossy(&payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn should_log_the_message_body() {
        LoggingProcessor
            .handle(Bytes::from_static(b"Ping received: ping-3"))
            .await;

        assert!(logs_contain("Processing message: Ping received: ping-3"));
    }

    #[tokio::test]
    #[traced_test]
    async fn should_log_invalid_utf8_lossily() {
        LoggingProcessor
            .handle(Bytes::from_static(&[b'p', 0xff, b'g']))
            .await;

        assert!(logs_contain("Processing message: p\u{fffd}g"));
    }
}
