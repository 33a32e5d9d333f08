use crate::broker::{BrokerSession, QueueSpec};
use crate::error::RelayError;
use crate::retry::RetryPolicy;
use crate::supervisor::ConnectionSupervisor;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{error, info, trace, warn};

/// Publishes relay messages to a declared queue over one shared channel.
///
/// The channel is guarded by a mutex that is held for the whole retry loop of a
/// publish, so at most one attempt sequence uses the channel at any instant.
/// This caps publish throughput at one in-flight message; a pool of sessions with
/// their own locks would lift that limit.
///
/// A dead session is re-established with a single dial between publish attempts,
/// so one publish holds the lock for at most the publish policy's delays plus one
/// dial per retry.
pub struct RelayPublisher {
    session: Mutex<BrokerSession>,
    queue: QueueSpec,
    policy: RetryPolicy,
    supervisor: Arc<ConnectionSupervisor>,
}

impl RelayPublisher {
    /// `session` must already have `queue` declared, see [`ConnectionSupervisor::open_session`].
    pub fn new(
        session: BrokerSession,
        queue: QueueSpec,
        policy: RetryPolicy,
        supervisor: Arc<ConnectionSupervisor>,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            queue,
            policy,
            supervisor,
        }
    }

    /// Establishes the session through the supervisor and declares the queue.
    pub async fn start(
        supervisor: Arc<ConnectionSupervisor>,
        queue: QueueSpec,
        policy: RetryPolicy,
    ) -> Result<Self, RelayError> {
        let session = supervisor.open_session(&queue).await?;
        Ok(Self::new(session, queue, policy, supervisor))
    }

    pub fn queue(&self) -> &QueueSpec {
        &self.queue
    }

    pub async fn publish(&self, queue_name: &str, payload: &[u8]) -> Result<(), RelayError> {
        if queue_name != self.queue.name {
            return Err(RelayError::QueueNotDeclared(queue_name.to_owned()));
        }

        let max_attempts = self.policy.max_attempts();
        let mut session = self.session.lock().await;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match session.channel().publish(queue_name, payload).await {
                Ok(()) => {
                    trace!(
                        "Published {} bytes to queue: {queue_name}, attempt: {attempt}.",
                        payload.len()
                    );
                    return Ok(());
                }
                Err(error) => {
                    warn!("Publish to: {queue_name} failed ({attempt}/{max_attempts}): {error}");
                }
            }

            if attempt >= max_attempts {
                break;
            }

            let delay = self.policy.delay_after(attempt);
            info!("Retrying publish to queue: {queue_name} in: {delay:?}...");
            sleep(delay).await;

            if !session.is_healthy() {
                warn!("Broker session is closed, re-establishing it...");
                match self.supervisor.reopen_session(&self.queue).await {
                    Ok(new_session) => {
                        let old_session = std::mem::replace(&mut *session, new_session);
                        if let Err(error) = old_session.close().await {
                            trace!("Cannot close stale broker session: {error}");
                        }
                        info!("Broker session re-established.");
                    }
                    Err(error) => {
                        error!("Cannot re-establish broker session: {error}");
                    }
                }
            }
        }

        error!("Cannot publish message to queue: {queue_name} after {max_attempts} attempts.");
        Err(RelayError::DeliveryFailed {
            queue: queue_name.to_owned(),
            attempts: attempt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{
        BrokerChannel, BrokerConnection, BrokerDialer, DeliveryStream, MockBrokerDialer,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Channel whose publish outcome is scripted per attempt and which records
    /// whether two publishes ever overlapped.
    #[derive(Default)]
    struct ScriptedChannel {
        failures_before_success: usize,
        always_fail: bool,
        open: AtomicBool,
        publish_latency: Duration,
        attempts: AtomicUsize,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
        published: std::sync::Mutex<Vec<Vec<u8>>>,
    }

    impl ScriptedChannel {
        fn failing_times(failures_before_success: usize) -> Self {
            Self {
                failures_before_success,
                open: AtomicBool::new(true),
                ..Self::default()
            }
        }

        fn always_failing() -> Self {
            Self {
                always_fail: true,
                open: AtomicBool::new(true),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl BrokerChannel for Arc<ScriptedChannel> {
        async fn declare_queue(&self, _queue: &QueueSpec) -> Result<(), RelayError> {
            Ok(())
        }

        async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), RelayError> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            if !self.publish_latency.is_zero() {
                sleep(self.publish_latency).await;
            }
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            self.in_flight.store(false, Ordering::SeqCst);

            if self.always_fail || attempt < self.failures_before_success {
                return Err(RelayError::CannotPublish {
                    queue: queue.to_owned(),
                    reason: "channel flow control".to_owned(),
                });
            }
            self.published.lock().unwrap().push(payload.to_vec());
            Ok(())
        }

        async fn consume(&self, queue: &str) -> Result<DeliveryStream, RelayError> {
            Err(RelayError::CannotConsume {
                queue: queue.to_owned(),
                reason: "not supported".to_owned(),
            })
        }

        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
        }
    }

    struct FixedConnection {
        channel: Arc<ScriptedChannel>,
    }

    #[async_trait]
    impl BrokerConnection for FixedConnection {
        async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, RelayError> {
            Ok(Box::new(self.channel.clone()))
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn close(&self) -> Result<(), RelayError> {
            Ok(())
        }
    }

    fn session_over(channel: Arc<ScriptedChannel>) -> BrokerSession {
        BrokerSession::new(
            Box::new(FixedConnection {
                channel: channel.clone(),
            }),
            Box::new(channel),
        )
    }

    fn unused_supervisor() -> Arc<ConnectionSupervisor> {
        let mut dialer = MockBrokerDialer::new();
        dialer.expect_dial().never();
        Arc::new(ConnectionSupervisor::new(
            Arc::new(dialer),
            RetryPolicy::connection(),
        ))
    }

    fn publisher_over(channel: Arc<ScriptedChannel>) -> RelayPublisher {
        RelayPublisher::new(
            session_over(channel),
            QueueSpec::default(),
            RetryPolicy::publish(),
            unused_supervisor(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn should_attempt_exactly_three_times_when_channel_always_fails() {
        let channel = Arc::new(ScriptedChannel::always_failing());
        let publisher = publisher_over(channel.clone());
        let started_at = Instant::now();

        let result = publisher.publish("ping_events", b"Ping received: ping-1").await;

        assert!(matches!(
            result,
            Err(RelayError::DeliveryFailed { attempts: 3, .. })
        ));
        assert_eq!(channel.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(started_at.elapsed(), Duration::from_secs(4));
        assert!(channel.published.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_succeed_on_third_attempt_after_two_failures() {
        let channel = Arc::new(ScriptedChannel::failing_times(2));
        let publisher = publisher_over(channel.clone());

        let result = publisher.publish("ping_events", b"payload").await;

        assert!(result.is_ok());
        assert_eq!(channel.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(
            channel.published.lock().unwrap().as_slice(),
            &[b"payload".to_vec()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_undeclared_queue_without_touching_the_channel() {
        let channel = Arc::new(ScriptedChannel::failing_times(0));
        let publisher = publisher_over(channel.clone());

        let result = publisher.publish("other_queue", b"payload").await;

        assert!(matches!(
            result,
            Err(RelayError::QueueNotDeclared(ref queue)) if queue == "other_queue"
        ));
        assert_eq!(channel.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_never_interleave_concurrent_publishes_on_the_shared_channel() {
        let channel = Arc::new(ScriptedChannel {
            open: AtomicBool::new(true),
            publish_latency: Duration::from_millis(2),
            ..ScriptedChannel::default()
        });
        let publisher = Arc::new(publisher_over(channel.clone()));

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let publisher = publisher.clone();
                tokio::spawn(async move {
                    publisher
                        .publish("ping_events", format!("ping-{i}").as_bytes())
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert!(!channel.overlapped.load(Ordering::SeqCst));
        assert_eq!(channel.published.lock().unwrap().len(), 32);
    }

    #[tokio::test(start_paused = true)]
    async fn should_re_establish_closed_session_before_retrying() {
        let stale = Arc::new(ScriptedChannel::always_failing());
        stale.open.store(false, Ordering::SeqCst);
        let fresh = Arc::new(ScriptedChannel::failing_times(0));
        let fresh_for_dialer = fresh.clone();
        let mut dialer = MockBrokerDialer::new();
        dialer.expect_dial().times(1).returning(move || {
            Ok(Box::new(FixedConnection {
                channel: fresh_for_dialer.clone(),
            }) as Box<dyn BrokerConnection>)
        });
        let dialer: Arc<dyn BrokerDialer> = Arc::new(dialer);
        let supervisor = Arc::new(ConnectionSupervisor::new(dialer, RetryPolicy::connection()));
        let publisher = RelayPublisher::new(
            session_over(stale.clone()),
            QueueSpec::default(),
            RetryPolicy::publish(),
            supervisor,
        );

        let result = publisher.publish("ping_events", b"payload").await;

        assert!(result.is_ok());
        assert_eq!(stale.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(fresh.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_broker_should_not_stretch_the_publish_cadence() {
        let stale = Arc::new(ScriptedChannel::always_failing());
        stale.open.store(false, Ordering::SeqCst);
        let mut dialer = MockBrokerDialer::new();
        dialer
            .expect_dial()
            .times(2)
            .returning(|| Err(RelayError::CannotConnect("connection refused".to_owned())));
        let supervisor = Arc::new(ConnectionSupervisor::new(
            Arc::new(dialer),
            RetryPolicy::connection(),
        ));
        let publisher = RelayPublisher::new(
            session_over(stale.clone()),
            QueueSpec::default(),
            RetryPolicy::publish(),
            supervisor,
        );
        let started_at = Instant::now();

        let result = publisher.publish("ping_events", b"payload").await;

        assert!(matches!(
            result,
            Err(RelayError::DeliveryFailed { attempts: 3, .. })
        ));
        assert_eq!(stale.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(started_at.elapsed(), Duration::from_secs(4));
    }
}
