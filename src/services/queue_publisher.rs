use crate::adapters::queue::{MessageQueue, QueueError};
use crate::domain::event::{Envelope, NormalizedEvent};
use crate::error::AppError;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("publish deadline exceeded")]
    DeadlineExceeded,
}

impl From<PublishError> for AppError {
    fn from(e: PublishError) -> Self {
        tracing::error!(error = %e, "Error sending queue message");
        Self::Internal
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) published_events_total: Counter<u64>,
    pub(crate) publish_failures_total: Counter<u64>,
    pub(crate) batch_size: Histogram<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("sms-relay");
        Self {
            published_events_total: meter
                .u64_counter("sms_relay_published_events_total")
                .with_description("Events delivered to the queue")
                .build(),
            publish_failures_total: meter
                .u64_counter("sms_relay_publish_failures_total")
                .with_description("Publish attempts that failed, by reason")
                .build(),
            batch_size: meter
                .u64_histogram("sms_relay_batch_size")
                .with_description("Number of events per published envelope")
                .build(),
        }
    }
}

/// Publishes batches as single envelopes under one fixed message group, so
/// consumers observe every envelope in one strict sequence.
#[derive(Clone, Debug)]
pub struct QueuePublisher {
    queue: Arc<dyn MessageQueue>,
    group_id: String,
    metrics: Metrics,
}

impl QueuePublisher {
    #[must_use]
    pub fn new(queue: Arc<dyn MessageQueue>, group_id: String) -> Self {
        Self { queue, group_id, metrics: Metrics::new() }
    }

    /// Sends `events` as one `new_messages` envelope. Exactly one attempt is
    /// made; giving up at `deadline` drops the in-flight call.
    ///
    /// # Errors
    /// Returns `PublishError::Serialize` if the envelope cannot be encoded,
    /// `PublishError::Queue` if the queue rejects it, and
    /// `PublishError::DeadlineExceeded` if no answer arrives before `deadline`.
    #[tracing::instrument(err(level = "warn"), skip(self, events), fields(events = events.len(), group_id = %self.group_id))]
    pub async fn publish(&self, events: Vec<NormalizedEvent>, deadline: Instant) -> Result<String, PublishError> {
        let count = events.len() as u64;
        let result = self.send(Envelope::NewMessages(events), deadline).await;

        match &result {
            Ok(message_id) => {
                self.metrics.published_events_total.add(count, &[]);
                self.metrics.batch_size.record(count, &[]);
                tracing::info!(message_id = %message_id, "Queue message sent");
            }
            Err(e) => {
                let reason = match e {
                    PublishError::Serialize(_) => "serialize",
                    PublishError::Queue(_) => "queue",
                    PublishError::DeadlineExceeded => "deadline",
                };
                self.metrics.publish_failures_total.add(1, &[KeyValue::new("reason", reason)]);
            }
        }

        result
    }

    async fn send(&self, envelope: Envelope, deadline: Instant) -> Result<String, PublishError> {
        let body = serde_json::to_string(&envelope)?;

        tokio::time::timeout_at(deadline, self.queue.send(body, &self.group_id))
            .await
            .map_err(|_| PublishError::DeadlineExceeded)?
            .map_err(PublishError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct StubQueue {
        sent: Mutex<Vec<(String, String)>>,
        delay: Option<Duration>,
        fail: bool,
    }

    #[async_trait]
    impl MessageQueue for StubQueue {
        async fn send(&self, body: String, group_id: &str) -> Result<String, QueueError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(QueueError::Request("access denied".into()));
            }
            self.sent.lock().unwrap().push((body, group_id.to_string()));
            Ok("msg-1".into())
        }

        async fn ping(&self) -> Result<(), QueueError> {
            Ok(())
        }
    }

    fn event(device_id: &str) -> NormalizedEvent {
        NormalizedEvent {
            message_type: "sms".into(),
            printable_message_type: "SMS".into(),
            device_id: device_id.into(),
            tel: "+1".into(),
            date_time: String::new(),
            printable_date_time: String::new(),
            sms_date_time: String::new(),
            marked: false,
            text: "hello".into(),
        }
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_publishes_one_envelope_under_fixed_group() {
        let queue = Arc::new(StubQueue::default());
        let publisher = QueuePublisher::new(queue.clone(), "1".into());

        let id = publisher.publish(vec![event("a"), event("b")], far_deadline()).await.unwrap();
        assert_eq!(id, "msg-1");

        let sent = queue.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "1");

        let envelope: Envelope = serde_json::from_str(&sent[0].0).unwrap();
        let devices: Vec<_> = envelope.events().iter().map(|e| e.device_id.as_str()).collect();
        assert_eq!(devices, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_queue_failure_is_not_retried() {
        let queue = Arc::new(StubQueue { fail: true, ..StubQueue::default() });
        let publisher = QueuePublisher::new(queue.clone(), "1".into());

        let err = publisher.publish(vec![event("a")], far_deadline()).await.unwrap_err();
        assert!(matches!(err, PublishError::Queue(QueueError::Request(_))));
        assert!(queue.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_abandons_slow_publish() {
        let queue = Arc::new(StubQueue { delay: Some(Duration::from_secs(30)), ..StubQueue::default() });
        let publisher = QueuePublisher::new(queue.clone(), "1".into());

        let deadline = Instant::now() + Duration::from_secs(5);
        let err = publisher.publish(vec![event("a")], deadline).await.unwrap_err();

        assert!(matches!(err, PublishError::DeadlineExceeded));
        assert!(queue.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_publish_error_maps_to_internal() {
        let app_error: AppError = PublishError::DeadlineExceeded.into();
        assert!(matches!(app_error, AppError::Internal));
    }
}
