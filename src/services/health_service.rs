use crate::adapters::queue::MessageQueue;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) status: Gauge<i64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("sms-relay");
        Self {
            status: meter
                .i64_gauge("sms_relay_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    queue: Arc<dyn MessageQueue>,
    ping_timeout: Duration,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(queue: Arc<dyn MessageQueue>, ping_timeout: Duration) -> Self {
        Self { queue, ping_timeout, metrics: Metrics::new() }
    }

    /// Checks that the queue answers an attribute probe.
    ///
    /// # Errors
    /// Returns a string describing the failure if the queue is unreachable.
    pub async fn check_queue(&self) -> Result<(), String> {
        let labels = [KeyValue::new("component", "queue")];

        match timeout(self.ping_timeout, self.queue.ping()).await {
            Ok(Ok(())) => {
                self.metrics.status.record(1, &labels);
                Ok(())
            }
            Ok(Err(e)) => {
                self.metrics.status.record(0, &labels);
                Err(format!("Queue probe failed: {e}"))
            }
            Err(_) => {
                self.metrics.status.record(0, &labels);
                Err("Queue probe timed out".to_string())
            }
        }
    }
}
