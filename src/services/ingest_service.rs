use crate::domain::event::RawItem;
use crate::error::Result;
use crate::services::normalizer::EventNormalizer;
use crate::services::queue_publisher::QueuePublisher;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Debug)]
pub struct IngestService {
    normalizer: EventNormalizer,
    publisher: QueuePublisher,
    ignored_sender: String,
    publish_timeout: Duration,
}

impl IngestService {
    #[must_use]
    pub const fn new(
        normalizer: EventNormalizer,
        publisher: QueuePublisher,
        ignored_sender: String,
        publish_timeout: Duration,
    ) -> Self {
        Self { normalizer, publisher, ignored_sender, publish_timeout }
    }

    /// Filters, normalizes and publishes one decoded batch. Returns the number
    /// of events handed to the queue; an empty result never touches it.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the envelope cannot be published.
    #[tracing::instrument(err(level = "warn"), skip(self, items), fields(received = items.len()))]
    pub async fn ingest(&self, items: Vec<RawItem>) -> Result<usize> {
        let events: Vec<_> = items
            .into_iter()
            .filter(|item| item.tel != self.ignored_sender)
            .map(|item| self.normalizer.normalize(item))
            .collect();

        if events.is_empty() {
            tracing::debug!("Nothing to publish after filtering");
            return Ok(0);
        }

        let count = events.len();
        let deadline = Instant::now() + self.publish_timeout;
        self.publisher.publish(events, deadline).await?;

        Ok(count)
    }
}
