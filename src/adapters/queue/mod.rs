use async_trait::async_trait;
use thiserror::Error;

pub mod sqs;

pub use sqs::SqsQueue;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("queue request failed: {0}")]
    Request(String),
    #[error("queue response is missing the message id")]
    MissingMessageId,
}

/// The durable queue the gateway forwards batches to.
///
/// Implementations must be safe to share across concurrent requests without
/// locking; the same handle is used for the whole process lifetime.
#[async_trait]
pub trait MessageQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Sends one message body under the given ordering group and returns the
    /// queue-assigned message id.
    async fn send(&self, body: String, group_id: &str) -> Result<String, QueueError>;

    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> Result<(), QueueError>;
}
