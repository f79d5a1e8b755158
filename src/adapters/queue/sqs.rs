use crate::adapters::queue::{MessageQueue, QueueError};
use crate::config::QueueSettings;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::QueueAttributeName;

#[derive(Clone, Debug)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    #[must_use]
    pub const fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }

    /// Builds a client from static credentials against an explicit endpoint.
    pub async fn connect(settings: &QueueSettings) -> Self {
        let credentials =
            Credentials::new(settings.access_key.clone(), settings.secret_key.clone(), None, None, "static");

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(settings.endpoint.clone())
            .load()
            .await;

        tracing::info!(endpoint = %settings.endpoint, region = %settings.region, "queue client configured");
        Self::new(Client::new(&sdk_config), settings.queue_url.clone())
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn send(&self, body: String, group_id: &str) -> Result<String, QueueError> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(group_id)
            .send()
            .await
            .map_err(|e| QueueError::Request(DisplayErrorContext(&e).to_string()))?;

        output.message_id().map(str::to_owned).ok_or(QueueError::MissingMessageId)
    }

    async fn ping(&self) -> Result<(), QueueError> {
        self.client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await
            .map_err(|e| QueueError::Request(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
