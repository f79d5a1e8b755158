use serde::{Deserialize, Deserializer, Serialize};

/// Message type assumed when a device leaves the field empty.
pub const DEFAULT_MESSAGE_TYPE: &str = "sms";

/// One record as pushed by a device agent. Nothing is validated here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawItem {
    #[serde(deserialize_with = "null_as_empty")]
    pub device_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub message_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub date_time: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub sms_date_time: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub tel: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub text: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub message_type: String,
    pub printable_message_type: String,
    pub device_id: String,
    pub tel: String,
    pub date_time: String,
    pub printable_date_time: String,
    pub sms_date_time: String,
    pub marked: bool,
    pub text: String,
}

/// Wire form of a published batch: `{"type": "new_messages", "data": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Envelope {
    NewMessages(Vec<NormalizedEvent>),
}

impl Envelope {
    #[must_use]
    pub fn events(&self) -> &[NormalizedEvent] {
        match self {
            Self::NewMessages(events) => events,
        }
    }
}

/// Human-readable label for a message type.
#[must_use]
pub fn printable_message_type(message_type: &str) -> String {
    match message_type {
        "sms" => "SMS".to_string(),
        "notification" => "Notification".to_string(),
        other => format!("Type {other}"),
    }
}
