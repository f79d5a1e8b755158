use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddSmsResponse {
    pub status: String,
    pub added: usize,
}

impl AddSmsResponse {
    #[must_use]
    pub fn ok(added: usize) -> Self {
        Self { status: "OK".to_string(), added }
    }
}
