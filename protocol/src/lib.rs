use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SUBJECT: &str = "Valentine's Invitation";
pub const DEFAULT_MESSAGE: &str = "Your invitation has been accepted! 🎉";

/// Fixed wording of the notice sent once the flow is completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeTemplate {
    pub recipient: Option<String>,
    pub subject: String,
    pub message: String,
}

impl Default for NoticeTemplate {
    fn default() -> Self {
        Self {
            recipient: None,
            subject: DEFAULT_SUBJECT.to_owned(),
            message: DEFAULT_MESSAGE.to_owned(),
        }
    }
}

impl NoticeTemplate {
    pub fn render(&self, timestamp: DateTime<Utc>) -> CompletionNotice {
        CompletionNotice {
            recipient: self.recipient.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            timestamp,
        }
    }
}

/// Payload handed to whatever delivers the completion notice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionNotice {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recipient: Option<String>,
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl CompletionNotice {
    /// Single-line JSON encoding, suitable for append-only outboxes.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}
