use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub message_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender_id: Uuid, recipient_id: Uuid, content: &str) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            content: content.to_string(),
            sent_at: Utc::now(),
        }
    }
}
