use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize, Clone)]
pub struct Notification {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, message: &str) -> Self {
        Self {
            notification_id: Uuid::new_v4(),
            user_id,
            message: message.to_string(),
            read: false,
            created_at: Utc::now(),
        }
    }
}
