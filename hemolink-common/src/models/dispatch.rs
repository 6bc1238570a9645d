use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// What kind of outbound side effect a dispatch row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchKind {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "notification")]
    Notification,
}

impl DispatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchKind::Email => "email",
            DispatchKind::Chat => "chat",
            DispatchKind::Notification => "notification",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "email" => Ok(DispatchKind::Email),
            "chat" => Ok(DispatchKind::Chat),
            "notification" => Ok(DispatchKind::Notification),
            other => Err(Error::Validation(format!("unknown dispatch kind: {}", other))),
        }
    }
}

/// A queued outbound side effect. Executed by the dispatch worker with
/// bounded attempts; exhausted rows are logged and dropped so a dead sink
/// never wedges the queue.
#[derive(Debug, Clone)]
pub struct OutboundDispatch {
    pub dispatch_id: Uuid,
    pub kind: DispatchKind,
    pub payload: serde_json::Value,
    pub attempts: i32,
    pub max_attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OutboundDispatch {
    pub fn new(kind: DispatchKind, payload: serde_json::Value, max_attempts: i32) -> Self {
        let now = Utc::now();
        Self {
            dispatch_id: Uuid::new_v4(),
            kind,
            payload,
            attempts: 0,
            max_attempts,
            next_attempt_at: now,
            last_error: None,
            created_at: now,
        }
    }
}
