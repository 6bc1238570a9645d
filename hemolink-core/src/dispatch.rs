// src/dispatch.rs
//
// Durable outbound side effects. State transitions enqueue work here and
// move on; the dispatch worker delivers with bounded attempts so a mail
// outage never blocks or corrupts the OTP state machine.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::Error;
use hemolink_common::models::chat::ChatMessage;
use hemolink_common::models::dispatch::{DispatchKind, OutboundDispatch};
use hemolink_common::models::notification::Notification;
use hemolink_common::traits::repository_traits::{
    ChatMessageRepository, DispatchRepository, NotificationRepository,
};
use hemolink_common::traits::sink_traits::MailSink;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPayload {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// From-address stamped on every outbound mail.
    pub mail_from: String,
    /// Attempts before a dispatch is dropped to the log.
    pub max_attempts: i32,
    /// Base delay between attempts; grows linearly with the attempt count.
    pub retry_backoff: Duration,
    /// Rows claimed per worker pass.
    pub batch_size: i64,
}

impl DispatcherConfig {
    pub fn new(mail_from: &str) -> Self {
        Self {
            mail_from: mail_from.to_string(),
            max_attempts: 5,
            retry_backoff: Duration::minutes(1),
            batch_size: 50,
        }
    }
}

pub struct Dispatcher {
    dispatches: Arc<dyn DispatchRepository>,
    chat_repo: Arc<dyn ChatMessageRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    mail: Arc<dyn MailSink>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        dispatches: Arc<dyn DispatchRepository>,
        chat_repo: Arc<dyn ChatMessageRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        mail: Arc<dyn MailSink>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            dispatches,
            chat_repo,
            notification_repo,
            mail,
            config,
        }
    }

    pub async fn enqueue_email(&self, to: &str, subject: &str, body: &str) -> Result<(), Error> {
        let payload = EmailPayload {
            to: vec![to.to_string()],
            subject: subject.to_string(),
            body: body.to_string(),
        };
        self.enqueue(DispatchKind::Email, serde_json::to_value(payload)?)
            .await
    }

    pub async fn enqueue_chat(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: &str,
    ) -> Result<(), Error> {
        let payload = ChatPayload {
            sender_id,
            recipient_id,
            content: content.to_string(),
        };
        self.enqueue(DispatchKind::Chat, serde_json::to_value(payload)?)
            .await
    }

    pub async fn enqueue_notification(&self, user_id: Uuid, message: &str) -> Result<(), Error> {
        let payload = NotificationPayload {
            user_id,
            message: message.to_string(),
        };
        self.enqueue(DispatchKind::Notification, serde_json::to_value(payload)?)
            .await
    }

    async fn enqueue(&self, kind: DispatchKind, payload: serde_json::Value) -> Result<(), Error> {
        let dispatch = OutboundDispatch::new(kind, payload, self.config.max_attempts);
        self.dispatches.enqueue(&dispatch).await?;
        debug!("Enqueued {} dispatch {}", kind.as_str(), dispatch.dispatch_id);
        Ok(())
    }

    /// Deliver every dispatch due at `now`. Failures are rescheduled with a
    /// linearly growing delay; a dispatch that exhausts its attempts is
    /// logged at error level and removed. Returns the delivered count.
    pub async fn run_due(&self, now: DateTime<Utc>) -> Result<usize, Error> {
        let due = self.dispatches.due(now, self.config.batch_size).await?;
        let mut delivered = 0;

        for dispatch in due {
            match self.execute(&dispatch).await {
                Ok(()) => {
                    self.dispatches.delete_dispatch(dispatch.dispatch_id).await?;
                    delivered += 1;
                }
                Err(e) => {
                    let attempts = dispatch.attempts + 1;
                    if attempts >= dispatch.max_attempts {
                        error!(
                            "Dropping {} dispatch {} after {} attempts: {}",
                            dispatch.kind.as_str(),
                            dispatch.dispatch_id,
                            attempts,
                            e
                        );
                        self.dispatches.delete_dispatch(dispatch.dispatch_id).await?;
                    } else {
                        warn!(
                            "{} dispatch {} failed (attempt {}/{}): {}",
                            dispatch.kind.as_str(),
                            dispatch.dispatch_id,
                            attempts,
                            dispatch.max_attempts,
                            e
                        );
                        let next = now + self.config.retry_backoff * attempts;
                        self.dispatches
                            .reschedule(dispatch.dispatch_id, attempts, next, &e.to_string())
                            .await?;
                    }
                }
            }
        }

        Ok(delivered)
    }

    async fn execute(&self, dispatch: &OutboundDispatch) -> Result<(), Error> {
        match dispatch.kind {
            DispatchKind::Email => {
                let payload: EmailPayload = serde_json::from_value(dispatch.payload.clone())?;
                self.mail
                    .send(
                        &payload.subject,
                        &payload.body,
                        &self.config.mail_from,
                        &payload.to,
                    )
                    .await
            }
            DispatchKind::Chat => {
                let payload: ChatPayload = serde_json::from_value(dispatch.payload.clone())?;
                let message =
                    ChatMessage::new(payload.sender_id, payload.recipient_id, &payload.content);
                self.chat_repo.insert_message(&message).await
            }
            DispatchKind::Notification => {
                let payload: NotificationPayload =
                    serde_json::from_value(dispatch.payload.clone())?;
                let notification = Notification::new(payload.user_id, &payload.message);
                self.notification_repo.insert_notification(&notification).await
            }
        }
    }
}
