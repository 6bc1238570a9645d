// src/repositories/postgres/notifications.rs

use crate::Error;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hemolink_common::models::notification::Notification;
pub(crate) use hemolink_common::traits::repository_traits::NotificationRepository;

#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: Pool<Postgres>,
}

impl PostgresNotificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                notification_id,
                user_id,
                message,
                read,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(notification.notification_id)
            .bind(notification.user_id)
            .bind(&notification.message)
            .bind(notification.read)
            .bind(notification.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT notification_id, user_id, message, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| {
                Ok(Notification {
                    notification_id: r.try_get("notification_id")?,
                    user_id: r.try_get("user_id")?,
                    message: r.try_get("message")?,
                    read: r.try_get("read")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn mark_read(&self, notification_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE notifications SET read = TRUE WHERE notification_id = $1")
            .bind(notification_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
