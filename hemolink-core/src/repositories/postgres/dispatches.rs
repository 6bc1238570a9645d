// src/repositories/postgres/dispatches.rs

use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hemolink_common::models::dispatch::{DispatchKind, OutboundDispatch};
pub(crate) use hemolink_common::traits::repository_traits::DispatchRepository;

#[derive(Clone)]
pub struct PostgresDispatchRepository {
    pool: Pool<Postgres>,
}

impl PostgresDispatchRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchRepository for PostgresDispatchRepository {
    async fn enqueue(&self, dispatch: &OutboundDispatch) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO dispatches (
                dispatch_id,
                kind,
                payload,
                attempts,
                max_attempts,
                next_attempt_at,
                last_error,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
            .bind(dispatch.dispatch_id)
            .bind(dispatch.kind.as_str())
            .bind(&dispatch.payload)
            .bind(dispatch.attempts)
            .bind(dispatch.max_attempts)
            .bind(dispatch.next_attempt_at)
            .bind(&dispatch.last_error)
            .bind(dispatch.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OutboundDispatch>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT dispatch_id, kind, payload, attempts, max_attempts,
                   next_attempt_at, last_error, created_at
            FROM dispatches
            WHERE next_attempt_at <= $1
            ORDER BY next_attempt_at
            LIMIT $2
            "#,
        )
            .bind(now)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| {
                Ok(OutboundDispatch {
                    dispatch_id: r.try_get("dispatch_id")?,
                    kind: DispatchKind::parse(&r.try_get::<String, _>("kind")?)?,
                    payload: r.try_get("payload")?,
                    attempts: r.try_get("attempts")?,
                    max_attempts: r.try_get("max_attempts")?,
                    next_attempt_at: r.try_get("next_attempt_at")?,
                    last_error: r.try_get("last_error")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn reschedule(
        &self,
        dispatch_id: Uuid,
        attempts: i32,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE dispatches
            SET attempts        = $1,
                next_attempt_at = $2,
                last_error      = $3
            WHERE dispatch_id = $4
            "#,
        )
            .bind(attempts)
            .bind(next_attempt_at)
            .bind(last_error)
            .bind(dispatch_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_dispatch(&self, dispatch_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM dispatches WHERE dispatch_id = $1")
            .bind(dispatch_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
