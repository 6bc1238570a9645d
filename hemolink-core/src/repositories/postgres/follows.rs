// src/repositories/postgres/follows.rs

use crate::Error;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hemolink_common::models::user::{Follow, User};
pub(crate) use hemolink_common::traits::repository_traits::FollowRepository;

use super::users::user_from_row;

#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: Pool<Postgres>,
}

impl PostgresFollowRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn create_follow(&self, follow: &Follow) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followed_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
            .bind(follow.follower_id)
            .bind(follow.followed_id)
            .bind(follow.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn follows_either(&self, a: Uuid, b: Uuid) -> Result<bool, Error> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM follows
                WHERE (follower_id = $1 AND followed_id = $2)
                   OR (follower_id = $2 AND followed_id = $1)
            ) AS present
            "#,
        )
            .bind(a)
            .bind(b)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("present")?)
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<User>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT u.user_id, u.username, u.email, u.phone, u.address,
                   u.blood_group, u.is_active, u.created_at
            FROM follows f
            JOIN users u ON u.user_id = f.follower_id
            WHERE f.followed_id = $1
            ORDER BY f.created_at
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<User>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT u.user_id, u.username, u.email, u.phone, u.address,
                   u.blood_group, u.is_active, u.created_at
            FROM follows f
            JOIN users u ON u.user_id = f.followed_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }
}
