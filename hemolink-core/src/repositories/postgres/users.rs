// src/repositories/postgres/users.rs

use crate::Error;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hemolink_common::models::blood_request::BloodGroup;
use hemolink_common::models::user::User;
pub(crate) use hemolink_common::traits::repository_traits::UserRepository;

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn user_from_row(r: &sqlx::postgres::PgRow) -> Result<User, Error> {
    Ok(User {
        user_id: r.try_get("user_id")?,
        username: r.try_get("username")?,
        email: r.try_get("email")?,
        phone: r.try_get("phone")?,
        address: r.try_get("address")?,
        blood_group: BloodGroup::parse(&r.try_get::<String, _>("blood_group")?)?,
        is_active: r.try_get("is_active")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                email,
                phone,
                address,
                blood_group,
                is_active,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.address)
            .bind(user.blood_group.as_str())
            .bind(user.is_active)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, email, phone, address,
                   blood_group, is_active, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(user_from_row(&r)?))
        } else {
            Ok(None)
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, email, phone, address,
                   blood_group, is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(user_from_row(&r)?))
        } else {
            Ok(None)
        }
    }

    async fn list_by_blood_group(&self, group: BloodGroup) -> Result<Vec<User>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, username, email, phone, address,
                   blood_group, is_active, created_at
            FROM users
            WHERE blood_group = $1
              AND is_active
            "#,
        )
            .bind(group.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }
}
