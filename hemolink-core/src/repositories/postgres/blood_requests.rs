// src/repositories/postgres/blood_requests.rs

use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hemolink_common::models::blood_request::{BloodGroup, BloodRequest, RequestAcceptance};
pub(crate) use hemolink_common::traits::repository_traits::BloodRequestRepository;

#[derive(Clone)]
pub struct PostgresBloodRequestRepository {
    pool: Pool<Postgres>,
}

impl PostgresBloodRequestRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn request_from_row(r: &sqlx::postgres::PgRow) -> Result<BloodRequest, Error> {
    Ok(BloodRequest {
        request_id: r.try_get("request_id")?,
        requester_id: r.try_get("requester_id")?,
        name: r.try_get("name")?,
        email: r.try_get("email")?,
        phone: r.try_get("phone")?,
        address: r.try_get("address")?,
        blood_group: BloodGroup::parse(&r.try_get::<String, _>("blood_group")?)?,
        emergency: r.try_get("emergency")?,
        reason: r.try_get("reason")?,
        otp: r.try_get("otp")?,
        otp_created_at: r.try_get("otp_created_at")?,
        otp_verified: r.try_get("otp_verified")?,
        confirmed_donor_id: r.try_get("confirmed_donor_id")?,
        version: r.try_get("version")?,
        created_at: r.try_get("created_at")?,
    })
}

const REQUEST_COLUMNS: &str = r#"
    request_id, requester_id, name, email, phone, address,
    blood_group, emergency, reason,
    otp, otp_created_at, otp_verified, confirmed_donor_id,
    version, created_at
"#;

#[async_trait]
impl BloodRequestRepository for PostgresBloodRequestRepository {
    async fn create_request(&self, request: &BloodRequest) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO blood_requests (
                request_id,
                requester_id,
                name,
                email,
                phone,
                address,
                blood_group,
                emergency,
                reason,
                otp,
                otp_created_at,
                otp_verified,
                confirmed_donor_id,
                version,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
            .bind(request.request_id)
            .bind(request.requester_id)
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.phone)
            .bind(&request.address)
            .bind(request.blood_group.as_str())
            .bind(request.emergency)
            .bind(&request.reason)
            .bind(&request.otp)
            .bind(request.otp_created_at)
            .bind(request.otp_verified)
            .bind(request.confirmed_donor_id)
            .bind(request.version)
            .bind(request.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_request(&self, request_id: Uuid) -> Result<Option<BloodRequest>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE request_id = $1"
        ))
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(request_from_row(&r)?))
        } else {
            Ok(None)
        }
    }

    async fn list_requests(&self) -> Result<Vec<BloodRequest>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM blood_requests ORDER BY created_at DESC"
        ))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(request_from_row).collect()
    }

    async fn count_requests(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM blood_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn delete_request(&self, request_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM blood_requests WHERE request_id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn store_otp(
        &self,
        request_id: Uuid,
        otp: &str,
        issued_at: DateTime<Utc>,
        expected_version: i32,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE blood_requests
            SET otp            = $1,
                otp_created_at = $2,
                otp_verified   = FALSE,
                version        = version + 1
            WHERE request_id = $3
              AND version    = $4
            "#,
        )
            .bind(otp)
            .bind(issued_at)
            .bind(request_id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_verified(
        &self,
        request_id: Uuid,
        confirmed_donor_id: Uuid,
        expected_version: i32,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE blood_requests
            SET otp_verified       = TRUE,
                confirmed_donor_id = $1,
                version            = version + 1
            WHERE request_id = $2
              AND version    = $3
            "#,
        )
            .bind(confirmed_donor_id)
            .bind(request_id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_verified(&self) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM blood_requests WHERE otp_verified")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM blood_requests
            WHERE otp_created_at IS NOT NULL
              AND NOT otp_verified
              AND otp_created_at < $1
            "#,
        )
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn add_acceptance(&self, acceptance: &RequestAcceptance) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO request_acceptances (request_id, donor_id, accepted_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (request_id, donor_id) DO NOTHING
            "#,
        )
            .bind(acceptance.request_id)
            .bind(acceptance.donor_id)
            .bind(acceptance.accepted_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn has_acceptance(&self, request_id: Uuid, donor_id: Uuid) -> Result<bool, Error> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM request_acceptances
                WHERE request_id = $1 AND donor_id = $2
            ) AS present
            "#,
        )
            .bind(request_id)
            .bind(donor_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("present")?)
    }

    async fn latest_acceptance(
        &self,
        request_id: Uuid,
    ) -> Result<Option<RequestAcceptance>, Error> {
        let row = sqlx::query(
            r#"
            SELECT request_id, donor_id, accepted_at
            FROM request_acceptances
            WHERE request_id = $1
            ORDER BY accepted_at DESC
            LIMIT 1
            "#,
        )
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(RequestAcceptance {
                request_id: r.try_get("request_id")?,
                donor_id: r.try_get("donor_id")?,
                accepted_at: r.try_get("accepted_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn list_acceptances(&self, request_id: Uuid) -> Result<Vec<RequestAcceptance>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT request_id, donor_id, accepted_at
            FROM request_acceptances
            WHERE request_id = $1
            ORDER BY accepted_at
            "#,
        )
            .bind(request_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| {
                Ok(RequestAcceptance {
                    request_id: r.try_get("request_id")?,
                    donor_id: r.try_get("donor_id")?,
                    accepted_at: r.try_get("accepted_at")?,
                })
            })
            .collect()
    }
}
