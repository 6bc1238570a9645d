// src/repositories/postgres/blood_camps.rs

use crate::Error;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hemolink_common::models::blood_camp::BloodCamp;
pub(crate) use hemolink_common::traits::repository_traits::BloodCampRepository;

#[derive(Clone)]
pub struct PostgresBloodCampRepository {
    pool: Pool<Postgres>,
}

impl PostgresBloodCampRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn camp_from_row(r: &sqlx::postgres::PgRow) -> Result<BloodCamp, Error> {
    Ok(BloodCamp {
        camp_id: r.try_get("camp_id")?,
        name: r.try_get("name")?,
        organized_by: r.try_get("organized_by")?,
        date: r.try_get("date")?,
        time: r.try_get("time")?,
        venue: r.try_get("venue")?,
        city: r.try_get("city")?,
        latitude: r.try_get("latitude")?,
        longitude: r.try_get("longitude")?,
        contact_person: r.try_get("contact_person")?,
        contact_phone: r.try_get("contact_phone")?,
        min_age: r.try_get("min_age")?,
        max_age: r.try_get("max_age")?,
        min_weight: r.try_get("min_weight")?,
        notes: r.try_get("notes")?,
        permanent: r.try_get("permanent")?,
        created_by: r.try_get("created_by")?,
        created_at: r.try_get("created_at")?,
    })
}

const CAMP_COLUMNS: &str = r#"
    camp_id, name, organized_by, date, time, venue, city,
    latitude, longitude, contact_person, contact_phone,
    min_age, max_age, min_weight, notes, permanent,
    created_by, created_at
"#;

#[async_trait]
impl BloodCampRepository for PostgresBloodCampRepository {
    async fn create_camp(&self, camp: &BloodCamp) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO blood_camps (
                camp_id,
                name,
                organized_by,
                date,
                time,
                venue,
                city,
                latitude,
                longitude,
                contact_person,
                contact_phone,
                min_age,
                max_age,
                min_weight,
                notes,
                permanent,
                created_by,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
            .bind(camp.camp_id)
            .bind(&camp.name)
            .bind(&camp.organized_by)
            .bind(camp.date)
            .bind(&camp.time)
            .bind(&camp.venue)
            .bind(&camp.city)
            .bind(camp.latitude)
            .bind(camp.longitude)
            .bind(&camp.contact_person)
            .bind(&camp.contact_phone)
            .bind(camp.min_age)
            .bind(camp.max_age)
            .bind(camp.min_weight)
            .bind(&camp.notes)
            .bind(camp.permanent)
            .bind(camp.created_by)
            .bind(camp.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_camp(&self, camp_id: Uuid) -> Result<Option<BloodCamp>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {CAMP_COLUMNS} FROM blood_camps WHERE camp_id = $1"
        ))
            .bind(camp_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(camp_from_row(&r)?))
        } else {
            Ok(None)
        }
    }

    async fn list_camps(
        &self,
        today: NaiveDate,
        city: Option<&str>,
    ) -> Result<Vec<BloodCamp>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CAMP_COLUMNS}
            FROM blood_camps
            WHERE (permanent OR date >= $1)
              AND ($2::TEXT IS NULL OR city ILIKE '%' || $2 || '%')
            ORDER BY date
            "#
        ))
            .bind(today)
            .bind(city)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(camp_from_row).collect()
    }

    async fn count_camps(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM blood_camps")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn count_upcoming(&self, today: NaiveDate) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM blood_camps WHERE date >= $1")
            .bind(today)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn recent_camps(&self, limit: i64) -> Result<Vec<BloodCamp>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {CAMP_COLUMNS} FROM blood_camps ORDER BY date DESC LIMIT $1"
        ))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(camp_from_row).collect()
    }

    async fn delete_expired_camps(&self, today: NaiveDate) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM blood_camps WHERE NOT permanent AND date < $1")
            .bind(today)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
