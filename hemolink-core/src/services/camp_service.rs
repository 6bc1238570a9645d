// src/services/camp_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::Error;
use hemolink_common::models::blood_camp::{BloodCamp, DashboardSummary, NewBloodCamp};
use hemolink_common::traits::repository_traits::{BloodCampRepository, BloodRequestRepository};

const DASHBOARD_RECENT: i64 = 5;

pub struct CampService {
    camps: Arc<dyn BloodCampRepository>,
    requests: Arc<dyn BloodRequestRepository>,
}

impl CampService {
    pub fn new(
        camps: Arc<dyn BloodCampRepository>,
        requests: Arc<dyn BloodRequestRepository>,
    ) -> Self {
        Self { camps, requests }
    }

    pub async fn create_camp(
        &self,
        created_by: Uuid,
        form: &NewBloodCamp,
    ) -> Result<BloodCamp, Error> {
        if form.min_age > form.max_age {
            return Err(Error::Validation(
                "minimum age exceeds maximum age".to_string(),
            ));
        }

        let camp = BloodCamp::new(created_by, form);
        self.camps.create_camp(&camp).await?;
        info!("Created blood camp {} at {}", camp.camp_id, camp.city);
        Ok(camp)
    }

    pub async fn get_camp(&self, camp_id: Uuid) -> Result<BloodCamp, Error> {
        self.camps
            .get_camp(camp_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("blood camp {}", camp_id)))
    }

    /// Upcoming or permanent camps, optionally filtered by city. A pure
    /// read; expired camps are removed by the sweep, not here.
    pub async fn list_camps(
        &self,
        today: NaiveDate,
        city: Option<&str>,
    ) -> Result<Vec<BloodCamp>, Error> {
        self.camps.list_camps(today, city).await
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary, Error> {
        let mut recent_requests = self.requests.list_requests().await?;
        recent_requests.truncate(DASHBOARD_RECENT as usize);

        Ok(DashboardSummary {
            total_camps: self.camps.count_camps().await?,
            upcoming_camps: self.camps.count_upcoming(today).await?,
            total_requests: self.requests.count_requests().await?,
            recent_camps: self.camps.recent_camps(DASHBOARD_RECENT).await?,
            recent_requests,
        })
    }
}
