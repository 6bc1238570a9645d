use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::blood_request::BloodRequest;

/// A blood-donation camp. Non-permanent camps are swept once their date
/// has passed; permanent camps never expire.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BloodCamp {
    pub camp_id: Uuid,
    pub name: String,
    pub organized_by: String,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_person: String,
    pub contact_phone: String,
    pub min_age: i32,
    pub max_age: i32,
    pub min_weight: i32,
    pub notes: Option<String>,
    pub permanent: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBloodCamp {
    pub name: String,
    pub organized_by: String,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_person: String,
    pub contact_phone: String,
    #[serde(default = "default_min_age")]
    pub min_age: i32,
    #[serde(default = "default_max_age")]
    pub max_age: i32,
    #[serde(default = "default_min_weight")]
    pub min_weight: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub permanent: bool,
}

fn default_min_age() -> i32 {
    18
}

fn default_max_age() -> i32 {
    60
}

fn default_min_weight() -> i32 {
    50
}

impl BloodCamp {
    pub fn new(created_by: Uuid, form: &NewBloodCamp) -> Self {
        Self {
            camp_id: Uuid::new_v4(),
            name: form.name.clone(),
            organized_by: form.organized_by.clone(),
            date: form.date,
            time: form.time.clone(),
            venue: form.venue.clone(),
            city: form.city.clone(),
            latitude: form.latitude,
            longitude: form.longitude,
            contact_person: form.contact_person.clone(),
            contact_phone: form.contact_phone.clone(),
            min_age: form.min_age,
            max_age: form.max_age,
            min_weight: form.min_weight,
            notes: form.notes.clone(),
            permanent: form.permanent,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        !self.permanent && self.date < today
    }
}

/// Counts and recent entries shown on the dashboard.
#[derive(Debug, Serialize, Clone)]
pub struct DashboardSummary {
    pub total_camps: i64,
    pub upcoming_camps: i64,
    pub total_requests: i64,
    pub recent_camps: Vec<BloodCamp>,
    pub recent_requests: Vec<BloodRequest>,
}
