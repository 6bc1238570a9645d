use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::blood_request::BloodGroup;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub blood_group: BloodGroup,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Incoming profile data; the rest is stamped server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub blood_group: String,
}

impl User {
    pub fn new(form: &NewUser, blood_group: BloodGroup) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            username: form.username.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            address: form.address.clone(),
            blood_group,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Follow {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(follower_id: Uuid, followed_id: Uuid) -> Self {
        Self {
            follower_id,
            followed_id,
            created_at: Utc::now(),
        }
    }
}
