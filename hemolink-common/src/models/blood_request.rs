use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// The closed set of valid blood groups. Nothing else parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "A+" => Ok(BloodGroup::APositive),
            "A-" => Ok(BloodGroup::ANegative),
            "B+" => Ok(BloodGroup::BPositive),
            "B-" => Ok(BloodGroup::BNegative),
            "O+" => Ok(BloodGroup::OPositive),
            "O-" => Ok(BloodGroup::ONegative),
            "AB+" => Ok(BloodGroup::AbPositive),
            "AB-" => Ok(BloodGroup::AbNegative),
            other => Err(Error::Validation(format!("unknown blood group: {}", other))),
        }
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blood request and its OTP sub-state.
///
/// Lifecycle: created with no OTP; a donor acceptance issues an OTP and
/// stamps `otp_created_at`; a correct in-window verification sets
/// `otp_verified` and `confirmed_donor_id`, after which the row is removed.
/// `version` guards every state-changing update: writers supply the version
/// they read and lose with a conflict if another writer got there first.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BloodRequest {
    pub request_id: Uuid,
    pub requester_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub blood_group: BloodGroup,
    pub emergency: bool,
    pub reason: Option<String>,
    pub otp: Option<String>,
    pub otp_created_at: Option<DateTime<Utc>>,
    pub otp_verified: bool,
    pub confirmed_donor_id: Option<Uuid>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBloodRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub blood_group: String,
    #[serde(default)]
    pub emergency: bool,
    pub reason: Option<String>,
}

impl BloodRequest {
    pub fn new(requester_id: Uuid, form: &NewBloodRequest, blood_group: BloodGroup) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            requester_id,
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            address: form.address.clone(),
            blood_group,
            emergency: form.emergency,
            reason: form.reason.clone(),
            otp: None,
            otp_created_at: None,
            otp_verified: false,
            confirmed_donor_id: None,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

/// One donor's acceptance of a request. A request can hold several; the
/// most recent one owns the outstanding OTP.
#[derive(Debug, Serialize, Clone)]
pub struct RequestAcceptance {
    pub request_id: Uuid,
    pub donor_id: Uuid,
    pub accepted_at: DateTime<Utc>,
}
