use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::blood_camp::BloodCamp;
use crate::models::blood_request::{BloodGroup, BloodRequest, RequestAcceptance};
use crate::models::chat::ChatMessage;
use crate::models::dispatch::OutboundDispatch;
use crate::models::notification::Notification;
use crate::models::user::{Follow, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), Error>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error>;
    /// Active users with the given blood group, in no particular order.
    async fn list_by_blood_group(&self, group: BloodGroup) -> Result<Vec<User>, Error>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Idempotent: inserting an existing edge is a no-op.
    async fn create_follow(&self, follow: &Follow) -> Result<(), Error>;
    async fn delete_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), Error>;
    /// True if a follow edge exists in either direction between the two users.
    async fn follows_either(&self, a: Uuid, b: Uuid) -> Result<bool, Error>;
    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<User>, Error>;
    async fn following_of(&self, user_id: Uuid) -> Result<Vec<User>, Error>;
}

#[async_trait]
pub trait BloodRequestRepository: Send + Sync {
    async fn create_request(&self, request: &BloodRequest) -> Result<(), Error>;
    async fn get_request(&self, request_id: Uuid) -> Result<Option<BloodRequest>, Error>;
    /// All requests, newest first. A pure read.
    async fn list_requests(&self) -> Result<Vec<BloodRequest>, Error>;
    async fn count_requests(&self) -> Result<i64, Error>;
    async fn delete_request(&self, request_id: Uuid) -> Result<(), Error>;

    /// Issue an OTP against the request, guarded by the version the caller
    /// read. Returns false (and writes nothing) if the version has moved.
    async fn store_otp(
        &self,
        request_id: Uuid,
        otp: &str,
        issued_at: DateTime<Utc>,
        expected_version: i32,
    ) -> Result<bool, Error>;

    /// Mark the request verified and record the confirmed donor, guarded by
    /// the version the caller read. Returns false if the version has moved.
    async fn mark_verified(
        &self,
        request_id: Uuid,
        confirmed_donor_id: Uuid,
        expected_version: i32,
    ) -> Result<bool, Error>;

    /// Remove verified leftovers. Returns the number of rows removed.
    async fn delete_verified(&self) -> Result<u64, Error>;

    /// Remove unverified requests whose OTP was issued before `cutoff`.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;

    async fn add_acceptance(&self, acceptance: &RequestAcceptance) -> Result<(), Error>;
    async fn has_acceptance(&self, request_id: Uuid, donor_id: Uuid) -> Result<bool, Error>;
    /// The acceptance that currently owns the outstanding OTP, if any.
    async fn latest_acceptance(&self, request_id: Uuid) -> Result<Option<RequestAcceptance>, Error>;
    async fn list_acceptances(&self, request_id: Uuid) -> Result<Vec<RequestAcceptance>, Error>;
}

#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), Error>;
    /// Both directions between the two users, ordered by `sent_at` ascending.
    async fn conversation(&self, a: Uuid, b: Uuid) -> Result<Vec<ChatMessage>, Error>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), Error>;
    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, Error>;
    async fn mark_read(&self, notification_id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait BloodCampRepository: Send + Sync {
    async fn create_camp(&self, camp: &BloodCamp) -> Result<(), Error>;
    async fn get_camp(&self, camp_id: Uuid) -> Result<Option<BloodCamp>, Error>;
    /// Upcoming or permanent camps, date ascending, optionally filtered by
    /// a case-insensitive city substring.
    async fn list_camps(&self, today: NaiveDate, city: Option<&str>) -> Result<Vec<BloodCamp>, Error>;
    async fn count_camps(&self) -> Result<i64, Error>;
    async fn count_upcoming(&self, today: NaiveDate) -> Result<i64, Error>;
    /// Most recent camps by date, for the dashboard.
    async fn recent_camps(&self, limit: i64) -> Result<Vec<BloodCamp>, Error>;
    /// Remove non-permanent camps dated before `today`.
    async fn delete_expired_camps(&self, today: NaiveDate) -> Result<u64, Error>;
}

#[async_trait]
pub trait DispatchRepository: Send + Sync {
    async fn enqueue(&self, dispatch: &OutboundDispatch) -> Result<(), Error>;
    /// Dispatches whose `next_attempt_at` is at or before `now`, oldest first.
    async fn due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OutboundDispatch>, Error>;
    async fn reschedule(
        &self,
        dispatch_id: Uuid,
        attempts: i32,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> Result<(), Error>;
    async fn delete_dispatch(&self, dispatch_id: Uuid) -> Result<(), Error>;
}
