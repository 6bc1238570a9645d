// File: hemolink-core/src/test_utils/memory.rs
//
// In-memory implementations of the repository traits and mail sink,
// backing the test suites. Data lives in DashMaps keyed by id.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::Error;
use hemolink_common::models::blood_camp::BloodCamp;
use hemolink_common::models::blood_request::{BloodGroup, BloodRequest, RequestAcceptance};
use hemolink_common::models::chat::ChatMessage;
use hemolink_common::models::dispatch::OutboundDispatch;
use hemolink_common::models::notification::Notification;
use hemolink_common::models::user::{Follow, User};
use hemolink_common::traits::repository_traits::{
    BloodCampRepository, BloodRequestRepository, ChatMessageRepository, DispatchRepository,
    FollowRepository, NotificationRepository, UserRepository,
};
use hemolink_common::traits::sink_traits::MailSink;

#[derive(Default)]
pub struct MemoryUserRepository {
    pub users: DashMap<Uuid, User>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), Error> {
        self.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.clone()))
    }

    async fn list_by_blood_group(&self, group: BloodGroup) -> Result<Vec<User>, Error> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.is_active && u.blood_group == group)
            .map(|u| u.clone())
            .collect())
    }
}

pub struct MemoryFollowRepository {
    users: Arc<MemoryUserRepository>,
    pub follows: DashMap<(Uuid, Uuid), Follow>,
}

impl MemoryFollowRepository {
    pub fn new(users: Arc<MemoryUserRepository>) -> Self {
        Self {
            users,
            follows: DashMap::new(),
        }
    }

    fn users_for<F>(&self, mut pick: F) -> Vec<User>
    where
        F: FnMut(&Follow) -> Option<Uuid>,
    {
        let mut edges: Vec<Follow> = self.follows.iter().map(|f| f.clone()).collect();
        edges.sort_by_key(|f| f.created_at);
        edges
            .iter()
            .filter_map(|f| pick(f))
            .filter_map(|id| self.users.users.get(&id).map(|u| u.clone()))
            .collect()
    }
}

#[async_trait]
impl FollowRepository for MemoryFollowRepository {
    async fn create_follow(&self, follow: &Follow) -> Result<(), Error> {
        self.follows
            .entry((follow.follower_id, follow.followed_id))
            .or_insert_with(|| follow.clone());
        Ok(())
    }

    async fn delete_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), Error> {
        self.follows.remove(&(follower_id, followed_id));
        Ok(())
    }

    async fn follows_either(&self, a: Uuid, b: Uuid) -> Result<bool, Error> {
        Ok(self.follows.contains_key(&(a, b)) || self.follows.contains_key(&(b, a)))
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<User>, Error> {
        Ok(self.users_for(|f| (f.followed_id == user_id).then_some(f.follower_id)))
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<User>, Error> {
        Ok(self.users_for(|f| (f.follower_id == user_id).then_some(f.followed_id)))
    }
}

#[derive(Default)]
pub struct MemoryBloodRequestRepository {
    pub requests: DashMap<Uuid, BloodRequest>,
    pub acceptances: DashMap<(Uuid, Uuid), RequestAcceptance>,
}

#[async_trait]
impl BloodRequestRepository for MemoryBloodRequestRepository {
    async fn create_request(&self, request: &BloodRequest) -> Result<(), Error> {
        self.requests.insert(request.request_id, request.clone());
        Ok(())
    }

    async fn get_request(&self, request_id: Uuid) -> Result<Option<BloodRequest>, Error> {
        Ok(self.requests.get(&request_id).map(|r| r.clone()))
    }

    async fn list_requests(&self) -> Result<Vec<BloodRequest>, Error> {
        let mut all: Vec<BloodRequest> = self.requests.iter().map(|r| r.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn count_requests(&self) -> Result<i64, Error> {
        Ok(self.requests.len() as i64)
    }

    async fn delete_request(&self, request_id: Uuid) -> Result<(), Error> {
        self.requests.remove(&request_id);
        self.acceptances.retain(|(rid, _), _| *rid != request_id);
        Ok(())
    }

    async fn store_otp(
        &self,
        request_id: Uuid,
        otp: &str,
        issued_at: DateTime<Utc>,
        expected_version: i32,
    ) -> Result<bool, Error> {
        match self.requests.get_mut(&request_id) {
            Some(mut r) if r.version == expected_version => {
                r.otp = Some(otp.to_string());
                r.otp_created_at = Some(issued_at);
                r.otp_verified = false;
                r.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_verified(
        &self,
        request_id: Uuid,
        confirmed_donor_id: Uuid,
        expected_version: i32,
    ) -> Result<bool, Error> {
        match self.requests.get_mut(&request_id) {
            Some(mut r) if r.version == expected_version => {
                r.otp_verified = true;
                r.confirmed_donor_id = Some(confirmed_donor_id);
                r.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_verified(&self) -> Result<u64, Error> {
        let before = self.requests.len();
        self.requests.retain(|_, r| !r.otp_verified);
        Ok((before - self.requests.len()) as u64)
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let before = self.requests.len();
        self.requests.retain(|_, r| {
            !matches!(r.otp_created_at, Some(t) if !r.otp_verified && t < cutoff)
        });
        Ok((before - self.requests.len()) as u64)
    }

    async fn add_acceptance(&self, acceptance: &RequestAcceptance) -> Result<(), Error> {
        self.acceptances
            .entry((acceptance.request_id, acceptance.donor_id))
            .or_insert_with(|| acceptance.clone());
        Ok(())
    }

    async fn has_acceptance(&self, request_id: Uuid, donor_id: Uuid) -> Result<bool, Error> {
        Ok(self.acceptances.contains_key(&(request_id, donor_id)))
    }

    async fn latest_acceptance(
        &self,
        request_id: Uuid,
    ) -> Result<Option<RequestAcceptance>, Error> {
        Ok(self
            .acceptances
            .iter()
            .filter(|a| a.request_id == request_id)
            .max_by_key(|a| a.accepted_at)
            .map(|a| a.clone()))
    }

    async fn list_acceptances(&self, request_id: Uuid) -> Result<Vec<RequestAcceptance>, Error> {
        let mut all: Vec<RequestAcceptance> = self
            .acceptances
            .iter()
            .filter(|a| a.request_id == request_id)
            .map(|a| a.clone())
            .collect();
        all.sort_by_key(|a| a.accepted_at);
        Ok(all)
    }
}

#[derive(Default)]
pub struct MemoryChatMessageRepository {
    pub messages: DashMap<Uuid, ChatMessage>,
}

#[async_trait]
impl ChatMessageRepository for MemoryChatMessageRepository {
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), Error> {
        self.messages.insert(message.message_id, message.clone());
        Ok(())
    }

    async fn conversation(&self, a: Uuid, b: Uuid) -> Result<Vec<ChatMessage>, Error> {
        let mut all: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .map(|m| m.clone())
            .collect();
        all.sort_by_key(|m| m.sent_at);
        Ok(all)
    }
}

#[derive(Default)]
pub struct MemoryNotificationRepository {
    pub notifications: DashMap<Uuid, Notification>,
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.notifications
            .insert(notification.notification_id, notification.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, Error> {
        let mut all: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.clone())
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn mark_read(&self, notification_id: Uuid) -> Result<(), Error> {
        if let Some(mut n) = self.notifications.get_mut(&notification_id) {
            n.read = true;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBloodCampRepository {
    pub camps: DashMap<Uuid, BloodCamp>,
}

#[async_trait]
impl BloodCampRepository for MemoryBloodCampRepository {
    async fn create_camp(&self, camp: &BloodCamp) -> Result<(), Error> {
        self.camps.insert(camp.camp_id, camp.clone());
        Ok(())
    }

    async fn get_camp(&self, camp_id: Uuid) -> Result<Option<BloodCamp>, Error> {
        Ok(self.camps.get(&camp_id).map(|c| c.clone()))
    }

    async fn list_camps(
        &self,
        today: NaiveDate,
        city: Option<&str>,
    ) -> Result<Vec<BloodCamp>, Error> {
        let needle = city.map(|c| c.to_lowercase());
        let mut all: Vec<BloodCamp> = self
            .camps
            .iter()
            .filter(|c| c.permanent || c.date >= today)
            .filter(|c| match &needle {
                Some(n) => c.city.to_lowercase().contains(n),
                None => true,
            })
            .map(|c| c.clone())
            .collect();
        all.sort_by_key(|c| c.date);
        Ok(all)
    }

    async fn count_camps(&self) -> Result<i64, Error> {
        Ok(self.camps.len() as i64)
    }

    async fn count_upcoming(&self, today: NaiveDate) -> Result<i64, Error> {
        Ok(self.camps.iter().filter(|c| c.date >= today).count() as i64)
    }

    async fn recent_camps(&self, limit: i64) -> Result<Vec<BloodCamp>, Error> {
        let mut all: Vec<BloodCamp> = self.camps.iter().map(|c| c.clone()).collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn delete_expired_camps(&self, today: NaiveDate) -> Result<u64, Error> {
        let before = self.camps.len();
        self.camps.retain(|_, c| c.permanent || c.date >= today);
        Ok((before - self.camps.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryDispatchRepository {
    pub dispatches: DashMap<Uuid, OutboundDispatch>,
}

#[async_trait]
impl DispatchRepository for MemoryDispatchRepository {
    async fn enqueue(&self, dispatch: &OutboundDispatch) -> Result<(), Error> {
        self.dispatches.insert(dispatch.dispatch_id, dispatch.clone());
        Ok(())
    }

    async fn due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OutboundDispatch>, Error> {
        let mut all: Vec<OutboundDispatch> = self
            .dispatches
            .iter()
            .filter(|d| d.next_attempt_at <= now)
            .map(|d| d.clone())
            .collect();
        all.sort_by_key(|d| d.next_attempt_at);
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn reschedule(
        &self,
        dispatch_id: Uuid,
        attempts: i32,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> Result<(), Error> {
        if let Some(mut d) = self.dispatches.get_mut(&dispatch_id) {
            d.attempts = attempts;
            d.next_attempt_at = next_attempt_at;
            d.last_error = Some(last_error.to_string());
        }
        Ok(())
    }

    async fn delete_dispatch(&self, dispatch_id: Uuid) -> Result<(), Error> {
        self.dispatches.remove(&dispatch_id);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedMail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
}

/// Records every mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailSink {
    pub sent: Mutex<Vec<RecordedMail>>,
}

#[async_trait]
impl MailSink for RecordingMailSink {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        recipients: &[String],
    ) -> Result<(), Error> {
        self.sent.lock().push(RecordedMail {
            subject: subject.to_string(),
            body: body.to_string(),
            from: from.to_string(),
            to: recipients.to_vec(),
        });
        Ok(())
    }
}

/// Fails the first `failures` sends, then behaves like RecordingMailSink.
pub struct FlakyMailSink {
    failures_remaining: AtomicI32,
    pub inner: RecordingMailSink,
}

impl FlakyMailSink {
    pub fn new(failures: i32) -> Self {
        Self {
            failures_remaining: AtomicI32::new(failures),
            inner: RecordingMailSink::default(),
        }
    }
}

#[async_trait]
impl MailSink for FlakyMailSink {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        recipients: &[String],
    ) -> Result<(), Error> {
        if self.failures_remaining.fetch_sub(1, Ordering::SeqCst) > 0 {
            return Err(Error::Sink("simulated mail outage".to_string()));
        }
        self.inner.send(subject, body, from, recipients).await
    }
}
