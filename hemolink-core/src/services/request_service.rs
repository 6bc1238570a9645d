// src/services/request_service.rs
//
// The donor-confirmation workflow: a requester creates a blood request, a
// donor accepts it (issuing a short-lived OTP delivered by email and chat),
// and the requester confirms the donor by submitting the OTP back. A
// confirmed request fans an urgent notice out to every other user with the
// same blood group and is then removed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::Error;
use hemolink_common::models::blood_request::{
    BloodGroup, BloodRequest, NewBloodRequest, RequestAcceptance,
};
use hemolink_common::models::user::User;
use hemolink_common::traits::repository_traits::{BloodRequestRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct RequestServiceConfig {
    /// How long an issued OTP stays valid.
    pub otp_validity: Duration,
}

impl Default for RequestServiceConfig {
    fn default() -> Self {
        Self {
            otp_validity: Duration::minutes(15),
        }
    }
}

pub struct RequestService {
    requests: Arc<dyn BloodRequestRepository>,
    users: Arc<dyn UserRepository>,
    dispatcher: Arc<Dispatcher>,
    config: RequestServiceConfig,
}

fn generate_otp() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000))
}

impl RequestService {
    pub fn new(
        requests: Arc<dyn BloodRequestRepository>,
        users: Arc<dyn UserRepository>,
        dispatcher: Arc<Dispatcher>,
        config: RequestServiceConfig,
    ) -> Self {
        Self {
            requests,
            users,
            dispatcher,
            config,
        }
    }

    pub async fn create_request(
        &self,
        requester_id: Uuid,
        form: &NewBloodRequest,
    ) -> Result<BloodRequest, Error> {
        self.users
            .get_user(requester_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", requester_id)))?;
        let blood_group = BloodGroup::parse(&form.blood_group)?;

        let request = BloodRequest::new(requester_id, form, blood_group);
        self.requests.create_request(&request).await?;

        info!(
            "Created blood request {} ({}) for user {}",
            request.request_id, blood_group, requester_id
        );
        Ok(request)
    }

    /// A donor accepts the request: issue a fresh OTP against it, record
    /// the acceptance, and queue the OTP + donor contact details to the
    /// requester by email and chat. Re-acceptance by the same donor is
    /// rejected without touching the outstanding OTP.
    pub async fn accept_request(
        &self,
        request_id: Uuid,
        donor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, Error> {
        let request = self
            .requests
            .get_request(request_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("blood request {}", request_id)))?;
        let donor = self
            .users
            .get_user(donor_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", donor_id)))?;

        if self.requests.has_acceptance(request_id, donor_id).await? {
            return Err(Error::Conflict(
                "you have already accepted this request".to_string(),
            ));
        }

        let otp = generate_otp();
        let stored = self
            .requests
            .store_otp(request_id, &otp, now, request.version)
            .await?;
        if !stored {
            return Err(Error::Conflict(
                "the request was modified concurrently; try again".to_string(),
            ));
        }

        self.requests
            .add_acceptance(&RequestAcceptance {
                request_id,
                donor_id,
                accepted_at: now,
            })
            .await?;

        let donor_phone = donor.phone.as_deref().unwrap_or("N/A");
        let subject = "Your blood request OTP (verify to confirm donor)";
        let body = format!(
            "Hello {},\n\n\
             {} has accepted to be a donor for your request.\n\n\
             OTP: {}\n\
             Donor phone: {}\n\
             Donor address: {}\n\n\
             Regards,\nThe blood donation team",
            request.name, donor.username, otp, donor_phone, donor.address
        );
        if let Err(e) = self.dispatcher.enqueue_email(&request.email, subject, &body).await {
            warn!("Could not enqueue OTP email for request {}: {}", request_id, e);
        }

        let chat_content = format!(
            "OTP: {}\nDonor phone: {}\nDonor address: {}",
            otp, donor_phone, donor.address
        );
        if let Err(e) = self
            .dispatcher
            .enqueue_chat(donor_id, request.requester_id, &chat_content)
            .await
        {
            warn!("Could not enqueue OTP chat for request {}: {}", request_id, e);
        }

        info!("Donor {} accepted request {}", donor_id, request_id);

        self.requests
            .get_request(request_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("blood request {}", request_id)))
    }

    /// Check a submitted OTP against the request. An OTP past its validity
    /// window deletes the request outright, whatever the submitted code. A
    /// correct in-window code confirms the donor, queues the confirmation
    /// email and the same-blood-group broadcast, and removes the request.
    pub async fn verify_otp(
        &self,
        request_id: Uuid,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let request = self
            .requests
            .get_request(request_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("blood request {}", request_id)))?;

        let (otp, issued_at) = match (request.otp.as_deref(), request.otp_created_at) {
            (Some(otp), Some(issued_at)) => (otp, issued_at),
            _ => {
                return Err(Error::Validation(
                    "no OTP is outstanding for this request".to_string(),
                ));
            }
        };

        if now - issued_at > self.config.otp_validity {
            self.requests.delete_request(request_id).await?;
            info!("Request {} expired before verification; removed", request_id);
            return Err(Error::OtpExpired(
                "the OTP expired and the request has been removed".to_string(),
            ));
        }

        // Exact string comparison: "007000" and "7000" are different codes.
        if submitted.trim() != otp {
            return Err(Error::OtpMismatch("the submitted code is wrong".to_string()));
        }

        let acceptance = self
            .requests
            .latest_acceptance(request_id)
            .await?
            .ok_or_else(|| {
                Error::Internal(format!(
                    "request {} has an OTP but no recorded acceptance",
                    request_id
                ))
            })?;

        let verified = self
            .requests
            .mark_verified(request_id, acceptance.donor_id, request.version)
            .await?;
        if !verified {
            return Err(Error::Conflict(
                "the request was modified concurrently; try again".to_string(),
            ));
        }

        if let Some(donor) = self.users.get_user(acceptance.donor_id).await? {
            self.queue_confirmation_email(&request, &donor).await;
        } else {
            warn!(
                "Confirmed donor {} for request {} no longer exists; skipping email",
                acceptance.donor_id, request_id
            );
        }

        self.broadcast_urgent_need(&request).await?;

        self.requests.delete_request(request_id).await?;
        info!(
            "Request {} verified (donor {}) and closed",
            request_id, acceptance.donor_id
        );
        Ok(())
    }

    async fn queue_confirmation_email(&self, request: &BloodRequest, donor: &User) {
        let subject = "Your blood request - donor confirmed";
        let body = format!(
            "Hello {},\n\n\
             Your request has been confirmed by {}.\n\
             Contact details:\n\
             Email: {}\n\
             Phone: {}\n\n\
             Please contact the donor.\n\n\
             Regards,\nThe blood donation team",
            request.name,
            donor.username,
            donor.email,
            donor.phone.as_deref().unwrap_or("N/A")
        );
        if let Err(e) = self
            .dispatcher
            .enqueue_email(&request.email, subject, &body)
            .await
        {
            warn!(
                "Could not enqueue confirmation email for request {}: {}",
                request.request_id, e
            );
        }
    }

    /// Urgent notice to every other active user sharing the blood group:
    /// an in-app notification plus a best-effort email each.
    async fn broadcast_urgent_need(&self, request: &BloodRequest) -> Result<(), Error> {
        let peers = self.users.list_by_blood_group(request.blood_group).await?;
        let message = format!(
            "Urgent: {} blood needed at {} ({})",
            request.blood_group,
            request.address,
            request.reason.as_deref().unwrap_or("no reason")
        );

        for peer in peers.iter().filter(|u| u.user_id != request.requester_id) {
            if let Err(e) = self
                .dispatcher
                .enqueue_notification(peer.user_id, &message)
                .await
            {
                warn!("Could not enqueue notification for {}: {}", peer.user_id, e);
            }
            if let Err(e) = self
                .dispatcher
                .enqueue_email(&peer.email, "Urgent blood requirement", &message)
                .await
            {
                warn!("Could not enqueue broadcast email for {}: {}", peer.user_id, e);
            }
        }
        Ok(())
    }

    /// All requests, newest first. A pure read; cleanup belongs to the sweep.
    pub async fn list_active(&self) -> Result<Vec<BloodRequest>, Error> {
        self.requests.list_requests().await
    }

    /// Remove verified leftovers and requests whose OTP outlived the
    /// validity window. Returns (verified, expired) counts.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<(u64, u64), Error> {
        let verified = self.requests.delete_verified().await?;
        let expired = self
            .requests
            .delete_expired(now - self.config.otp_validity)
            .await?;
        if verified > 0 || expired > 0 {
            info!(
                "Sweep removed {} verified and {} expired request(s)",
                verified, expired
            );
        }
        Ok((verified, expired))
    }
}

#[cfg(test)]
mod tests {
    use super::generate_otp;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
