// File: hemolink-core/tests/workflow_tests.rs
//
// Donor-confirmation workflow over the in-memory repositories.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use hemolink_common::models::blood_request::{BloodGroup, NewBloodRequest};
use hemolink_common::models::user::{NewUser, User};
use hemolink_common::traits::repository_traits::{
    BloodRequestRepository, ChatMessageRepository, NotificationRepository, UserRepository,
};
use hemolink_core::dispatch::{Dispatcher, DispatcherConfig};
use hemolink_core::services::{RequestService, RequestServiceConfig};
use hemolink_core::test_utils::memory::{
    MemoryBloodRequestRepository, MemoryChatMessageRepository, MemoryDispatchRepository,
    MemoryNotificationRepository, MemoryUserRepository, RecordingMailSink,
};
use hemolink_core::Error;

struct Fixture {
    users: Arc<MemoryUserRepository>,
    requests: Arc<MemoryBloodRequestRepository>,
    notifications: Arc<MemoryNotificationRepository>,
    chat: Arc<MemoryChatMessageRepository>,
    mail: Arc<RecordingMailSink>,
    dispatcher: Arc<Dispatcher>,
    service: RequestService,
}

fn fixture(otp_validity: Duration) -> Fixture {
    let users = Arc::new(MemoryUserRepository::default());
    let requests = Arc::new(MemoryBloodRequestRepository::default());
    let dispatches = Arc::new(MemoryDispatchRepository::default());
    let chat = Arc::new(MemoryChatMessageRepository::default());
    let notifications = Arc::new(MemoryNotificationRepository::default());
    let mail = Arc::new(RecordingMailSink::default());

    let dispatcher = Arc::new(Dispatcher::new(
        dispatches,
        chat.clone(),
        notifications.clone(),
        mail.clone(),
        DispatcherConfig::new("no-reply@test.local"),
    ));
    let service = RequestService::new(
        requests.clone(),
        users.clone(),
        dispatcher.clone(),
        RequestServiceConfig { otp_validity },
    );

    Fixture {
        users,
        requests,
        notifications,
        chat,
        mail,
        dispatcher,
        service,
    }
}

async fn add_user(fixture: &Fixture, name: &str, group: &str) -> User {
    let form = NewUser {
        username: name.to_string(),
        email: format!("{}@example.com", name),
        phone: Some("555-0101".to_string()),
        address: "12 Main St".to_string(),
        blood_group: group.to_string(),
    };
    let user = User::new(&form, BloodGroup::parse(group).unwrap());
    fixture.users.create_user(&user).await.unwrap();
    user
}

fn request_form(group: &str) -> NewBloodRequest {
    NewBloodRequest {
        name: "Pat Doe".to_string(),
        email: "pat@example.com".to_string(),
        phone: Some("555-0199".to_string()),
        address: "City Hospital, Ward 4".to_string(),
        blood_group: group.to_string(),
        emergency: true,
        reason: Some("surgery".to_string()),
    }
}

#[tokio::test]
async fn accept_issues_six_digit_otp() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "O+").await;
    let donor = add_user(&f, "donor", "O+").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    assert!(request.otp.is_none());
    assert!(request.otp_created_at.is_none());

    let now = Utc::now();
    let accepted = f
        .service
        .accept_request(request.request_id, donor.user_id, now)
        .await?;

    let otp = accepted.otp.expect("OTP must be issued on acceptance");
    assert_eq!(otp.len(), 6);
    assert!(otp.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(accepted.otp_created_at, Some(now));
    assert!(!accepted.otp_verified);
    assert_eq!(accepted.version, 1);

    // OTP email and chat message are queued for delivery.
    f.dispatcher.run_due(Utc::now()).await?;
    let mails = f.mail.sent.lock().clone();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].to, vec!["pat@example.com".to_string()]);
    assert!(mails[0].body.contains(&otp));
    assert!(mails[0].body.contains("555-0101"));

    let chat = f.chat.conversation(donor.user_id, requester.user_id).await?;
    assert_eq!(chat.len(), 1);
    assert!(chat[0].content.contains(&otp));

    Ok(())
}

#[tokio::test]
async fn correct_otp_confirms_donor_and_closes_request() -> Result<(), Error> {
    let f = fixture(Duration::days(2));
    let requester = add_user(&f, "requester", "O+").await;
    let donor = add_user(&f, "donor", "O+").await;
    let peer = add_user(&f, "peer", "O+").await;
    let unrelated = add_user(&f, "unrelated", "A-").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;

    let issued_at = Utc::now();
    let accepted = f
        .service
        .accept_request(request.request_id, donor.user_id, issued_at)
        .await?;
    let otp = accepted.otp.clone().unwrap();

    f.service
        .verify_otp(request.request_id, &otp, issued_at + Duration::minutes(5))
        .await?;

    // Terminal: the request is gone from the active set.
    assert!(f.service.list_active().await?.is_empty());
    assert!(f.requests.get_request(request.request_id).await?.is_none());

    // Urgent notice reaches every other O+ user, not the requester and not
    // other blood groups.
    f.dispatcher.run_due(Utc::now()).await?;
    let peer_notes = f.notifications.list_for_user(peer.user_id).await?;
    assert_eq!(peer_notes.len(), 1);
    assert!(peer_notes[0].message.contains("O+"));
    assert!(peer_notes[0].message.contains("City Hospital"));
    assert_eq!(f.notifications.list_for_user(donor.user_id).await?.len(), 1);
    assert!(f
        .notifications
        .list_for_user(requester.user_id)
        .await?
        .is_empty());
    assert!(f
        .notifications
        .list_for_user(unrelated.user_id)
        .await?
        .is_empty());

    // Mail: OTP issue + confirmation + two broadcast copies.
    let mails = f.mail.sent.lock().clone();
    assert_eq!(mails.len(), 4);
    assert!(mails
        .iter()
        .any(|m| m.subject.contains("donor confirmed") && m.to == vec!["pat@example.com".to_string()]));

    Ok(())
}

#[tokio::test]
async fn wrong_otp_is_a_retryable_failure() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "B+").await;
    let donor = add_user(&f, "donor", "B+").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("B+"))
        .await?;
    let issued_at = Utc::now();
    let accepted = f
        .service
        .accept_request(request.request_id, donor.user_id, issued_at)
        .await?;

    let wrong = if accepted.otp.as_deref() == Some("000000") {
        "000001"
    } else {
        "000000"
    };
    let result = f
        .service
        .verify_otp(request.request_id, wrong, issued_at + Duration::minutes(1))
        .await;
    assert!(matches!(result, Err(Error::OtpMismatch(_))));

    // State untouched: same OTP, same timestamp, still listed.
    let unchanged = f.requests.get_request(request.request_id).await?.unwrap();
    assert_eq!(unchanged.otp, accepted.otp);
    assert_eq!(unchanged.otp_created_at, accepted.otp_created_at);
    assert_eq!(unchanged.version, accepted.version);

    // The exact code still goes through afterwards.
    f.service
        .verify_otp(
            request.request_id,
            accepted.otp.as_deref().unwrap(),
            issued_at + Duration::minutes(2),
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn otp_codes_compare_as_strings() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "AB-").await;
    let donor = add_user(&f, "donor", "AB-").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("AB-"))
        .await?;
    let issued_at = Utc::now();
    f.service
        .accept_request(request.request_id, donor.user_id, issued_at)
        .await?;

    // Force a leading-zero code; "7000" must not match "007000".
    assert!(
        f.requests
            .store_otp(request.request_id, "007000", issued_at, 1)
            .await?
    );
    let result = f
        .service
        .verify_otp(request.request_id, "7000", issued_at + Duration::minutes(1))
        .await;
    assert!(matches!(result, Err(Error::OtpMismatch(_))));

    f.service
        .verify_otp(request.request_id, "007000", issued_at + Duration::minutes(1))
        .await?;
    Ok(())
}

#[tokio::test]
async fn expired_otp_deletes_request_regardless_of_code() -> Result<(), Error> {
    let f = fixture(Duration::days(2));
    let requester = add_user(&f, "requester", "O+").await;
    let donor = add_user(&f, "donor", "O+").await;
    add_user(&f, "peer", "O+").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    let issued_at = Utc::now();
    let accepted = f
        .service
        .accept_request(request.request_id, donor.user_id, issued_at)
        .await?;

    // Even the correct code is refused three days later; the request is
    // removed and no fan-out happens.
    let result = f
        .service
        .verify_otp(
            request.request_id,
            accepted.otp.as_deref().unwrap(),
            issued_at + Duration::days(3),
        )
        .await;
    assert!(matches!(result, Err(Error::OtpExpired(_))));
    assert!(f.requests.get_request(request.request_id).await?.is_none());

    f.dispatcher.run_due(Utc::now()).await?;
    assert!(f.notifications.notifications.is_empty());

    Ok(())
}

#[tokio::test]
async fn re_accepting_is_a_noop_for_the_same_donor() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "A+").await;
    let donor = add_user(&f, "donor", "A+").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("A+"))
        .await?;
    let issued_at = Utc::now();
    let accepted = f
        .service
        .accept_request(request.request_id, donor.user_id, issued_at)
        .await?;

    let result = f
        .service
        .accept_request(
            request.request_id,
            donor.user_id,
            issued_at + Duration::minutes(1),
        )
        .await;
    assert!(matches!(result, Err(Error::Conflict(_))));

    let unchanged = f.requests.get_request(request.request_id).await?.unwrap();
    assert_eq!(unchanged.otp, accepted.otp);
    assert_eq!(unchanged.otp_created_at, accepted.otp_created_at);
    Ok(())
}

#[tokio::test]
async fn second_donor_takes_over_the_outstanding_otp() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "O-").await;
    let donor_a = add_user(&f, "donor_a", "O-").await;
    let donor_b = add_user(&f, "donor_b", "O-").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("O-"))
        .await?;
    let t0 = Utc::now();
    f.service
        .accept_request(request.request_id, donor_a.user_id, t0)
        .await?;
    let taken_over = f
        .service
        .accept_request(request.request_id, donor_b.user_id, t0 + Duration::minutes(1))
        .await?;

    // B's acceptance owns the OTP now; A's code was overwritten.
    assert_eq!(taken_over.otp_created_at, Some(t0 + Duration::minutes(1)));
    let latest = f
        .requests
        .latest_acceptance(request.request_id)
        .await?
        .unwrap();
    assert_eq!(latest.donor_id, donor_b.user_id);
    assert_eq!(
        f.requests.list_acceptances(request.request_id).await?.len(),
        2
    );
    Ok(())
}

#[tokio::test]
async fn stale_version_writes_are_rejected() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "B-").await;
    let donor = add_user(&f, "donor", "B-").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("B-"))
        .await?;
    let now = Utc::now();
    f.service
        .accept_request(request.request_id, donor.user_id, now)
        .await?;

    // The acceptance bumped the version to 1; a writer still holding
    // version 0 must lose.
    assert!(!f.requests.store_otp(request.request_id, "123456", now, 0).await?);
    assert!(!f
        .requests
        .mark_verified(request.request_id, donor.user_id, 0)
        .await?);
    Ok(())
}

#[tokio::test]
async fn listing_is_pure_and_newest_first() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "O+").await;
    let donor = add_user(&f, "donor", "O+").await;

    let first = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    let second = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    // Pin the ordering so the newest-first assertion cannot tie.
    f.requests
        .requests
        .get_mut(&first.request_id)
        .unwrap()
        .created_at = second.created_at - Duration::seconds(30);

    // Give one request an OTP far in the past; a pure listing must still
    // return it until the sweep runs.
    f.service
        .accept_request(first.request_id, donor.user_id, Utc::now() - Duration::hours(2))
        .await?;

    let listed = f.service.list_active().await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].request_id, second.request_id);
    assert_eq!(listed[1].request_id, first.request_id);

    // Still two after listing again: reads do not purge.
    assert_eq!(f.service.list_active().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn sweep_removes_expired_and_verified_leftovers() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "O+").await;
    let donor = add_user(&f, "donor", "O+").await;

    let pending = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    let fresh = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    let stale = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;

    let now = Utc::now();
    f.service
        .accept_request(fresh.request_id, donor.user_id, now - Duration::minutes(5))
        .await?;
    f.service
        .accept_request(stale.request_id, donor.user_id, now - Duration::hours(2))
        .await?;

    // A verified row that somehow escaped immediate deletion.
    let leftover = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    assert!(
        f.requests
            .store_otp(leftover.request_id, "222222", now, 0)
            .await?
    );
    assert!(
        f.requests
            .mark_verified(leftover.request_id, donor.user_id, 1)
            .await?
    );

    let (verified, expired) = f.service.purge_expired(now).await?;
    assert_eq!(verified, 1);
    assert_eq!(expired, 1);

    let remaining: Vec<Uuid> = f
        .service
        .list_active()
        .await?
        .iter()
        .map(|r| r.request_id)
        .collect();
    assert!(remaining.contains(&pending.request_id));
    assert!(remaining.contains(&fresh.request_id));
    assert!(!remaining.contains(&stale.request_id));
    assert!(!remaining.contains(&leftover.request_id));
    Ok(())
}

#[tokio::test]
async fn unknown_request_and_unknown_blood_group_are_rejected() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "O+").await;
    let donor = add_user(&f, "donor", "O+").await;

    let missing = Uuid::new_v4();
    assert!(matches!(
        f.service.accept_request(missing, donor.user_id, Utc::now()).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        f.service.verify_otp(missing, "123456", Utc::now()).await,
        Err(Error::NotFound(_))
    ));

    let mut bad_form = request_form("O+");
    bad_form.blood_group = "C+".to_string();
    assert!(matches!(
        f.service.create_request(requester.user_id, &bad_form).await,
        Err(Error::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn verify_without_outstanding_otp_is_rejected() -> Result<(), Error> {
    let f = fixture(Duration::minutes(15));
    let requester = add_user(&f, "requester", "O+").await;

    let request = f
        .service
        .create_request(requester.user_id, &request_form("O+"))
        .await?;
    let result = f
        .service
        .verify_otp(request.request_id, "123456", Utc::now())
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(f.requests.get_request(request.request_id).await?.is_some());
    Ok(())
}
