// File: hemolink-core/tests/services_tests.rs
//
// Chat gating, follow management, and camp listings over the in-memory
// repositories.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use hemolink_common::models::blood_camp::NewBloodCamp;
use hemolink_common::models::blood_request::BloodGroup;
use hemolink_common::models::user::{NewUser, User};
use hemolink_common::traits::repository_traits::{BloodCampRepository, UserRepository};
use hemolink_core::services::{CampService, ChatService, UserService};
use hemolink_core::test_utils::memory::{
    MemoryBloodCampRepository, MemoryBloodRequestRepository, MemoryChatMessageRepository,
    MemoryFollowRepository, MemoryUserRepository,
};
use hemolink_core::Error;

fn user_form(name: &str, group: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        email: format!("{}@example.com", name),
        phone: None,
        address: "12 Main St".to_string(),
        blood_group: group.to_string(),
    }
}

async fn seed_user(users: &MemoryUserRepository, name: &str) -> User {
    let user = User::new(&user_form(name, "O+"), BloodGroup::OPositive);
    users.create_user(&user).await.unwrap();
    user
}

fn chat_fixture() -> (Arc<MemoryUserRepository>, UserService, ChatService) {
    let users = Arc::new(MemoryUserRepository::default());
    let follows = Arc::new(MemoryFollowRepository::new(users.clone()));
    let chat = Arc::new(MemoryChatMessageRepository::default());
    let user_service = UserService::new(users.clone(), follows.clone());
    let chat_service = ChatService::new(users.clone(), follows, chat);
    (users, user_service, chat_service)
}

#[tokio::test]
async fn chat_requires_a_follow_edge() -> Result<(), Error> {
    let (users, user_service, chat_service) = chat_fixture();
    let alice = seed_user(&users, "alice").await;
    let bob = seed_user(&users, "bob").await;

    let result = chat_service
        .send_message(alice.user_id, bob.user_id, "hi")
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));

    // One direction is enough, and it opens the conversation both ways.
    user_service.follow(alice.user_id, bob.user_id).await?;
    chat_service
        .send_message(alice.user_id, bob.user_id, "hi bob")
        .await?;
    chat_service
        .send_message(bob.user_id, alice.user_id, "hi alice")
        .await?;

    let conversation = chat_service.conversation(alice.user_id, bob.user_id).await?;
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[0].content, "hi bob");
    assert_eq!(conversation[1].content, "hi alice");
    Ok(())
}

#[tokio::test]
async fn chat_rejects_self_empty_and_unknown_targets() -> Result<(), Error> {
    let (users, _, chat_service) = chat_fixture();
    let alice = seed_user(&users, "alice").await;

    assert!(matches!(
        chat_service.send_message(alice.user_id, alice.user_id, "me").await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        chat_service.send_message(alice.user_id, Uuid::new_v4(), "hi").await,
        Err(Error::NotFound(_))
    ));

    let bob = seed_user(&users, "bob").await;
    assert!(matches!(
        chat_service.send_message(alice.user_id, bob.user_id, "   ").await,
        Err(Error::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn follow_management_is_idempotent() -> Result<(), Error> {
    let (users, user_service, _) = chat_fixture();
    let alice = seed_user(&users, "alice").await;
    let bob = seed_user(&users, "bob").await;

    // Self-follow is silently ignored; duplicates collapse.
    user_service.follow(alice.user_id, alice.user_id).await?;
    user_service.follow(alice.user_id, bob.user_id).await?;
    user_service.follow(alice.user_id, bob.user_id).await?;

    let bob_lists = user_service.follow_lists(bob.user_id).await?;
    assert_eq!(bob_lists.followers.len(), 1);
    assert_eq!(bob_lists.followers[0].user_id, alice.user_id);
    assert!(bob_lists.following.is_empty());

    let alice_lists = user_service.follow_lists(alice.user_id).await?;
    assert!(alice_lists.followers.is_empty());
    assert_eq!(alice_lists.following.len(), 1);

    user_service.unfollow(alice.user_id, bob.user_id).await?;
    assert!(user_service.follow_lists(bob.user_id).await?.followers.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() -> Result<(), Error> {
    let (_, user_service, _) = chat_fixture();

    user_service.create_user(&user_form("alice", "O+")).await?;
    assert!(matches!(
        user_service.create_user(&user_form("alice", "A-")).await,
        Err(Error::Conflict(_))
    ));
    assert!(matches!(
        user_service.create_user(&user_form("eve", "Z+")).await,
        Err(Error::Validation(_))
    ));
    Ok(())
}

fn camp_form(name: &str, city: &str, date: NaiveDate, permanent: bool) -> NewBloodCamp {
    NewBloodCamp {
        name: name.to_string(),
        organized_by: "Red Crescent".to_string(),
        date,
        time: "10:00 - 16:00".to_string(),
        venue: "Community hall".to_string(),
        city: city.to_string(),
        latitude: None,
        longitude: None,
        contact_person: "Sam Lee".to_string(),
        contact_phone: "555-0170".to_string(),
        min_age: 18,
        max_age: 60,
        min_weight: 50,
        notes: None,
        permanent,
    }
}

fn camp_fixture() -> (
    Arc<MemoryBloodCampRepository>,
    Arc<MemoryBloodRequestRepository>,
    CampService,
) {
    let camps = Arc::new(MemoryBloodCampRepository::default());
    let requests = Arc::new(MemoryBloodRequestRepository::default());
    let service = CampService::new(camps.clone(), requests.clone());
    (camps, requests, service)
}

#[tokio::test]
async fn camp_listing_filters_by_city_and_date() -> Result<(), Error> {
    let (camps, _, service) = camp_fixture();
    let creator = Uuid::new_v4();
    let today = Utc::now().date_naive();

    service
        .create_camp(creator, &camp_form("spring drive", "Springfield", today + Duration::days(3), false))
        .await?;
    service
        .create_camp(creator, &camp_form("past drive", "Springfield", today - Duration::days(3), false))
        .await?;
    service
        .create_camp(creator, &camp_form("standing center", "Shelbyville", today - Duration::days(30), true))
        .await?;

    // Past non-permanent camps are not listed; permanent ones always are.
    let all = service.list_camps(today, None).await?;
    assert_eq!(all.len(), 2);

    let springfield = service.list_camps(today, Some("springfield")).await?;
    assert_eq!(springfield.len(), 1);
    assert_eq!(springfield[0].name, "spring drive");

    // The sweep removes the past camp but keeps the permanent one.
    assert_eq!(camps.delete_expired_camps(today).await?, 1);
    assert_eq!(camps.count_camps().await?, 2);
    Ok(())
}

#[tokio::test]
async fn camp_validation_and_lookup() -> Result<(), Error> {
    let (_, _, service) = camp_fixture();
    let creator = Uuid::new_v4();
    let today = Utc::now().date_naive();

    let mut bad = camp_form("bad", "Springfield", today, false);
    bad.min_age = 70;
    bad.max_age = 60;
    assert!(matches!(
        service.create_camp(creator, &bad).await,
        Err(Error::Validation(_))
    ));

    assert!(matches!(
        service.get_camp(Uuid::new_v4()).await,
        Err(Error::NotFound(_))
    ));

    let camp = service
        .create_camp(creator, &camp_form("ok", "Springfield", today, false))
        .await?;
    assert_eq!(service.get_camp(camp.camp_id).await?.camp_id, camp.camp_id);
    Ok(())
}

#[tokio::test]
async fn dashboard_counts_camps_and_requests() -> Result<(), Error> {
    let (_, requests, service) = camp_fixture();
    let creator = Uuid::new_v4();
    let today = Utc::now().date_naive();

    for i in 0..6 {
        service
            .create_camp(
                creator,
                &camp_form(&format!("camp {}", i), "Springfield", today + Duration::days(i), false),
            )
            .await?;
    }
    service
        .create_camp(creator, &camp_form("old", "Springfield", today - Duration::days(2), false))
        .await?;

    let summary = service.dashboard(today).await?;
    assert_eq!(summary.total_camps, 7);
    assert_eq!(summary.upcoming_camps, 6);
    assert_eq!(summary.total_requests, 0);
    assert_eq!(summary.recent_camps.len(), 5);
    assert!(requests.requests.is_empty());
    Ok(())
}
