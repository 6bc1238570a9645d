// src/services/user_service.rs

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::Error;
use hemolink_common::models::blood_request::BloodGroup;
use hemolink_common::models::user::{Follow, NewUser, User};
use hemolink_common::traits::repository_traits::{FollowRepository, UserRepository};

#[derive(Debug, Serialize)]
pub struct FollowLists {
    pub followers: Vec<User>,
    pub following: Vec<User>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    pub async fn create_user(&self, form: &NewUser) -> Result<User, Error> {
        let blood_group = BloodGroup::parse(&form.blood_group)?;
        if self.users.get_by_username(&form.username).await?.is_some() {
            return Err(Error::Conflict(format!(
                "username '{}' is already taken",
                form.username
            )));
        }

        let user = User::new(form, blood_group);
        self.users.create_user(&user).await?;
        info!("Created user {} ({})", user.username, user.user_id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, Error> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
    }

    /// Idempotent; following yourself is a silent no-op.
    pub async fn follow(&self, follower_id: Uuid, target_id: Uuid) -> Result<(), Error> {
        if follower_id == target_id {
            return Ok(());
        }
        self.users
            .get_user(target_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", target_id)))?;
        self.follows
            .create_follow(&Follow::new(follower_id, target_id))
            .await
    }

    pub async fn unfollow(&self, follower_id: Uuid, target_id: Uuid) -> Result<(), Error> {
        self.follows.delete_follow(follower_id, target_id).await
    }

    pub async fn follow_lists(&self, user_id: Uuid) -> Result<FollowLists, Error> {
        Ok(FollowLists {
            followers: self.follows.followers_of(user_id).await?,
            following: self.follows.following_of(user_id).await?,
        })
    }
}
