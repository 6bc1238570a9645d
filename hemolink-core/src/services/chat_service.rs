// src/services/chat_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::Error;
use hemolink_common::models::chat::ChatMessage;
use hemolink_common::traits::repository_traits::{
    ChatMessageRepository, FollowRepository, UserRepository,
};

/// Direct messages between users. A conversation is only open when a follow
/// edge exists in at least one direction between the two users.
pub struct ChatService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    chat: Arc<dyn ChatMessageRepository>,
}

impl ChatService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        chat: Arc<dyn ChatMessageRepository>,
    ) -> Self {
        Self { users, follows, chat }
    }

    async fn ensure_open(&self, me: Uuid, other: Uuid) -> Result<(), Error> {
        if me == other {
            return Err(Error::Validation(
                "cannot open a conversation with yourself".to_string(),
            ));
        }
        self.users
            .get_user(other)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", other)))?;
        if !self.follows.follows_either(me, other).await? {
            return Err(Error::Validation(
                "you can only chat with users who follow you or whom you follow".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: &str,
    ) -> Result<ChatMessage, Error> {
        if content.trim().is_empty() {
            return Err(Error::Validation("message content is empty".to_string()));
        }
        self.ensure_open(sender_id, recipient_id).await?;

        let message = ChatMessage::new(sender_id, recipient_id, content);
        self.chat.insert_message(&message).await?;
        Ok(message)
    }

    /// Both directions between the two users, oldest first.
    pub async fn conversation(&self, me: Uuid, other: Uuid) -> Result<Vec<ChatMessage>, Error> {
        self.ensure_open(me, other).await?;
        self.chat.conversation(me, other).await
    }
}
