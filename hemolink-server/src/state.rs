// hemolink-server/src/state.rs

use std::sync::Arc;

use hemolink_common::traits::repository_traits::NotificationRepository;
use hemolink_core::services::{CampService, ChatService, RequestService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub requests: Arc<RequestService>,
    pub chat: Arc<ChatService>,
    pub camps: Arc<CampService>,
    pub users: Arc<UserService>,
    pub notifications: Arc<dyn NotificationRepository>,
}
