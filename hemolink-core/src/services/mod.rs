// src/services/mod.rs

pub mod camp_service;
pub mod chat_service;
pub mod request_service;
pub mod user_service;

pub use camp_service::CampService;
pub use chat_service::ChatService;
pub use request_service::{RequestService, RequestServiceConfig};
pub use user_service::{FollowLists, UserService};
