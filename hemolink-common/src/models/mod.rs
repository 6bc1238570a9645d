// File: hemolink-common/src/models/mod.rs
pub mod blood_camp;
pub mod blood_request;
pub mod chat;
pub mod dispatch;
pub mod notification;
pub mod user;

pub use blood_camp::{BloodCamp, DashboardSummary, NewBloodCamp};
pub use blood_request::{BloodGroup, BloodRequest, NewBloodRequest, RequestAcceptance};
pub use chat::ChatMessage;
pub use dispatch::{DispatchKind, OutboundDispatch};
pub use notification::Notification;
pub use user::{Follow, NewUser, User};
