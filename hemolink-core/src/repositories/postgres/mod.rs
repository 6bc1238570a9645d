// src/repositories/postgres/mod.rs

pub mod blood_camps;
pub mod blood_requests;
pub mod chat_messages;
pub mod dispatches;
pub mod follows;
pub mod notifications;
pub mod users;

pub use blood_camps::PostgresBloodCampRepository;
pub use blood_requests::PostgresBloodRequestRepository;
pub use chat_messages::PostgresChatMessageRepository;
pub use dispatches::PostgresDispatchRepository;
pub use follows::PostgresFollowRepository;
pub use notifications::PostgresNotificationRepository;
pub use users::PostgresUserRepository;
