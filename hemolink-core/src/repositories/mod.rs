// src/repositories/mod.rs

pub mod postgres;

pub use postgres::blood_camps::PostgresBloodCampRepository;
pub use postgres::blood_requests::PostgresBloodRequestRepository;
pub use postgres::chat_messages::PostgresChatMessageRepository;
pub use postgres::dispatches::PostgresDispatchRepository;
pub use postgres::follows::PostgresFollowRepository;
pub use postgres::notifications::PostgresNotificationRepository;
pub use postgres::users::PostgresUserRepository;
