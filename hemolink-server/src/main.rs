// hemolink-server/src/main.rs

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use hemolink_common::traits::repository_traits::{
    BloodCampRepository, BloodRequestRepository, ChatMessageRepository, DispatchRepository,
    FollowRepository, NotificationRepository, UserRepository,
};
use hemolink_common::traits::sink_traits::MailSink;
use hemolink_core::dispatch::{Dispatcher, DispatcherConfig};
use hemolink_core::repositories::postgres::{
    PostgresBloodCampRepository, PostgresBloodRequestRepository, PostgresChatMessageRepository,
    PostgresDispatchRepository, PostgresFollowRepository, PostgresNotificationRepository,
    PostgresUserRepository,
};
use hemolink_core::services::{
    CampService, ChatService, RequestService, RequestServiceConfig, UserService,
};
use hemolink_core::sinks::{HttpMailSink, NullMailSink};
use hemolink_core::tasks::{spawn_dispatch_worker_task, spawn_expiry_sweep_task};
use hemolink_core::Database;

mod routes;
mod state;

use state::AppState;

#[derive(Parser, Debug, Clone)]
#[command(name = "hemolink")]
#[command(author, version, about = "hemolink - blood donation coordination server")]
struct Args {
    /// Address to which the server will bind
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// Postgres connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://hemolink@localhost:5432/hemolink"
    )]
    database_url: String,

    /// Minutes an issued OTP stays valid.
    #[arg(long, default_value_t = 15)]
    otp_validity_minutes: i64,

    /// From-address stamped on outbound mail.
    #[arg(long, default_value = "no-reply@hemolink.local")]
    mail_from: String,

    /// HTTP mail API endpoint. Mail is logged and dropped when unset.
    #[arg(long, env = "MAIL_API_URL")]
    mail_api_url: Option<String>,

    /// Bearer token for the mail API.
    #[arg(long, env = "MAIL_API_KEY", default_value = "")]
    mail_api_key: String,

    /// Seconds between dispatch worker passes.
    #[arg(long, default_value_t = 5)]
    dispatch_interval_secs: u64,

    /// Seconds between expiry sweeps.
    #[arg(long, default_value_t = 60)]
    sweep_interval_secs: u64,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("hemolink=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub).expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "hemolink starting. bind={}, otp_validity={}m",
        args.bind_addr, args.otp_validity_minutes
    );

    let db = Database::new(&args.database_url).await?;
    db.migrate().await?;
    let pool = db.pool().clone();

    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let follows: Arc<dyn FollowRepository> = Arc::new(PostgresFollowRepository::new(pool.clone()));
    let requests: Arc<dyn BloodRequestRepository> =
        Arc::new(PostgresBloodRequestRepository::new(pool.clone()));
    let chat_repo: Arc<dyn ChatMessageRepository> =
        Arc::new(PostgresChatMessageRepository::new(pool.clone()));
    let notifications: Arc<dyn NotificationRepository> =
        Arc::new(PostgresNotificationRepository::new(pool.clone()));
    let camps: Arc<dyn BloodCampRepository> =
        Arc::new(PostgresBloodCampRepository::new(pool.clone()));
    let dispatches: Arc<dyn DispatchRepository> =
        Arc::new(PostgresDispatchRepository::new(pool.clone()));

    let mail: Arc<dyn MailSink> = match &args.mail_api_url {
        Some(url) => Arc::new(HttpMailSink::new(url, &args.mail_api_key)),
        None => Arc::new(NullMailSink),
    };

    let dispatcher = Arc::new(Dispatcher::new(
        dispatches,
        chat_repo.clone(),
        notifications.clone(),
        mail,
        DispatcherConfig::new(&args.mail_from),
    ));

    let request_service = Arc::new(RequestService::new(
        requests.clone(),
        users.clone(),
        dispatcher.clone(),
        RequestServiceConfig {
            otp_validity: chrono::Duration::minutes(args.otp_validity_minutes),
        },
    ));
    let chat_service = Arc::new(ChatService::new(
        users.clone(),
        follows.clone(),
        chat_repo.clone(),
    ));
    let camp_service = Arc::new(CampService::new(camps.clone(), requests.clone()));
    let user_service = Arc::new(UserService::new(users.clone(), follows.clone()));

    spawn_dispatch_worker_task(
        dispatcher.clone(),
        Duration::from_secs(args.dispatch_interval_secs),
    );
    spawn_expiry_sweep_task(
        request_service.clone(),
        camps.clone(),
        Duration::from_secs(args.sweep_interval_secs),
    );

    let app = routes::router(AppState {
        requests: request_service,
        chat: chat_service,
        camps: camp_service,
        users: user_service,
        notifications,
    });

    let addr: SocketAddr = args.bind_addr.parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
