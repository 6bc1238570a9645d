// hemolink-core/src/tasks/expiry_sweep.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::services::RequestService;
use hemolink_common::traits::repository_traits::BloodCampRepository;

/// Spawns a background task that periodically removes verified/expired
/// blood requests and past non-permanent camps. Listing stays a pure read
/// because this owns the destructive cleanup.
pub fn spawn_expiry_sweep_task(
    request_service: Arc<RequestService>,
    camps: Arc<dyn BloodCampRepository>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            let now = Utc::now();

            if let Err(e) = request_service.purge_expired(now).await {
                warn!("Request sweep failed: {}", e);
            }

            match camps.delete_expired_camps(now.date_naive()).await {
                Ok(0) => {}
                Ok(n) => info!("Sweep removed {} expired camp(s)", n),
                Err(e) => warn!("Camp sweep failed: {}", e),
            }
        }
    })
}
