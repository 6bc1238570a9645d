// hemolink-core/src/tasks/dispatch_worker.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::dispatch::Dispatcher;

/// Spawns a background task that drains due outbound dispatches on a fixed
/// interval. Delivery failures are retried by the dispatcher itself; a
/// failure to even read the queue is logged and retried next tick.
pub fn spawn_dispatch_worker_task(
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            match dispatcher.run_due(Utc::now()).await {
                Ok(0) => {}
                Ok(n) => debug!("Dispatch worker delivered {} item(s)", n),
                Err(e) => warn!("Dispatch worker pass failed: {}", e),
            }
        }
    })
}
