use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::db::MenuStore;
use crate::services::portal::PortalService;

/// Spawn a background task that closes overdue portals every `every_secs`.
pub fn start(store: Arc<dyn MenuStore>, every_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(every_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match PortalService::expire_overdue(store.as_ref(), Utc::now()).await {
                Ok(expired) if expired.is_empty() => {}
                Ok(expired) => {
                    for month in expired {
                        info!("Expiry sweep: closed portal {}", month);
                    }
                }
                Err(e) => warn!("Expiry sweep failed: {}", e),
            }
        }
    });
}
