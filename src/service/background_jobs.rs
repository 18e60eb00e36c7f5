// service/background_jobs.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::AppState;

const RELEASE_BATCH_SIZE: i64 = 200;

/// Releases held pay for completed bookings once the dispute window closes.
pub async fn start_fund_release_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(3600)); // hourly

    loop {
        interval.tick().await;

        tracing::info!("Running fund release job at {}", Utc::now());

        match app_state
            .wallet_service
            .process_due_releases(RELEASE_BATCH_SIZE)
            .await
        {
            Ok(released) => tracing::info!("Fund release job completed: {} bookings released", released),
            Err(e) => tracing::error!("Fund release job failed: {}", e),
        }
    }
}
