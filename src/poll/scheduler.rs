use std::time::Duration;
use tokio::time::interval;

use crate::common::AppState;
use crate::poll::worker;

/// Run the chart refresh task on a schedule.
///
/// Keeps the payload cache warm for every active meter so dashboard loads
/// and the browser's periodic polls are served without an upstream round
/// trip. Retries with a delay on failure, backing off the same way when the
/// portal rate-limits us.
pub async fn run_chart_refresh(state: AppState) {
    let interval_secs = state.config.refresh_interval_seconds;
    let retry_delay_secs = state.config.refresh_retry_delay_seconds;
    let max_retries = state.config.refresh_retry_max;

    tracing::info!(interval_secs, "Starting chart refresh scheduler");

    let mut ticker = interval(Duration::from_secs(interval_secs));

    // Run initial refresh immediately
    ticker.tick().await;

    loop {
        tracing::debug!("Running chart refresh...");

        let mut retries = 0;
        loop {
            match worker::refresh_all_charts(&state).await {
                Ok(()) => {
                    tracing::debug!("Chart refresh completed successfully");
                    break;
                }
                Err(e) => {
                    retries += 1;
                    if e.to_string().contains("Rate limited") && retries <= max_retries {
                        tracing::warn!(
                            retry = retries,
                            max_retries,
                            delay_secs = retry_delay_secs,
                            "Chart refresh rate limited, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
                    } else if retries <= max_retries {
                        tracing::error!(
                            error = %e,
                            retry = retries,
                            max_retries,
                            "Chart refresh failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
                    } else {
                        tracing::error!(
                            error = %e,
                            max_retries,
                            "Chart refresh failed after max retries"
                        );
                        break;
                    }
                }
            }
        }

        // Wait for next tick
        ticker.tick().await;
    }
}
