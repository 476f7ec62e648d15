//! Bounded startup readiness retries.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

pub const STARTUP_ATTEMPTS: u32 = 5;
pub const STARTUP_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Run `check` up to `attempts` times, sleeping `delay` between failures.
///
/// Returns the last error once attempts are exhausted.
pub async fn wait_until_ready<F, Fut, E>(
    name: &str,
    attempts: u32,
    delay: Duration,
    mut check: F,
) -> Result<(), E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match check().await {
            Ok(()) => {
                info!(dependency = name, attempt, "Dependency ready");
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                warn!(dependency = name, attempt, attempts, "Not ready: {e}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(dependency = name, attempts, "Giving up: {e}");
                return Err(e);
            }
        }
    }
}
