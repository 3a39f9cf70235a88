//! Background vendor-status poller.
//!
//! The engine itself carries no timers; the presentation layer starts
//! a poller when results appear and stops it when they are cleared or
//! the view goes away. Each tick replaces the status cache wholesale;
//! a failed fetch keeps the last-known snapshot.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::status::{VendorStatusCache, VendorStatusUpdate};

/// How often vendor statuses are refreshed while results are shown.
pub const STATUS_POLL_PERIOD: Duration = Duration::from_secs(30);

/// Handle to a running poll task. Dropping or calling [`stop`] aborts
/// the task; the cache keeps whatever snapshot it last held.
///
/// [`stop`]: StatusPoller::stop
#[derive(Debug)]
pub struct StatusPoller {
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Spawns the poll loop. The first fetch happens immediately, then
    /// every `period`. `fetch` is typically a closure around
    /// [`RateApiClient::get_vendor_statuses`].
    ///
    /// [`RateApiClient::get_vendor_statuses`]: crate::infra::rate_api::RateApiClient::get_vendor_statuses
    pub fn spawn<F, Fut, E>(cache: VendorStatusCache, period: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<VendorStatusUpdate>, E>> + Send,
        E: std::fmt::Display + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match fetch().await {
                    Ok(updates) => {
                        debug!(count = updates.len(), "vendor status refresh");
                        cache.refresh(updates);
                    }
                    Err(err) => {
                        warn!("vendor status poll failed: {err}; keeping last snapshot");
                    }
                }
            }
        });
        Self { handle }
    }

    /// Stops polling. Idempotent.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
