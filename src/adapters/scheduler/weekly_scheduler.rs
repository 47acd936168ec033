//! Background scheduler for the weekly report run.
//!
//! Ticks on an interval and triggers one `WeeklyReportMailer` run when
//! the configured send day arrives. The mailer's per-week send claim is
//! what actually guarantees one email per user per ISO week; the
//! in-process week marker here only spares redundant sweeps within a
//! single process lifetime.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `check_interval` | 1h | How often to check whether a run is due |
//! | `send_weekday` | Monday | Day of week the report goes out |
//!
//! ## Graceful Shutdown
//!
//! The scheduler exits on the shutdown signal without starting another
//! run; a run already in flight finishes first.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Weekday};
use tokio::sync::{watch, Mutex};
use tokio::time;
use tracing::{info, warn};

use crate::application::handlers::notification::{WeeklyReportMailer, WeeklyRunReport};
use crate::domain::foundation::Timestamp;
use crate::domain::notification::NotificationError;

/// Configuration for the weekly scheduler.
#[derive(Debug, Clone)]
pub struct WeeklySchedulerConfig {
    /// How often to check whether a run is due.
    pub check_interval: Duration,

    /// Day of week the report goes out.
    pub send_weekday: Weekday,
}

impl Default for WeeklySchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60 * 60),
            send_weekday: Weekday::Mon,
        }
    }
}

impl WeeklySchedulerConfig {
    /// Create config with a custom check interval.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Create config with a custom send day.
    pub fn with_send_weekday(mut self, weekday: Weekday) -> Self {
        self.send_weekday = weekday;
        self
    }
}

/// Background service that fires the weekly report run on its send day.
pub struct WeeklyScheduler {
    mailer: Arc<WeeklyReportMailer>,
    config: WeeklySchedulerConfig,
    /// ISO week of the last successful run in this process.
    last_run: Mutex<Option<(i32, u32)>>,
}

impl WeeklyScheduler {
    /// Create a new scheduler with default configuration.
    pub fn new(mailer: Arc<WeeklyReportMailer>) -> Self {
        Self::with_config(mailer, WeeklySchedulerConfig::default())
    }

    /// Create a new scheduler with custom configuration.
    pub fn with_config(mailer: Arc<WeeklyReportMailer>, config: WeeklySchedulerConfig) -> Self {
        Self {
            mailer,
            config,
            last_run: Mutex::new(None),
        }
    }

    /// Run the scheduler loop until shutdown signal is received.
    ///
    /// A failed run is logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.check_interval);
        info!(send_weekday = %self.config.send_weekday, "Weekly report scheduler started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Weekly report scheduler stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(err) = self.tick_once(Timestamp::now()).await {
                        warn!(error = %err, "Weekly report run failed, will retry next tick");
                    }
                }
            }
        }
    }

    /// Run exactly one scheduling check as of `now`.
    ///
    /// Returns the run report when a run fired, `None` when the day is
    /// wrong or this process already ran the week. Also useful for
    /// testing without the full loop.
    pub async fn tick_once(
        &self,
        now: Timestamp,
    ) -> Result<Option<WeeklyRunReport>, NotificationError> {
        let last = *self.last_run.lock().await;
        if !is_due(now, self.config.send_weekday, last) {
            return Ok(None);
        }

        let report = self.mailer.run(now).await?;
        *self.last_run.lock().await = Some(now.iso_week());
        Ok(Some(report))
    }
}

/// A run is due on the send day, at most once per ISO week.
fn is_due(now: Timestamp, send_weekday: Weekday, last_run: Option<(i32, u32)>) -> bool {
    if now.as_datetime().weekday() != send_weekday {
        return false;
    }
    last_run != Some(now.iso_week())
}
