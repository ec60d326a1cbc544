//! Cron-driven scheduler for the periodic agent sweeps
//!
//! Ticks once a minute like a cron daemon and fires each sweep when its
//! schedule has a due time inside the window since the last tick. Sweeps are
//! also exposed directly so they can be triggered on demand.

pub mod sweeps;

pub use sweeps::{analysis_sweep, overdue_sweep, SweepReport};

use crate::agents::AgentExecutor;
use crate::config::Config;
use crate::db::Database;
use crate::error::AgentError;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Seconds between schedule checks
const TICK_SECS: u64 = 60;

pub struct Scheduler {
    db: Arc<Database>,
    executor: Arc<AgentExecutor>,
    overdue_schedule: Schedule,
    analysis_schedule: Schedule,
    overdue_threshold_days: i64,
}

impl Scheduler {
    pub fn new(
        db: Arc<Database>,
        executor: Arc<AgentExecutor>,
        config: &Config,
    ) -> Result<Self, AgentError> {
        let overdue_schedule = Schedule::from_str(&config.overdue_sweep_cron).map_err(|e| {
            AgentError::Internal(format!(
                "invalid OVERDUE_SWEEP_CRON '{}': {}",
                config.overdue_sweep_cron, e
            ))
        })?;
        let analysis_schedule = Schedule::from_str(&config.analysis_sweep_cron).map_err(|e| {
            AgentError::Internal(format!(
                "invalid ANALYSIS_SWEEP_CRON '{}': {}",
                config.analysis_sweep_cron, e
            ))
        })?;

        Ok(Self {
            db,
            executor,
            overdue_schedule,
            analysis_schedule,
            overdue_threshold_days: config.overdue_threshold_days,
        })
    }

    /// Run until the shutdown channel fires
    pub async fn start(self: Arc<Self>, mut shutdown_rx: oneshot::Receiver<()>) {
        log::info!(
            "[SCHEDULER] started (overdue threshold {} days)",
            self.overdue_threshold_days
        );
        let mut interval = tokio::time::interval(Duration::from_secs(TICK_SECS));
        // consume the immediate first tick so sweeps only run on schedule
        interval.tick().await;
        let mut last_check = Utc::now();

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    log::info!("[SCHEDULER] shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let now = Utc::now();
                    self.run_due_sweeps(last_check, now).await;
                    last_check = now;
                }
            }
        }
    }

    async fn run_due_sweeps(&self, last_check: DateTime<Utc>, now: DateTime<Utc>) {
        if fires_within(&self.overdue_schedule, last_check, now) {
            if let Err(e) =
                overdue_sweep(&self.db, &self.executor, self.overdue_threshold_days).await
            {
                log::error!("[SCHEDULER] overdue sweep aborted: {}", e);
            }
        }
        if fires_within(&self.analysis_schedule, last_check, now) {
            if let Err(e) = analysis_sweep(&self.db, &self.executor).await {
                log::error!("[SCHEDULER] analysis sweep aborted: {}", e);
            }
        }
    }
}

/// True when the schedule has a fire time in (after, now]
fn fires_within(schedule: &Schedule, after: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    schedule
        .after(&after)
        .next()
        .map(|fire| fire <= now)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_schedules_parse() {
        assert!(Schedule::from_str("0 0 9 * * *").is_ok());
        assert!(Schedule::from_str("0 0 */6 * * *").is_ok());
        assert!(Schedule::from_str("every day at nine").is_err());
    }

    #[test]
    fn test_fires_within_window() {
        let daily = Schedule::from_str("0 0 9 * * *").unwrap();
        let before = Utc.with_ymd_and_hms(2025, 3, 1, 8, 59, 30).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 30).unwrap();

        assert!(fires_within(&daily, before, after));
        // window entirely before the fire time
        assert!(!fires_within(
            &daily,
            Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
        ));
    }

    #[test]
    fn test_six_hourly_fires_four_times_a_day() {
        let six_hourly = Schedule::from_str("0 0 */6 * * *").unwrap();
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 1).unwrap();
        let fires: Vec<_> = six_hourly
            .after(&start)
            .take_while(|t| *t < Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 1).unwrap())
            .collect();
        assert_eq!(fires.len(), 4);
    }
}
