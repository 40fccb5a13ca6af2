/// Daily trigger for the reminder job
///
/// The schedule is a wall-clock time in UTC. The scheduler sleeps until the
/// next occurrence, runs the job, and repeats until its shutdown token is
/// cancelled. A failed or refused run is logged and the scheduler waits for
/// the next occurrence; there is no retry.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_worker::{
///     notifier::LogNotifier,
///     reminder::ReminderJob,
///     scheduler::{DailySchedule, ReminderScheduler},
/// };
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let job = Arc::new(ReminderJob::new(pool, Arc::new(LogNotifier::new("reminders@example.com")), 4));
/// let scheduler = ReminderScheduler::new(job, DailySchedule::new(9, 0)?);
///
/// let shutdown = scheduler.shutdown_token();
/// tokio::spawn(async move {
///     let _ = tokio::signal::ctrl_c().await;
///     shutdown.cancel();
/// });
///
/// scheduler.run().await;
/// # Ok(())
/// # }
/// ```

use crate::reminder::{ReminderError, ReminderJob};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Schedule errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid reminder time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
}

/// Default run time, matching a `0 9 * * *` cron entry
pub const DEFAULT_HOUR: u32 = 9;
pub const DEFAULT_MINUTE: u32 = 0;

/// Once a day at a fixed UTC time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    time: NaiveTime,
}

impl DailySchedule {
    /// Creates a schedule for `hour:minute` UTC
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        let time =
            NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ScheduleError::InvalidTime { hour, minute })?;

        Ok(Self { time })
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Next occurrence strictly after `now`
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = Utc.from_utc_datetime(&now.date_naive().and_time(self.time));

        if today > now {
            today
        } else {
            today + ChronoDuration::days(1)
        }
    }
}

/// Runs the reminder job on a [`DailySchedule`]
pub struct ReminderScheduler {
    job: Arc<ReminderJob>,
    schedule: DailySchedule,
    run_on_start: bool,
    shutdown: CancellationToken,
}

impl ReminderScheduler {
    pub fn new(job: Arc<ReminderJob>, schedule: DailySchedule) -> Self {
        Self {
            job,
            schedule,
            run_on_start: false,
            shutdown: CancellationToken::new(),
        }
    }

    /// Also run once immediately when started
    pub fn run_on_start(mut self, enabled: bool) -> Self {
        self.run_on_start = enabled;
        self
    }

    /// Token that stops [`ReminderScheduler::run`] when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until the shutdown token is cancelled
    ///
    /// A run in progress is allowed to finish before returning.
    pub async fn run(&self) {
        tracing::info!(at = %self.schedule.time(), "Reminder scheduler starting (UTC)");

        if self.run_on_start && !self.shutdown.is_cancelled() {
            self.trigger().await;
        }

        loop {
            let now = Utc::now();
            let next = self.schedule.next_run_after(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

            tracing::info!(next_run = %next, "Next reminder run scheduled");

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Reminder scheduler shutting down");
                    break;
                }
                _ = sleep(wait) => {
                    self.trigger().await;
                }
            }
        }
    }

    async fn trigger(&self) {
        let today = Utc::now().date_naive();

        match self.job.run_once(today).await {
            Ok(report) => {
                tracing::debug!(?report, "Scheduled reminder run complete");
            }
            Err(ReminderError::AlreadyRunning) => {
                tracing::warn!("Skipping scheduled run: previous run still in progress");
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled reminder run failed");
            }
        }
    }
}
