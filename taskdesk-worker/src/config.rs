/// Configuration for the reminder worker
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `REMINDER_HOUR` / `REMINDER_MINUTE`: Daily run time in UTC (default: 09:00)
/// - `REMINDER_CONCURRENCY`: Notifications sent in parallel (default: 4)
/// - `REMINDER_RUN_ON_START`: Also run once at startup (default: false)
/// - `MAIL_FROM`: Sender address (default: reminders@taskdesk.local)
/// - `MAIL_WEBHOOK_URL`: Mail relay endpoint; reminders are only logged when unset
/// - `MAIL_API_KEY`: Bearer token for the relay (optional)

use crate::scheduler::{DailySchedule, DEFAULT_HOUR, DEFAULT_MINUTE};
use std::env;
use std::str::FromStr;
use taskdesk_shared::db::pool::DatabaseConfig;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database: DatabaseConfig,
    pub schedule: DailySchedule,
    pub concurrency: usize,
    pub run_on_start: bool,
    pub mail: MailConfig,
}

/// Outbound mail settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from: String,
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
}

impl WorkerConfig {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let hour: u32 = parse_var("REMINDER_HOUR", DEFAULT_HOUR)?;
        let minute: u32 = parse_var("REMINDER_MINUTE", DEFAULT_MINUTE)?;

        Ok(Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
                ..Default::default()
            },
            schedule: DailySchedule::new(hour, minute)?,
            concurrency: parse_var("REMINDER_CONCURRENCY", 4)?,
            run_on_start: parse_var("REMINDER_RUN_ON_START", false)?,
            mail: MailConfig {
                from: env::var("MAIL_FROM").unwrap_or_else(|_| "reminders@taskdesk.local".to_string()),
                webhook_url: non_empty_var("MAIL_WEBHOOK_URL"),
                api_key: non_empty_var("MAIL_API_KEY"),
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", name, raw, e))
}
