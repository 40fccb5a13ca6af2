//! # TaskDesk Worker
//!
//! Sends each user one reminder a day listing their pending tasks that are
//! due today or overdue.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://... MAIL_WEBHOOK_URL=https://... cargo run -p taskdesk-worker
//! ```

use std::sync::Arc;
use taskdesk_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
};
use taskdesk_worker::{
    config::WorkerConfig,
    notifier::{LogNotifier, Notifier, WebhookNotifier},
    reminder::ReminderJob,
    scheduler::ReminderScheduler,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdesk_worker=debug,taskdesk_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("TaskDesk Worker v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = WorkerConfig::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let notifier: Arc<dyn Notifier> = match &config.mail.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            config.mail.from.clone(),
            config.mail.api_key.clone(),
        )?),
        None => {
            tracing::warn!("MAIL_WEBHOOK_URL not set, reminders will only be logged");
            Arc::new(LogNotifier::new(config.mail.from.clone()))
        }
    };
    tracing::info!(notifier = notifier.name(), concurrency = config.concurrency, "Notifier ready");

    let job = Arc::new(ReminderJob::new(pool.clone(), notifier, config.concurrency));
    let scheduler = ReminderScheduler::new(job, config.schedule).run_on_start(config.run_on_start);

    let shutdown = scheduler.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    scheduler.run().await;

    close_pool(pool).await;
    tracing::info!("Worker stopped");

    Ok(())
}
