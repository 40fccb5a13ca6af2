/// Daily reminder job
///
/// One run:
///
/// ```text
/// ReminderJob::run_once(today)
///   ├─> Task::list_due_for_reminder   pending tasks due on or before today
///   ├─> group_by_recipient            one bundle per email, query order kept
///   ├─> render                        one Notification per bundle
///   └─> Notifier::send                bounded concurrency, failures isolated
/// ```
///
/// Nothing is written back: a task that stays pending is reminded about again
/// on every following run.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_worker::{notifier::LogNotifier, reminder::ReminderJob};
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let job = ReminderJob::new(pool, Arc::new(LogNotifier::new("reminders@example.com")), 4);
/// let report = job.run_once(chrono::Utc::now().date_naive()).await?;
/// println!("{} recipients, {} failed", report.recipients, report.failed);
/// # Ok(())
/// # }
/// ```

use crate::notifier::{Notification, Notifier};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use taskdesk_shared::models::task::{DueTask, Task};
use tokio::sync::{Mutex, MutexGuard};

/// Subject line of every reminder
pub const SUBJECT: &str = "Task Reminder - Tasks Due Today";

/// Reminder job errors
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    /// Another run holds the guard
    #[error("A reminder run is already in progress")]
    AlreadyRunning,

    /// The due-task query failed; nothing was sent
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Due tasks for one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderBundle {
    pub email: String,
    pub name: String,
    pub tasks: Vec<DueTask>,
}

/// Outcome of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Distinct recipients with at least one due task
    pub recipients: usize,

    /// Notifications delivered
    pub sent: usize,

    /// Notifications that failed
    pub failed: usize,
}

/// Marker shown next to each task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueMarker {
    Overdue,
    DueToday,
}

impl DueMarker {
    /// Overdue when the due date is strictly before `today`
    pub fn for_date(due_date: NaiveDate, today: NaiveDate) -> Self {
        if due_date < today {
            DueMarker::Overdue
        } else {
            DueMarker::DueToday
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DueMarker::Overdue => "OVERDUE",
            DueMarker::DueToday => "Due Today",
        }
    }
}

/// Groups rows by recipient email
///
/// Bundles appear in order of each recipient's first row, and each bundle keeps
/// its rows in input order.
pub fn group_by_recipient(rows: Vec<DueTask>) -> Vec<ReminderBundle> {
    let mut bundles: Vec<ReminderBundle> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.user_email) {
            Some(&i) => bundles[i].tasks.push(row),
            None => {
                index.insert(row.user_email.clone(), bundles.len());
                bundles.push(ReminderBundle {
                    email: row.user_email.clone(),
                    name: row.user_name.clone(),
                    tasks: vec![row],
                });
            }
        }
    }

    bundles
}

/// Renders the message for one bundle
pub fn render(bundle: &ReminderBundle, today: NaiveDate) -> Notification {
    let lines: Vec<(String, &'static str)> = bundle
        .tasks
        .iter()
        .map(|task| (task.title.clone(), DueMarker::for_date(task.due_date, today).label()))
        .collect();

    let text_list = lines
        .iter()
        .map(|(title, label)| format!("• {} ({})", title, label))
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "Hello {},\n\n\
         You have the following tasks that are due today or overdue:\n\n\
         {}\n\n\
         Please log in to your Task Manager to update these tasks.\n\n\
         Best regards,\n\
         Task Manager Team\n",
        bundle.name, text_list
    );

    let html_list = lines
        .iter()
        .map(|(title, label)| format!("<li>{} ({})</li>", escape_html(title), label))
        .collect::<String>();

    let html = format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #2563eb;\">Task Reminder</h2>\
         <p>Hello {},</p>\
         <p>You have the following tasks that are due today or overdue:</p>\
         <ul>{}</ul>\
         <p>Please log in to your Task Manager to update these tasks.</p>\
         <p>Best regards,<br>Task Manager Team</p>\
         </div>",
        escape_html(&bundle.name),
        html_list
    );

    Notification {
        to: bundle.email.clone(),
        subject: SUBJECT.to_string(),
        text,
        html,
    }
}

/// Escapes text for inclusion in HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The reminder job
pub struct ReminderJob {
    db: PgPool,
    notifier: Arc<dyn Notifier>,
    concurrency: usize,
    running: Mutex<()>,
}

impl ReminderJob {
    /// Creates a job; `concurrency` is clamped to at least 1
    pub fn new(db: PgPool, notifier: Arc<dyn Notifier>, concurrency: usize) -> Self {
        Self {
            db,
            notifier,
            concurrency: concurrency.max(1),
            running: Mutex::new(()),
        }
    }

    /// Runs the job once for `today`
    ///
    /// # Errors
    ///
    /// - `AlreadyRunning` if a run is in progress; nothing is queried
    /// - `Database` if the due-task query fails; nothing is sent
    pub async fn run_once(&self, today: NaiveDate) -> Result<RunReport, ReminderError> {
        let _running = self.try_start()?;

        tracing::info!(%today, notifier = self.notifier.name(), "Reminder run starting");

        let rows = Task::list_due_for_reminder(&self.db, today).await.map_err(|e| {
            tracing::error!(error = %e, "Reminder query failed, aborting run");
            e
        })?;

        let report = self.dispatch(group_by_recipient(rows), today).await;

        tracing::info!(
            recipients = report.recipients,
            sent = report.sent,
            failed = report.failed,
            "Reminder run finished"
        );

        Ok(report)
    }

    fn try_start(&self) -> Result<MutexGuard<'_, ()>, ReminderError> {
        self.running.try_lock().map_err(|_| ReminderError::AlreadyRunning)
    }

    /// Sends one notification per bundle
    ///
    /// A failed send is logged and counted; it never stops the others.
    pub async fn dispatch(&self, bundles: Vec<ReminderBundle>, today: NaiveDate) -> RunReport {
        let recipients = bundles.len();
        let notifier = self.notifier.as_ref();

        let outcomes: Vec<bool> = stream::iter(bundles)
            .map(|bundle| async move {
                let notification = render(&bundle, today);
                match notifier.send(&notification).await {
                    Ok(()) => {
                        tracing::info!(to = %bundle.email, tasks = bundle.tasks.len(), "Reminder sent");
                        true
                    }
                    Err(e) => {
                        tracing::error!(to = %bundle.email, error = %e, "Failed to send reminder");
                        false
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let sent = outcomes.iter().filter(|ok| **ok).count();

        RunReport {
            recipients,
            sent,
            failed: recipients - sent,
        }
    }
}
