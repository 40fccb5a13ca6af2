/// Task model and store operations
///
/// Every task is owned by exactly one user. Reads and mutations are scoped by
/// [`Ownership`]: a regular caller only ever matches its own rows, an admin
/// caller matches any row. A row that exists but is owned by someone else is
/// reported exactly like a missing row (`None`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'completed');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{CreateTask, Ownership, Task};
/// use chrono::Utc;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let task = Task::create(&pool, user_id, CreateTask {
///     title: "Pay rent".to_string(),
///     description: None,
///     due_date: Some(Utc::now().date_naive()),
///     status: None,
/// }).await?;
///
/// let mine = Task::list_by_owner(&pool, user_id).await?;
/// assert_eq!(mine[0].id, task.id);
///
/// Task::delete(&pool, Ownership::Owner(user_id), task.id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;

/// Maximum title length, matching the column width
pub const MAX_TITLE_LEN: usize = 255;

/// Task completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not done yet
    #[default]
    Pending,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Converts status to string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// The other status
    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

/// Whose rows an operation may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Only rows owned by this user
    Owner(i64),

    /// Any row (admin)
    Any,
}

impl Ownership {
    fn owner_id(&self) -> Option<i64> {
        match self {
            Ownership::Owner(id) => Some(*id),
            Ownership::Any => None,
        }
    }
}

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Input failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Short title, never empty
    pub title: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Completion status
    pub status: TaskStatus,

    /// Optional due date (no time component)
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,
}

/// Task joined with its owner, for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskWithOwner {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub task: Task,

    /// Owner display name
    pub user_name: String,

    /// Owner email
    pub user_email: String,
}

/// Pending task due on or before a date, joined with its owner
///
/// Row shape of the reminder query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DueTask {
    pub task_id: i64,
    pub title: String,
    pub due_date: NaiveDate,
    pub user_name: String,
    pub user_email: String,
}

/// Input for creating a task
///
/// The owner is never part of the input; it always comes from the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTask {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// An empty string, as sent by an unset date input, means no due date
    #[serde(default, deserialize_with = "blank_date")]
    pub due_date: Option<NaiveDate>,

    /// Defaults to `pending` when absent
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Input for a partial task update
///
/// Absent fields are left unchanged. For the nullable columns an explicit
/// `null` clears the value: `Some(None)` clears, `None` keeps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "blank_date_patch")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Distinguishes a present `null` from an absent field
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `YYYY-MM-DD`, with `null` and `""` both read as no date
fn blank_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<NaiveDate>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Like [`blank_date`], but a present `""` clears the stored date
fn blank_date_patch<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_date(deserializer).map(Some)
}

/// Validates and normalizes a title
pub fn validate_title(title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(TaskError::Validation {
            field: "title",
            message: "Title is required".to_string(),
        });
    }

    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(TaskError::Validation {
            field: "title",
            message: format!("Title must be at most {} characters", MAX_TITLE_LEN),
        });
    }

    Ok(trimmed.to_string())
}

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, due_date, created_at, updated_at";

impl Task {
    /// Creates a task owned by `owner_id`
    ///
    /// # Errors
    ///
    /// - `TaskError::Validation` if the title is empty or too long
    /// - `TaskError::Database` if the owner doesn't exist or the insert fails
    pub async fn create(pool: &PgPool, owner_id: i64, data: CreateTask) -> Result<Self, TaskError> {
        let title = validate_title(&data.title)?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.status.unwrap_or_default())
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task within an ownership scope
    pub async fn find(pool: &PgPool, scope: Ownership, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2)
            "#
        ))
        .bind(id)
        .bind(scope.owner_id())
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists every task with its owner, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithOwner>(
            r#"
            SELECT t.id, t.user_id, t.title, t.description, t.status, t.due_date,
                   t.created_at, t.updated_at,
                   u.name AS user_name, u.email AS user_email
            FROM tasks t
            JOIN users u ON t.user_id = u.id
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update within an ownership scope
    ///
    /// `updated_at` is refreshed on every successful call, even when no field
    /// is supplied. The owner column is never written.
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task matched the id and scope
    pub async fn update(
        pool: &PgPool,
        scope: Ownership,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, TaskError> {
        let title = data.title.as_deref().map(validate_title).transpose()?;

        // $1 = id, $2 = owner scope, field binds follow
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2) RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(scope.owner_id());

        if let Some(title) = title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        Ok(q.fetch_optional(pool).await?)
    }

    /// Deletes a task within an ownership scope
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if none matched
    pub async fn delete(pool: &PgPool, scope: Ownership, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tasks WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(scope.owner_id())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Pending tasks due on or before `today`, joined with their owners
    ///
    /// Ordered by recipient, then due date, then id, so that grouping by
    /// recipient keeps each user's tasks oldest-due first.
    pub async fn list_due_for_reminder(
        pool: &PgPool,
        today: NaiveDate,
    ) -> Result<Vec<DueTask>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DueTask>(
            r#"
            SELECT t.id AS task_id, t.title, t.due_date,
                   u.name AS user_name, u.email AS user_email
            FROM tasks t
            JOIN users u ON t.user_id = u.id
            WHERE t.status = 'pending'
              AND t.due_date IS NOT NULL
              AND t.due_date <= $1
            ORDER BY u.email, t.due_date, t.id
            "#,
        )
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Counts a user's tasks
    pub async fn count_by_owner(pool: &PgPool, owner_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str_and_toggle() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Pending.toggled().toggled(), TaskStatus::Pending);
    }

    #[test]
    fn test_task_status_rejects_unknown_values() {
        let ok: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(ok, TaskStatus::Completed);

        assert!(serde_json::from_str::<TaskStatus>("\"archived\"").is_err());
        assert!(serde_json::from_str::<TaskStatus>("\"Pending\"").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Pay rent ").unwrap(), "Pay rent");
        assert!(matches!(
            validate_title(""),
            Err(TaskError::Validation { field: "title", .. })
        ));
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_create_task_defaults() {
        let data: CreateTask = serde_json::from_str(r#"{"title": "Pay rent"}"#).unwrap();
        assert_eq!(data.title, "Pay rent");
        assert!(data.description.is_none());
        assert!(data.due_date.is_none());
        assert!(data.status.is_none());
    }

    #[test]
    fn test_create_task_ignores_owner_field() {
        let data: CreateTask =
            serde_json::from_str(r#"{"title": "x", "user_id": 99, "due_date": "2025-03-01"}"#)
                .unwrap();
        assert_eq!(data.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_update_task_distinguishes_null_from_absent() {
        let absent: UpdateTask = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert!(absent.description.is_none());
        assert!(absent.due_date.is_none());
        assert_eq!(absent.status, Some(TaskStatus::Completed));

        let cleared: UpdateTask =
            serde_json::from_str(r#"{"description": null, "due_date": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTask =
            serde_json::from_str(r#"{"description": "notes", "due_date": "2025-01-31"}"#).unwrap();
        assert_eq!(set.description, Some(Some("notes".to_string())));
        assert_eq!(set.due_date, Some(NaiveDate::from_ymd_opt(2025, 1, 31)));
    }

    #[test]
    fn test_blank_due_date_means_none() {
        let created: CreateTask = serde_json::from_str(r#"{"title": "x", "due_date": ""}"#).unwrap();
        assert!(created.due_date.is_none());

        let created: CreateTask = serde_json::from_str(r#"{"title": "x", "due_date": null}"#).unwrap();
        assert!(created.due_date.is_none());

        let cleared: UpdateTask = serde_json::from_str(r#"{"due_date": ""}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));
    }

    #[test]
    fn test_malformed_due_date_rejected() {
        assert!(serde_json::from_str::<CreateTask>(r#"{"title": "x", "due_date": "31/01/2025"}"#).is_err());
        assert!(serde_json::from_str::<UpdateTask>(r#"{"due_date": "2025-02-30"}"#).is_err());
        assert!(serde_json::from_str::<UpdateTask>(r#"{"due_date": 20250101}"#).is_err());
    }

    #[test]
    fn test_ownership_scope() {
        assert_eq!(Ownership::Owner(5).owner_id(), Some(5));
        assert_eq!(Ownership::Any.owner_id(), None);
    }

    #[test]
    fn test_task_with_owner_serializes_flat() {
        let row = TaskWithOwner {
            task: Task {
                id: 1,
                user_id: 2,
                title: "t".to_string(),
                description: None,
                status: TaskStatus::Pending,
                due_date: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            user_name: "Ann".to_string(),
            user_email: "ann@example.com".to_string(),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["user_email"], "ann@example.com");
    }
}
