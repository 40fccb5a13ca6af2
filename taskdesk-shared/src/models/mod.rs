/// Database models for TaskDesk
///
/// This module contains the two persisted models and their store operations.
///
/// # Models
///
/// - `user`: User accounts (the credential store)
/// - `task`: Tasks owned by users (the task store)
///
/// Every task references exactly one user; deleting a user cascades to the
/// user's tasks at the database level.
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{User, CreateUser, UserRole};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: UserRole::User,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
