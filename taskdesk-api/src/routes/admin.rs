/// Admin endpoints
///
/// Mounted behind both the token gateway and the admin gate, so every handler
/// here runs for an admin caller only.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    routes::tasks::task_not_found,
};
use axum::{extract::State, Json};
use serde_json::{json, Value};
use taskdesk_shared::{
    auth::{authorization::ensure_deletable, middleware::AuthContext},
    models::{
        task::{Ownership, Task, TaskWithOwner},
        user::User,
    },
};

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// List all users, newest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(User::list(&state.db).await?))
}

/// Get one user
pub async fn get_user(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(user))
}

/// Delete a user and, by cascade, all of their tasks
///
/// Admin accounts are refused with 403.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(user_not_found)?;

    ensure_deletable(&target)?;

    // Gone between the lookup and the delete
    if !User::delete(&state.db, id).await? {
        return Err(user_not_found());
    }

    tracing::info!(user_id = id, admin_id = auth.user_id, "User deleted by admin");

    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// List all tasks with their owners, newest first
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskWithOwner>>> {
    Ok(Json(Task::list_all(&state.db).await?))
}

/// Get any task
pub async fn get_task(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Json<Task>> {
    let task = Task::find(&state.db, Ownership::Any, id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Delete any task
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    if !Task::delete(&state.db, Ownership::Any, id).await? {
        return Err(task_not_found());
    }

    tracing::info!(task_id = id, admin_id = auth.user_id, "Task deleted by admin");

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}
