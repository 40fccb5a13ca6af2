/// Task endpoints for the authenticated caller
///
/// - `GET /api/tasks` - List own tasks, newest first
/// - `POST /api/tasks` - Create a task
/// - `PUT /api/tasks/:id` - Partially update a task
/// - `DELETE /api/tasks/:id` - Delete a task
///
/// Update and delete are scoped by [`AuthContext::task_scope`]: a regular
/// caller reaches only its own tasks and gets 404 otherwise, an admin reaches
/// any task.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use taskdesk_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, UpdateTask},
};

pub(crate) fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

/// List the caller's tasks
pub async fn list_tasks(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_owner(&state.db, auth.user_id).await?;

    Ok(Json(tasks))
}

/// Create a task owned by the caller
///
/// Any `user_id` in the body is ignored.
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = Task::create(&state.db, auth.user_id, req).await?;

    tracing::info!(task_id = task.id, user_id = auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let task = Task::update(&state.db, auth.task_scope(), id, req)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    if !Task::delete(&state.db, auth.task_scope(), id).await? {
        return Err(task_not_found());
    }

    tracing::info!(task_id = id, user_id = auth.user_id, "Task deleted");

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}
