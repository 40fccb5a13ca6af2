/// Authentication endpoints
///
/// - `POST /api/auth/register` - Register a new account
/// - `POST /api/auth/login` - Exchange email and password for a session token
/// - `GET /api/auth/verify` - Resolve the bearer token to the current user
///
/// Both register and login answer with `{ "token": "...", "user": {...} }`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    auth::{
        credentials::{self, NewAccount, Session},
        middleware::bearer_token,
    },
    models::user::User,
};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verify response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user: User,
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
///
/// { "name": "Jane", "email": "jane@example.com", "password": "correct horse" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `400 Bad Request`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewAccount>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let session = credentials::register(&state.db, &state.credentials, req).await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Log in
///
/// # Errors
///
/// - `400 Bad Request`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<Session>> {
    let session =
        credentials::authenticate(&state.db, &state.credentials, &req.email, &req.password).await?;

    tracing::info!(user_id = session.user.id, "User logged in");

    Ok(Json(session))
}

/// Returns the user the bearer token identifies
///
/// # Errors
///
/// - `401 Unauthorized`: No bearer token
/// - `403 Forbidden`: Token invalid or expired
/// - `404 Not Found`: The account was deleted after the token was issued
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<VerifyResponse>> {
    let token = bearer_token(&headers)?;
    let identity = credentials::verify(token, &state.credentials)?;

    let user = User::find_by_id(&state.db, identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(VerifyResponse { user }))
}
