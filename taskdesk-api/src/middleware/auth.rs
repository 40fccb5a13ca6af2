/// Access gateway layers
///
/// `jwt_auth_layer` guards every `/api/tasks` and `/api/admin` route: it
/// validates the bearer token and inserts the caller's
/// [`AuthContext`] into request extensions. `admin_layer` sits inside it on
/// the admin routes and rejects callers without the admin role.
///
/// Status codes: missing or non-Bearer `Authorization` is 401, a token that
/// fails validation is 403, and a valid non-admin token on an admin route is
/// 403.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskdesk_shared::auth::{
    authorization::require_admin,
    middleware::{authenticate_headers, AuthContext, AuthError},
};

use crate::{app::AppState, error::ApiError};

/// Authenticates the request and injects [`AuthContext`]
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate_headers(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Request rejected by gateway");
        e
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Requires the authenticated caller to hold the admin role
///
/// Must run after [`jwt_auth_layer`].
pub async fn admin_layer(req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or(AuthError::MissingCredentials)?;

    if let Err(e) = require_admin(auth) {
        tracing::warn!(user_id = auth.user_id, "Non-admin caller on admin route");
        return Err(e.into());
    }

    Ok(next.run(req).await)
}
