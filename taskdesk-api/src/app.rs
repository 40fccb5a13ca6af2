/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::{app::{build_router, AppState}, config::Config};
/// use taskdesk_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        auth::{admin_layer, jwt_auth_layer},
        security::SecurityHeadersLayer,
    },
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::auth::credentials::CredentialSettings;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Credential store settings derived from `config`
    pub credentials: Arc<CredentialSettings>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let credentials = Arc::new(config.credential_settings());
        Self {
            db,
            config: Arc::new(config),
            credentials,
        }
    }

    /// Secret used to sign and verify session tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /api
///     ├── /auth                      public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── GET  /verify           bearer (checked in handler)
///     ├── /tasks                     bearer
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     └── /admin                     bearer + admin role
///         ├── GET    /users
///         ├── GET    /users/:id
///         ├── DELETE /users/:id
///         ├── GET    /tasks
///         ├── GET    /tasks/:id
///         └── DELETE /tasks/:id
/// ```
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/verify", get(routes::auth::verify));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route(
            "/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    // Layers run outermost-last: authentication before the role check
    let admin_routes = Router::new()
        .route("/users", get(routes::admin::list_users))
        .route(
            "/users/:id",
            get(routes::admin::get_user).delete(routes::admin::delete_user),
        )
        .route("/tasks", get(routes::admin::list_tasks))
        .route(
            "/tasks/:id",
            get(routes::admin::get_task).delete(routes::admin::delete_task),
        )
        .layer(from_fn(admin_layer))
        .layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
