/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasknest_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = tasknest_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasknest_shared::auth::{
    middleware::{bearer_token, AuthContext},
    session,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the
/// config sits behind an Arc so clones stay cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the session-token secret
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/                           # API v1 (session-token auth)
///     ├── /lists                     # Task lists
///     │   ├── GET    /               # Accessible lists with counts
///     │   ├── POST   /               # Create list
///     │   ├── GET    /:id            # Detail: list + filtered tasks + categories
///     │   ├── PUT    /:id            # Rename (owner only)
///     │   ├── DELETE /:id            # Delete (owner only, cascades)
///     │   ├── POST   /:id/share      # Share by email (owner only)
///     │   └── /:id/tasks             # Tasks within a list
///     │       ├── GET    /           # Filtered tasks
///     │       ├── POST   /           # Create task
///     │       ├── PUT    /:task_id   # Update task
///     │       ├── DELETE /:task_id   # Delete task
///     │       └── POST   /:task_id/toggle  # Flip completed
///     ├── /categories                # Creator-scoped labels
///     └── /feed                      # Home-view calendar feed
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:task_id", put(routes::tasks::update_task))
        .route("/:task_id", delete(routes::tasks::delete_task))
        .route("/:task_id/toggle", post(routes::tasks::toggle_task_completed));

    let list_routes = Router::new()
        .route("/", get(routes::lists::list_task_lists))
        .route("/", post(routes::lists::create_task_list))
        .route("/:id", get(routes::lists::get_task_list))
        .route("/:id", put(routes::lists::update_task_list))
        .route("/:id", delete(routes::lists::delete_task_list))
        .route("/:id/share", post(routes::lists::share_task_list))
        .nest("/:id/tasks", task_routes);

    let category_routes = Router::new()
        .route("/", get(routes::categories::list_categories))
        .route("/", post(routes::categories::create_category))
        .route("/:id", put(routes::categories::update_category))
        .route("/:id", delete(routes::categories::delete_category));

    let feed_routes = Router::new().route("/", get(routes::feed::home_feed));

    // All v1 routes require a valid session token.
    let v1_routes = Router::new()
        .nest("/lists", list_routes)
        .nest("/categories", category_routes)
        .nest("/feed", feed_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
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
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Extracts the bearer token, validates it against the identity service's
/// shared secret, and injects an [`AuthContext`] into request extensions.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = session::validate_token(token, state.session_secret())?;

    req.extensions_mut().insert(AuthContext::new(claims.sub));

    Ok(next.run(req).await)
}
