//! # TaskNest API Server
//!
//! HTTP API for the TaskNest multi-user task/list manager: task lists with
//! sharing, categories, filtered task views, and the home-view calendar
//! feed. Authentication is consumed, not implemented — requests carry
//! session tokens minted by the identity service.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasknest-api
//! ```

use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::Config;
use tasknest_shared::db::migrations::run_migrations;
use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasknest_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskNest API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
