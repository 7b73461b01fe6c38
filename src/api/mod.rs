pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::screener::{HttpOptionsProvider, ProviderConfig};
use crate::store::SqliteTradeStore;

use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(|| async { "ok" }))
        // Screening
        .route("/options", get(handlers::options::by_symbol))
        .route("/screener", post(handlers::screener::screen))
        // Trades (JWT required)
        .route(
            "/trades",
            post(handlers::trades::create)
                .get(handlers::trades::list)
                .put(handlers::trades::update),
        )
        // Expiry sweep (system-scoped)
        .route("/expired-trades", get(handlers::sweep::dry_run))
        .route("/expired-trades/close", post(handlers::sweep::close))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(host: &str, port: u16, data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let db_path = data_dir.join("wheelhouse.db");
    let (db, auth_secret) = crate::store::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;

    let provider_config = ProviderConfig::from_env();
    if provider_config.user_id.is_empty() {
        println!("  Warning: WHEELHOUSE_PROVIDER_USER not set — provider may reject queries");
    }

    let page = provider_config.page_name.clone();
    let user = provider_config.user_id.clone();
    let state = AppState::new(
        Arc::new(SqliteTradeStore::new(db)),
        Arc::new(HttpOptionsProvider::new(provider_config)),
        auth_secret,
        page,
        user,
    );

    let app = router(state);

    let addr = format!("{host}:{port}");
    println!("wheelhouse API server listening on {addr}");
    println!("  Health:  GET  http://{addr}/health");
    println!("  Options: GET  http://{addr}/options?symbol=AAPL");
    println!("  Screen:  POST http://{addr}/screener");
    println!("  Trades:  POST http://{addr}/trades");
    println!("  Sweep:   GET  http://{addr}/expired-trades");
    println!("  Sweep:   POST http://{addr}/expired-trades/close");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    axum::serve(listener, app).await.context("running server")?;

    Ok(())
}
