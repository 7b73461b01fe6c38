use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::sweep::{self, SweptTrade};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResponse {
    pub message: String,
    pub expired_count: usize,
    pub expired_trades: Vec<SweptTrade>,
}

/// `GET /expired-trades` — report what a sweep would transition right now.
/// Never mutates.
pub async fn dry_run(State(state): State<AppState>) -> Result<Json<DryRunResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let overdue = sweep::scan(state.store.as_ref(), today).await?;

    let message = if overdue.is_empty() {
        "No expired trades found".to_string()
    } else {
        format!("Found {} expired trade(s)", overdue.len())
    };

    Ok(Json(DryRunResponse {
        message,
        expired_count: overdue.len(),
        expired_trades: overdue.iter().map(SweptTrade::from).collect(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseResponse {
    pub message: String,
    pub closed_count: usize,
    pub closed_trades: Vec<SweptTrade>,
}

/// `POST /expired-trades/close` — run the sweep. System-scoped by design: it
/// transitions overdue Open trades across all users in one atomic batch.
pub async fn close(State(state): State<AppState>) -> Result<Json<CloseResponse>, ApiError> {
    let report = sweep::run(state.store.as_ref(), Utc::now()).await?;

    let message = if report.closed_count == 0 {
        "No expired trades found".to_string()
    } else {
        format!("Closed {} expired trade(s)", report.closed_count)
    };

    Ok(Json(CloseResponse {
        message,
        closed_count: report.closed_count,
        closed_trades: report.closed_trades,
    }))
}
