use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::model::StockSummary;
use crate::screener::{FilterSpec, compile, group_by_symbol};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResponse {
    /// Per-symbol summaries ranked by contract count, largest first.
    pub stocks: Vec<StockSummary>,
    /// Provider-side total for the query, which may exceed the page.
    pub count: i64,
}

/// `POST /screener` — full pipeline: compile the spec, query the provider,
/// group and rank the result.
pub async fn screen(
    State(state): State<AppState>,
    Json(spec): Json<FilterSpec>,
) -> Result<Json<ScreenResponse>, ApiError> {
    let request = compile(&spec, &state.provider_page, &state.provider_user)?;
    let response = state.provider.query(&request).await?;
    let stocks = group_by_symbol(response.options);

    Ok(Json(ScreenResponse {
        stocks,
        count: response.count,
    }))
}
