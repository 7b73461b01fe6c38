use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::model::OptionContract;
use crate::screener::filter::FilterCriterion;
use crate::screener::{FilterSpec, compile};

#[derive(Serialize)]
pub struct OptionsResponse {
    pub options: Vec<OptionContract>,
    pub count: i64,
}

/// `GET /options?symbol=AAPL` — implicit single-criterion screen for one
/// underlying.
pub async fn by_symbol(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let symbol = params
        .get("symbol")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("symbol query parameter is required".into()))?;

    let spec = FilterSpec {
        filters: vec![FilterCriterion {
            operation: "eq".to_string(),
            field: "symbol".to_string(),
            value: Value::String(symbol.to_uppercase()),
        }],
        page_no: None,
        page_size: None,
    };

    let request = compile(&spec, &state.provider_page, &state.provider_user)?;
    let response = state.provider.query(&request).await?;

    Ok(Json(OptionsResponse {
        options: response.options,
        count: response.count,
    }))
}
