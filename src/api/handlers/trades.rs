use axum::Json;
use axum::extract::State;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::model::{OptionType, Trade, TradeStatus};
use crate::store::{NewTrade, TradeStore, TradeUpdate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTradeRequest {
    pub symbol: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub premium: f64,
}

/// `POST /trades` — open a position for the authenticated user.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTradeRequest>,
) -> Result<Json<Trade>, ApiError> {
    let trade = state
        .store
        .create(NewTrade {
            user_id: auth.user_id,
            symbol: req.symbol,
            option_type: req.option_type,
            strike: req.strike,
            expiration: req.expiration,
            premium: req.premium,
        })
        .await?;

    Ok(Json(trade))
}

/// `GET /trades` — every trade owned by the authenticated user.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trade>>, ApiError> {
    let trades = state.store.find_by_owner(&auth.user_id).await?;
    Ok(Json(trades))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTradeRequest {
    pub id: String,
    pub status: Option<TradeStatus>,
    pub closing_cost: Option<f64>,
    pub premium: Option<f64>,
}

/// `PUT /trades` — mutate one of the caller's own trades.
///
/// The store itself does not police terminal states, so this handler does:
/// a Closed or Expired trade is immutable from here. Closing requires the
/// caller to supply the closing cost; the close date is stamped server-side.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateTradeRequest>,
) -> Result<Json<Trade>, ApiError> {
    let existing = state.store.find_by_id(&req.id).await?;
    if existing.user_id != auth.user_id {
        // Someone else's trade looks exactly like a missing one.
        return Err(ApiError::NotFound(format!("trade `{}` not found", req.id)));
    }
    if existing.status.is_terminal() {
        return Err(ApiError::Validation(format!(
            "trade `{}` is {} and can no longer be modified",
            req.id,
            existing.status.as_str()
        )));
    }

    let mut update = TradeUpdate {
        status: req.status,
        close_date: None,
        closing_cost: req.closing_cost,
        premium: req.premium,
    };

    match req.status {
        Some(TradeStatus::Closed) => {
            if req.closing_cost.is_none() {
                return Err(ApiError::Validation(
                    "closingCost is required when closing a trade".into(),
                ));
            }
            update.close_date = Some(Utc::now());
        }
        Some(TradeStatus::Expired) => {
            // Only the sweep may expire trades.
            return Err(ApiError::Validation(
                "trades cannot be expired manually".into(),
            ));
        }
        _ => {}
    }

    if update.is_empty() {
        return Err(ApiError::Validation("no fields to update".into()));
    }

    let trade = state.store.update_by_id(&req.id, update).await?;
    Ok(Json(trade))
}
