use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::contract::OptionType;

/// Lifecycle state of a persisted trade.
///
/// `Closed` and `Expired` are terminal: once a trade reaches either, no
/// further mutation is permitted (enforced by callers of the store, not the
/// store itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Open,
    Closed,
    Expired,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "Open",
            TradeStatus::Closed => "Closed",
            TradeStatus::Expired => "Expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(TradeStatus::Open),
            "Closed" => Some(TradeStatus::Closed),
            "Expired" => Some(TradeStatus::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Closed | TradeStatus::Expired)
    }
}

/// A persisted option position owned by exactly one user.
///
/// Created `Open`; closed manually by its owner (who supplies the closing
/// cost) or transitioned to `Expired` by the expiry sweep (closing cost
/// forced to 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub premium: f64,
    pub status: TradeStatus,
    pub open_date: DateTime<Utc>,
    pub close_date: Option<DateTime<Utc>>,
    pub closing_cost: Option<f64>,
}
