pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{OptionType, Trade, TradeStatus};

pub use memory::MemoryTradeStore;
pub use sqlite::{Db, SqliteTradeStore, open};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("trade `{id}` not found")]
    NotFound { id: String },

    #[error("{0}")]
    Validation(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Fields a caller supplies when opening a position. Id, status and open
/// date are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    #[serde(default)]
    pub user_id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub premium: f64,
}

impl NewTrade {
    /// Required-field check applied by every backend before insert.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.user_id.is_empty() {
            return Err(StoreError::Validation("userId is required".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(StoreError::Validation("symbol is required".into()));
        }
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(StoreError::Validation("strike must be positive".into()));
        }
        if !self.premium.is_finite() || self.premium < 0.0 {
            return Err(StoreError::Validation("premium must be non-negative".into()));
        }
        Ok(())
    }
}

/// Partial update for one trade. `None` fields are left untouched.
///
/// The store does not police terminal states here; whether a Closed or
/// Expired trade may be touched again is the caller's decision.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeUpdate {
    pub status: Option<TradeStatus>,
    pub close_date: Option<DateTime<Utc>>,
    pub closing_cost: Option<f64>,
    pub premium: Option<f64>,
}

impl TradeUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.close_date.is_none()
            && self.closing_cost.is_none()
            && self.premium.is_none()
    }

    /// In-memory application, shared by the memory backend.
    pub fn apply_to(&self, trade: &mut Trade) {
        if let Some(status) = self.status {
            trade.status = status;
        }
        if let Some(close_date) = self.close_date {
            trade.close_date = Some(close_date);
        }
        if let Some(cost) = self.closing_cost {
            trade.closing_cost = Some(cost);
        }
        if let Some(premium) = self.premium {
            trade.premium = premium;
        }
    }
}

/// Typed CRUD + predicate queries over persisted trades.
///
/// Owner-scoped methods take the owning user id; `find_overdue_open` is
/// deliberately system-wide because the expiry sweep inspects all users'
/// open positions.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<Trade>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Trade, StoreError>;

    /// All trades with status Open and expiration strictly before `as_of`.
    async fn find_overdue_open(&self, as_of: NaiveDate) -> Result<Vec<Trade>, StoreError>;

    /// Insert with a fresh id, status Open and open date = now.
    async fn create(&self, new: NewTrade) -> Result<Trade, StoreError>;

    async fn update_by_id(&self, id: &str, update: TradeUpdate) -> Result<Trade, StoreError>;
}

/// All-or-nothing application of a set of trade mutations. A single failed
/// update aborts the whole batch so downstream reporting never describes a
/// partially applied sweep.
#[async_trait]
pub trait BatchTransactor: Send + Sync {
    async fn apply_batch(&self, updates: Vec<(String, TradeUpdate)>) -> Result<(), StoreError>;
}

/// Combined persistence seam: everything the sweep and the HTTP surface need
/// from a backend. Blanket-implemented so any store that can query and
/// batch-mutate qualifies, sqlite and in-memory alike.
pub trait TradeGateway: TradeStore + BatchTransactor {}

impl<T: TradeStore + BatchTransactor> TradeGateway for T {}
