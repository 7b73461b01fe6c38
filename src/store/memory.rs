use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::model::{Trade, TradeStatus};

use super::{BatchTransactor, NewTrade, StoreError, TradeStore, TradeUpdate};

/// Vec-backed store for tests. Same contract as the sqlite backend, plus a
/// switch that makes the next batch commit fail so sweep failure paths can
/// be exercised.
#[derive(Default)]
pub struct MemoryTradeStore {
    trades: Mutex<Vec<Trade>>,
    fail_next_batch: AtomicBool,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_batch(&self) {
        self.fail_next_batch.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Trade> {
        self.trades.lock().unwrap().clone()
    }
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<Trade>, StoreError> {
        Ok(self
            .trades
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Trade, StoreError> {
        self.trades
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn find_overdue_open(&self, as_of: NaiveDate) -> Result<Vec<Trade>, StoreError> {
        Ok(self
            .trades
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.status == TradeStatus::Open && t.expiration < as_of)
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewTrade) -> Result<Trade, StoreError> {
        new.validate()?;
        let trade = Trade {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            symbol: new.symbol.trim().to_uppercase(),
            option_type: new.option_type,
            strike: new.strike,
            expiration: new.expiration,
            premium: new.premium,
            status: TradeStatus::Open,
            open_date: Utc::now(),
            close_date: None,
            closing_cost: None,
        };
        self.trades.lock().unwrap().push(trade.clone());
        Ok(trade)
    }

    async fn update_by_id(&self, id: &str, update: TradeUpdate) -> Result<Trade, StoreError> {
        if update.is_empty() {
            return Err(StoreError::Validation("no fields to update".into()));
        }
        let mut trades = self.trades.lock().unwrap();
        let trade = trades
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        update.apply_to(trade);
        Ok(trade.clone())
    }
}

#[async_trait]
impl BatchTransactor for MemoryTradeStore {
    async fn apply_batch(&self, updates: Vec<(String, TradeUpdate)>) -> Result<(), StoreError> {
        if self.fail_next_batch.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected batch failure".into()));
        }

        let mut trades = self.trades.lock().unwrap();

        // Stage on a copy so a missing id leaves the store untouched.
        let mut staged = trades.clone();
        for (id, update) in &updates {
            let trade = staged
                .iter_mut()
                .find(|t| t.id == *id)
                .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
            update.apply_to(trade);
        }

        *trades = staged;
        Ok(())
    }
}
