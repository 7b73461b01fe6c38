//! Expiry sweep: transitions stale Open trades to Expired.
//!
//! A run moves through Scanning → (NothingToDo | Committing) → Done. The
//! cutoff date is computed once at job start and reused for the whole run.
//!
//! Concurrent runs are expected (scheduler plus manual trigger) and safe
//! without any cross-process lock: two sweeps may both scan the same overdue
//! trade, but setting an already-Expired trade to Expired again yields the
//! same observable state. At-least-once application of an idempotent
//! transition is accepted instead of a locking protocol.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{OptionType, Trade, TradeStatus};
use crate::store::{BatchTransactor, StoreError, TradeGateway, TradeStore, TradeUpdate};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("scanning for overdue trades failed: {0}")]
    Scan(StoreError),

    /// The batch commit failed; nothing was applied and nothing is
    /// reported. The next scheduled run re-discovers the same trades.
    #[error("sweep commit failed, no trades were transitioned: {0}")]
    CommitFailed(StoreError),
}

/// One transitioned trade, as reported to the sweep's caller. Transient,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweptTrade {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub user_id: String,
}

impl From<&Trade> for SweptTrade {
    fn from(t: &Trade) -> Self {
        SweptTrade {
            id: t.id.clone(),
            symbol: t.symbol.clone(),
            option_type: t.option_type,
            strike: t.strike,
            expiration: t.expiration,
            user_id: t.user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub closed_count: usize,
    pub closed_trades: Vec<SweptTrade>,
}

/// Read-only scan: every Open trade whose expiration is strictly before
/// `today`. Backs the dry-run endpoint; never mutates.
pub async fn scan<S>(store: &S, today: NaiveDate) -> Result<Vec<Trade>, SweepError>
where
    S: TradeGateway + ?Sized,
{
    store.find_overdue_open(today).await.map_err(SweepError::Scan)
}

/// Run one sweep. `now` is taken once up front; the scan cutoff and every
/// close date in the batch derive from it, never re-evaluated mid-run.
///
/// The batch is all-or-nothing: on commit failure no partial result is
/// reported and no in-job retry is attempted.
pub async fn run<S>(store: &S, now: DateTime<Utc>) -> Result<SweepReport, SweepError>
where
    S: TradeGateway + ?Sized,
{
    let today = now.date_naive();

    // Scanning
    let overdue = scan(store, today).await?;

    // NothingToDo
    if overdue.is_empty() {
        return Ok(SweepReport {
            closed_count: 0,
            closed_trades: Vec::new(),
        });
    }

    // Committing
    let batch: Vec<(String, TradeUpdate)> = overdue
        .iter()
        .map(|t| {
            (
                t.id.clone(),
                TradeUpdate {
                    status: Some(TradeStatus::Expired),
                    close_date: Some(now),
                    closing_cost: Some(0.0),
                    ..Default::default()
                },
            )
        })
        .collect();

    store
        .apply_batch(batch)
        .await
        .map_err(SweepError::CommitFailed)?;

    // Done
    Ok(SweepReport {
        closed_count: overdue.len(),
        closed_trades: overdue.iter().map(SweptTrade::from).collect(),
    })
}

/// CLI entry point for the `sweep` subcommand: one sweep (or dry-run scan)
/// against the local store.
pub fn run_once(data_dir: &std::path::Path, dry_run: bool) -> anyhow::Result<()> {
    use anyhow::Context;

    use crate::store::SqliteTradeStore;

    let db_path = data_dir.join("wheelhouse.db");
    let (db, _) = crate::store::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;
    let store = SqliteTradeStore::new(db);

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(async {
        let now = Utc::now();

        if dry_run {
            let overdue = scan(&store, now.date_naive()).await?;
            println!("{} overdue open trade(s) as of {}", overdue.len(), now.date_naive());
            for t in &overdue {
                println!(
                    "  {}  {} {} {} exp {}  (user {})",
                    t.id,
                    t.symbol,
                    t.option_type.as_str(),
                    t.strike,
                    t.expiration,
                    t.user_id
                );
            }
            return Ok(());
        }

        let report = run(&store, now).await?;
        println!("Expired {} trade(s)", report.closed_count);
        for t in &report.closed_trades {
            println!(
                "  {}  {} {} {} exp {}  (user {})",
                t.id,
                t.symbol,
                t.option_type.as_str(),
                t.strike,
                t.expiration,
                t.user_id
            );
        }
        Ok(())
    })
}
