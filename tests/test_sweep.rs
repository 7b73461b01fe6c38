//! Expiry sweep scenarios against the in-memory store.

use chrono::{NaiveDate, TimeZone, Utc};

use wheelhouse::model::{OptionType, TradeStatus};
use wheelhouse::store::{MemoryTradeStore, NewTrade, TradeStore};
use wheelhouse::sweep::{self, SweepError};

fn new_trade(user: &str, symbol: &str, expiration: &str) -> NewTrade {
    NewTrade {
        user_id: user.to_string(),
        symbol: symbol.to_string(),
        option_type: OptionType::Put,
        strike: 150.0,
        expiration: expiration.parse::<NaiveDate>().unwrap(),
        premium: 2.35,
    }
}

fn feb_first() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 14, 30, 0).unwrap()
}

#[tokio::test]
async fn sweep_expires_only_overdue_open_trades() {
    let store = MemoryTradeStore::new();
    let a = store.create(new_trade("u1", "AAPL", "2024-01-01")).await.unwrap();
    let b = store.create(new_trade("u2", "MSFT", "2024-01-01")).await.unwrap();
    let c = store.create(new_trade("u1", "TSLA", "2024-03-01")).await.unwrap();

    let now = feb_first();
    let report = sweep::run(&store, now).await.unwrap();

    assert_eq!(report.closed_count, 2);
    let mut swept_ids: Vec<_> = report.closed_trades.iter().map(|t| t.id.clone()).collect();
    swept_ids.sort();
    let mut expected = vec![a.id.clone(), b.id.clone()];
    expected.sort();
    assert_eq!(swept_ids, expected);

    // Report rows carry enough to identify the position and its owner.
    let swept_a = report.closed_trades.iter().find(|t| t.id == a.id).unwrap();
    assert_eq!(swept_a.symbol, "AAPL");
    assert_eq!(swept_a.user_id, "u1");
    assert_eq!(swept_a.strike, 150.0);

    for id in [&a.id, &b.id] {
        let t = store.find_by_id(id).await.unwrap();
        assert_eq!(t.status, TradeStatus::Expired);
        assert_eq!(t.closing_cost, Some(0.0));
        assert_eq!(t.close_date, Some(now));
    }
    let untouched = store.find_by_id(&c.id).await.unwrap();
    assert_eq!(untouched.status, TradeStatus::Open);
    assert!(untouched.close_date.is_none());
}

#[tokio::test]
async fn empty_scan_reports_zero_and_never_commits() {
    let store = MemoryTradeStore::new();
    store.create(new_trade("u1", "AAPL", "2024-03-01")).await.unwrap();

    // If the sweep touched the transactor at all, this would blow up.
    store.fail_next_batch();

    let report = sweep::run(&store, feb_first()).await.unwrap();
    assert_eq!(report.closed_count, 0);
    assert!(report.closed_trades.is_empty());
}

#[tokio::test]
async fn second_sweep_is_a_no_op() {
    let store = MemoryTradeStore::new();
    store.create(new_trade("u1", "AAPL", "2024-01-01")).await.unwrap();
    store.create(new_trade("u1", "MSFT", "2024-01-15")).await.unwrap();

    let now = feb_first();
    let first = sweep::run(&store, now).await.unwrap();
    assert_eq!(first.closed_count, 2);

    // No time passes, no state changes: nothing left to transition.
    let second = sweep::run(&store, now).await.unwrap();
    assert_eq!(second.closed_count, 0);

    // Already-expired trades are never revisited; their close date is the
    // first run's timestamp.
    let later = Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).unwrap();
    let third = sweep::run(&store, later).await.unwrap();
    assert_eq!(third.closed_count, 0);
    for t in store.snapshot() {
        assert_eq!(t.close_date, Some(now));
    }
}

#[tokio::test]
async fn failed_commit_applies_nothing_and_next_run_recovers() {
    let store = MemoryTradeStore::new();
    let a = store.create(new_trade("u1", "AAPL", "2024-01-01")).await.unwrap();
    let b = store.create(new_trade("u2", "MSFT", "2024-01-01")).await.unwrap();

    store.fail_next_batch();
    let err = sweep::run(&store, feb_first()).await.unwrap_err();
    assert!(matches!(err, SweepError::CommitFailed(_)));

    // All-or-nothing: no trade moved.
    for id in [&a.id, &b.id] {
        let t = store.find_by_id(id).await.unwrap();
        assert_eq!(t.status, TradeStatus::Open);
        assert!(t.close_date.is_none());
        assert!(t.closing_cost.is_none());
    }

    // The next scheduled run re-discovers the same trades.
    let report = sweep::run(&store, feb_first()).await.unwrap();
    assert_eq!(report.closed_count, 2);
}

#[tokio::test]
async fn dry_run_scan_never_mutates() {
    let store = MemoryTradeStore::new();
    let a = store.create(new_trade("u1", "AAPL", "2024-01-01")).await.unwrap();

    let overdue = sweep::scan(&store, feb_first().date_naive()).await.unwrap();
    assert_eq!(overdue.len(), 1);

    let t = store.find_by_id(&a.id).await.unwrap();
    assert_eq!(t.status, TradeStatus::Open);
    assert!(t.close_date.is_none());
}
