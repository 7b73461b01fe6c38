use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::model::{OptionType, Trade, TradeStatus};

use super::{BatchTransactor, NewTrade, StoreError, TradeStore, TradeUpdate};

pub type Db = Arc<Mutex<Connection>>;

/// Open (or create) the database, run migrations and make sure a signing
/// secret for bearer tokens exists. Returns the shared handle plus the
/// secret; the handle is injected into every component that needs
/// persistence, there are no module-level singletons.
pub fn open(path: &Path) -> Result<(Db, String)> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("creating db directory")?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("opening sqlite at {}", path.display()))?;

    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")?;
    migrate(&conn)?;
    let secret = ensure_auth_secret(&conn)?;

    Ok((Arc::new(Mutex::new(conn)), secret))
}

/// In-memory database for tests and dry runs.
pub fn open_in_memory() -> Result<(Db, String)> {
    let conn = Connection::open_in_memory().context("opening in-memory sqlite")?;
    migrate(&conn)?;
    let secret = ensure_auth_secret(&conn)?;
    Ok((Arc::new(Mutex::new(conn)), secret))
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS trades (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            symbol        TEXT NOT NULL,
            option_type   TEXT NOT NULL,
            strike        REAL NOT NULL,
            expiration    TEXT NOT NULL,
            premium       REAL NOT NULL,
            status        TEXT NOT NULL,
            open_date     TEXT NOT NULL,
            close_date    TEXT,
            closing_cost  REAL,
            created_at    INTEGER DEFAULT (unixepoch())
        );

        CREATE INDEX IF NOT EXISTS idx_trades_owner ON trades(user_id);
        CREATE INDEX IF NOT EXISTS idx_trades_status_expiration
            ON trades(status, expiration);

        CREATE TABLE IF NOT EXISTS config (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

fn ensure_auth_secret(conn: &Connection) -> Result<String> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT value FROM config WHERE key = 'auth_secret'",
            [],
            |row| row.get(0),
        )
        .ok();

    if let Some(secret) = existing {
        return Ok(secret);
    }

    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    let secret: String = bytes.iter().map(|b| format!("{b:02x}")).collect();

    conn.execute(
        "INSERT INTO config (key, value) VALUES ('auth_secret', ?1)",
        [&secret],
    )?;

    Ok(secret)
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

pub struct SqliteTradeStore {
    db: Db,
}

impl SqliteTradeStore {
    pub fn new(db: Db) -> Self {
        SqliteTradeStore { db }
    }
}

const TRADE_COLUMNS: &str =
    "id, user_id, symbol, option_type, strike, expiration, premium, status, \
     open_date, close_date, closing_cost";

type TradeRow = (
    String,
    String,
    String,
    String,
    f64,
    String,
    f64,
    String,
    String,
    Option<String>,
    Option<f64>,
);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TradeRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn decode(row: TradeRow) -> Result<Trade, StoreError> {
    let bad = |what: &str| StoreError::Backend(format!("corrupt trade row: bad {what}"));

    let option_type = match row.3.as_str() {
        "call" => OptionType::Call,
        "put" => OptionType::Put,
        _ => return Err(bad("option_type")),
    };
    let status = TradeStatus::parse(&row.7).ok_or_else(|| bad("status"))?;
    let expiration: NaiveDate = row.5.parse().map_err(|_| bad("expiration"))?;
    let open_date = DateTime::parse_from_rfc3339(&row.8)
        .map_err(|_| bad("open_date"))?
        .with_timezone(&Utc);
    let close_date = match row.9 {
        Some(s) => Some(
            DateTime::parse_from_rfc3339(&s)
                .map_err(|_| bad("close_date"))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    Ok(Trade {
        id: row.0,
        user_id: row.1,
        symbol: row.2,
        option_type,
        strike: row.4,
        expiration,
        premium: row.6,
        status,
        open_date,
        close_date,
        closing_cost: row.10,
    })
}

/// Apply one partial update on an open connection. Returns the number of
/// affected rows so callers can distinguish a missing id.
fn execute_update(
    conn: &Connection,
    id: &str,
    update: &TradeUpdate,
) -> Result<usize, StoreError> {
    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(status) = update.status {
        sets.push(format!("status = ?{}", params.len() + 1));
        params.push(Box::new(status.as_str().to_string()));
    }
    if let Some(close_date) = update.close_date {
        sets.push(format!("close_date = ?{}", params.len() + 1));
        params.push(Box::new(close_date.to_rfc3339()));
    }
    if let Some(cost) = update.closing_cost {
        sets.push(format!("closing_cost = ?{}", params.len() + 1));
        params.push(Box::new(cost));
    }
    if let Some(premium) = update.premium {
        sets.push(format!("premium = ?{}", params.len() + 1));
        params.push(Box::new(premium));
    }

    if sets.is_empty() {
        return Err(StoreError::Validation("no fields to update".into()));
    }

    params.push(Box::new(id.to_string()));
    let sql = format!(
        "UPDATE trades SET {} WHERE id = ?{}",
        sets.join(", "),
        params.len()
    );

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p.as_ref()).collect();
    let affected = conn.execute(&sql, param_refs.as_slice())?;
    Ok(affected)
}

fn select_one(conn: &Connection, id: &str) -> Result<Trade, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?1"),
            [id],
            read_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound { id: id.to_string() },
            other => other.into(),
        })?;
    decode(row)
}

#[async_trait]
impl TradeStore for SqliteTradeStore {
    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<Trade>, StoreError> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE user_id = ?1 ORDER BY open_date DESC"
        ))?;
        let rows = stmt
            .query_map([user_id], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(decode).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Trade, StoreError> {
        let conn = self.db.lock().await;
        select_one(&conn, id)
    }

    async fn find_overdue_open(&self, as_of: NaiveDate) -> Result<Vec<Trade>, StoreError> {
        let conn = self.db.lock().await;
        // ISO dates compare lexicographically, so a plain < works on the
        // TEXT column.
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades
             WHERE status = 'Open' AND expiration < ?1
             ORDER BY expiration ASC, created_at ASC"
        ))?;
        let rows = stmt
            .query_map([as_of.to_string()], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(decode).collect()
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

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO trades
                (id, user_id, symbol, option_type, strike, expiration, premium,
                 status, open_date, close_date, closing_cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, NULL)",
            rusqlite::params![
                trade.id,
                trade.user_id,
                trade.symbol,
                trade.option_type.as_str(),
                trade.strike,
                trade.expiration.to_string(),
                trade.premium,
                trade.status.as_str(),
                trade.open_date.to_rfc3339(),
            ],
        )?;

        Ok(trade)
    }

    async fn update_by_id(&self, id: &str, update: TradeUpdate) -> Result<Trade, StoreError> {
        let conn = self.db.lock().await;
        let affected = execute_update(&conn, id, &update)?;
        if affected == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        select_one(&conn, id)
    }
}

#[async_trait]
impl BatchTransactor for SqliteTradeStore {
    async fn apply_batch(&self, updates: Vec<(String, TradeUpdate)>) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        for (id, update) in &updates {
            let affected = execute_update(&tx, id, update)?;
            if affected == 0 {
                // Dropping the transaction rolls everything back.
                return Err(StoreError::NotFound { id: id.clone() });
            }
        }

        tx.commit().map_err(|e| StoreError::Backend(e.to_string()))
    }
}
