use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Call or put. Serialized lowercase, matching the provider wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

/// One option instrument's market snapshot as returned by the data provider.
///
/// Immutable; carries no identity beyond its fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub symbol: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub bid_price: f64,
    pub ask_price: f64,
    pub volume: f64,
    pub open_interest: f64,
    pub delta: f64,
    pub implied_volatility: f64,
    pub stock_price: f64,
    pub market_cap: f64,
    pub sector: String,
    pub industry: String,
    pub rating: f64,
    #[serde(rename = "yield")]
    pub yield_pct: f64,
}

/// Wire names of every queryable OptionContract attribute. The filter
/// compiler rejects criteria whose field is not in this list.
pub const QUERYABLE_FIELDS: &[&str] = &[
    "symbol",
    "type",
    "strike",
    "expiration",
    "bidPrice",
    "askPrice",
    "volume",
    "openInterest",
    "delta",
    "impliedVolatility",
    "stockPrice",
    "marketCap",
    "sector",
    "industry",
    "rating",
    "yield",
];

/// A typed view of one contract attribute, used by fixture providers and
/// anything else that needs to evaluate criteria against in-memory contracts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Num(f64),
    Text(String),
}

/// Static type of a queryable attribute. The filter compiler uses this to
/// decide whether a string-typed criterion value should be re-typed as a
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Num,
    Text,
}

/// Kind of a field by wire name; `None` for names outside
/// [`QUERYABLE_FIELDS`].
pub fn field_kind(name: &str) -> Option<FieldKind> {
    match name {
        "symbol" | "type" | "expiration" | "sector" | "industry" => Some(FieldKind::Text),
        "strike" | "bidPrice" | "askPrice" | "volume" | "openInterest" | "delta"
        | "impliedVolatility" | "stockPrice" | "marketCap" | "rating" | "yield" => {
            Some(FieldKind::Num)
        }
        _ => None,
    }
}

impl OptionContract {
    /// Look up an attribute by its wire name. Returns `None` for names
    /// outside [`QUERYABLE_FIELDS`].
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let v = match name {
            "symbol" => FieldValue::Text(self.symbol.clone()),
            "type" => FieldValue::Text(self.option_type.as_str().to_string()),
            "strike" => FieldValue::Num(self.strike),
            "expiration" => FieldValue::Text(self.expiration.to_string()),
            "bidPrice" => FieldValue::Num(self.bid_price),
            "askPrice" => FieldValue::Num(self.ask_price),
            "volume" => FieldValue::Num(self.volume),
            "openInterest" => FieldValue::Num(self.open_interest),
            "delta" => FieldValue::Num(self.delta),
            "impliedVolatility" => FieldValue::Num(self.implied_volatility),
            "stockPrice" => FieldValue::Num(self.stock_price),
            "marketCap" => FieldValue::Num(self.market_cap),
            "sector" => FieldValue::Text(self.sector.clone()),
            "industry" => FieldValue::Text(self.industry.clone()),
            "rating" => FieldValue::Num(self.rating),
            "yield" => FieldValue::Num(self.yield_pct),
            _ => return None,
        };
        Some(v)
    }
}
