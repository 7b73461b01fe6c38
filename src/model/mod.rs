pub mod contract;
pub mod summary;
pub mod trade;

pub use contract::{FieldKind, FieldValue, OptionContract, OptionType, field_kind};
pub use summary::StockSummary;
pub use trade::{Trade, TradeStatus};
