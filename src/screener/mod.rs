pub mod aggregate;
pub mod filter;
pub mod provider;

pub use aggregate::group_by_symbol;
pub use filter::{FilterError, FilterSpec, compile};
pub use provider::{
    HttpOptionsProvider, OptionsProvider, ProviderConfig, ProviderError, QueryRequest,
    QueryResponse,
};
