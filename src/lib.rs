//! Backend for a wheel-strategy options screener: compiles declarative
//! filter specs into provider queries, ranks the returned option chain per
//! underlying, and reconciles persisted trade lifecycles including the
//! expiry sweep.

pub mod api;
pub mod model;
pub mod screen;
pub mod screener;
pub mod store;
pub mod sweep;
pub mod token;
