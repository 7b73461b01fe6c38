use std::sync::Arc;

use crate::screener::OptionsProvider;
use crate::store::TradeGateway;

/// Shared handles for the HTTP surface. Everything here is constructed at
/// bootstrap and injected; handlers never reach for globals. Both seams are
/// trait objects so tests can swap in fixture backends.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TradeGateway>,
    pub provider: Arc<dyn OptionsProvider>,
    pub auth_secret: Arc<str>,
    /// Identity the provider expects in every request body.
    pub provider_page: Arc<str>,
    pub provider_user: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TradeGateway>,
        provider: Arc<dyn OptionsProvider>,
        auth_secret: String,
        provider_page: String,
        provider_user: String,
    ) -> Self {
        AppState {
            store,
            provider,
            auth_secret: auth_secret.into(),
            provider_page: provider_page.into(),
            provider_user: provider_user.into(),
        }
    }
}
