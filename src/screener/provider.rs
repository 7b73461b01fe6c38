use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::OptionContract;

use super::filter::CompiledFilter;

const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Canonical screening request, sent verbatim as the POST body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub filters: Vec<CompiledFilter>,
    pub paging: bool,
    pub page_no: i64,
    pub page_size: i64,
    pub page_name: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub options: Vec<OptionContract>,
    pub count: i64,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed{}: {detail}", status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Upstream { status: Option<u16>, detail: String },

    #[error("provider did not respond within {0:?}")]
    Timeout(Duration),
}

/// Transport boundary to the option-chain data provider. Thin and swappable
/// so the rest of the screener can run against fixtures.
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub page_name: String,
    /// Account id the provider expects in every request body.
    pub user_id: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        ProviderConfig {
            base_url: std::env::var("WHEELHOUSE_PROVIDER_URL")
                .unwrap_or_else(|_| "https://api.optionchain.example.com/screen".to_string()),
            page_name: std::env::var("WHEELHOUSE_PROVIDER_PAGE")
                .unwrap_or_else(|_| "options-screener".to_string()),
            user_id: std::env::var("WHEELHOUSE_PROVIDER_USER").unwrap_or_default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Live provider client. Issues exactly one POST per query; retries, if
/// wanted, belong to the caller.
pub struct HttpOptionsProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpOptionsProvider {
    pub fn new(config: ProviderConfig) -> Self {
        HttpOptionsProvider {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl OptionsProvider for HttpOptionsProvider {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ProviderError> {
        let send = self.client.post(&self.config.base_url).json(request).send();

        let resp = match tokio::time::timeout(self.config.timeout, send).await {
            Err(_) => return Err(ProviderError::Timeout(self.config.timeout)),
            Ok(Err(e)) if e.is_timeout() => {
                return Err(ProviderError::Timeout(self.config.timeout));
            }
            Ok(Err(e)) => {
                return Err(ProviderError::Upstream {
                    status: e.status().map(|s| s.as_u16()),
                    detail: e.to_string(),
                });
            }
            Ok(Ok(resp)) => resp,
        };

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_else(|_| "unknown error".into());
            return Err(ProviderError::Upstream {
                status: Some(status.as_u16()),
                detail,
            });
        }

        resp.json::<QueryResponse>()
            .await
            .map_err(|e| ProviderError::Upstream {
                status: Some(status.as_u16()),
                detail: format!("malformed payload: {e}"),
            })
    }
}
