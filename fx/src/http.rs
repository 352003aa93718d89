//! HTTP rate feed backed by reqwest.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;
use usdcny_common::CurrencyPair;

use crate::config::FeedConfig;
use crate::error::{FxError, FxResult};
use crate::feed::{extract_rate, RateFeed};

/// One GET against a templated URL per lookup.
#[derive(Clone)]
pub struct HttpRateFeed {
    name: String,
    url_template: String,
    client: Client,
}

impl HttpRateFeed {
    /// Create a feed sharing an existing client.
    pub fn new(config: &FeedConfig, client: Client) -> Self {
        Self {
            name: config.name.clone(),
            url_template: config.url_template.clone(),
            client,
        }
    }

    /// Build a client with explicit request and connect timeouts.
    pub fn build_client(request_timeout: Duration, connect_timeout: Duration) -> FxResult<Client> {
        Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| FxError::Configuration(format!("HTTP client: {}", e)))
    }

    /// The URL this feed requests for `pair`.
    pub fn url_for(&self, pair: &CurrencyPair) -> String {
        self.url_template
            .replace("{base}", pair.base.code())
            .replace("{quote}", pair.quote.code())
    }

    fn network_failure(&self, reason: impl ToString) -> FxError {
        FxError::NetworkFailure {
            feed: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl RateFeed for HttpRateFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rate(&self, pair: &CurrencyPair) -> FxResult<Decimal> {
        let url = self.url_for(pair);
        debug!(feed = %self.name, url = %url, "Requesting rate");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.network_failure(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.network_failure(format!("HTTP status {}", status)));
        }

        let body = response.bytes().await.map_err(|e| self.network_failure(e))?;

        extract_rate(&self.name, pair, &body)
    }
}
