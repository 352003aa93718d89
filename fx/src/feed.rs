//! Rate feed trait and response extraction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use usdcny_common::CurrencyPair;

use crate::error::{FxError, FxResult};

/// A single rate endpoint.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Get the feed name.
    fn name(&self) -> &str;

    /// Get the rate quoting one unit of `pair.base` in `pair.quote`.
    async fn fetch_rate(&self, pair: &CurrencyPair) -> FxResult<Decimal>;
}

/// Body shared by both rate APIs: `{ "rates": { "CNY": 7.1, ... } }`.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: Option<HashMap<String, serde_json::Value>>,
}

/// Pull the rate for `pair.quote` out of a response body.
///
/// A zero, negative or non-numeric entry counts as missing.
pub fn extract_rate(feed: &str, pair: &CurrencyPair, body: &[u8]) -> FxResult<Decimal> {
    let response: RatesResponse =
        serde_json::from_slice(body).map_err(|e| FxError::MalformedResponse {
            feed: feed.to_string(),
            reason: e.to_string(),
        })?;

    let missing = || FxError::MissingField {
        feed: feed.to_string(),
        pair: pair.clone(),
    };

    let rate = response
        .rates
        .as_ref()
        .and_then(|rates| rates.get(pair.quote.code()))
        .and_then(|value| match value {
            serde_json::Value::Number(n) => number_to_decimal(n),
            _ => None,
        })
        .ok_or_else(missing)?;

    if rate <= Decimal::ZERO {
        return Err(missing());
    }

    Ok(rate)
}

/// Read a JSON number through its shortest text form, so `7.1234` stays exact.
fn number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Mock rate feed for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateFeed {
    name: String,
    rates: dashmap::DashMap<CurrencyPair, Decimal>,
    calls: std::sync::atomic::AtomicUsize,
    delay: parking_lot::Mutex<Option<std::time::Duration>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateFeed {
    /// Create a new mock feed with no rates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: dashmap::DashMap::new(),
            calls: std::sync::atomic::AtomicUsize::new(0),
            delay: parking_lot::Mutex::new(None),
        }
    }

    /// Set a rate for a currency pair.
    pub fn set_rate(&self, pair: CurrencyPair, rate: Decimal) {
        self.rates.insert(pair, rate);
    }

    /// Stop serving a pair.
    pub fn remove_rate(&self, pair: &CurrencyPair) {
        self.rates.remove(pair);
    }

    /// Sleep this long before answering each lookup.
    pub fn set_delay(&self, delay: std::time::Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateFeed for MockRateFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rate(&self, pair: &CurrencyPair) -> FxResult<Decimal> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.rates
            .get(pair)
            .map(|r| *r)
            .ok_or_else(|| FxError::NetworkFailure {
                feed: self.name.clone(),
                reason: format!("no mock rate for {}", pair),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_extract_rate() {
        let body = br#"{"base":"USD","rates":{"USD":1,"CNY":7.1234,"EUR":0.92}}"#;
        let rate = extract_rate("primary", &CurrencyPair::usd_cny(), body).unwrap();

        assert_eq!(rate, dec!(7.1234));
    }

    #[test]
    fn test_extract_rate_malformed() {
        let result = extract_rate("primary", &CurrencyPair::usd_cny(), b"<html>oops</html>");

        assert!(matches!(result, Err(FxError::MalformedResponse { .. })));
    }

    #[test]
    fn test_extract_rate_missing_rates_object() {
        let result = extract_rate("primary", &CurrencyPair::usd_cny(), br#"{"result":"error"}"#);

        assert!(matches!(result, Err(FxError::MissingField { .. })));
    }

    #[test]
    fn test_extract_rate_missing_target() {
        let body = br#"{"rates":{"EUR":0.92}}"#;
        let result = extract_rate("backup", &CurrencyPair::cny_usd(), body);

        assert!(matches!(result, Err(FxError::MissingField { ref feed, .. }) if feed == "backup"));
    }

    #[test]
    fn test_extract_rate_zero_counts_as_missing() {
        let body = br#"{"rates":{"CNY":0}}"#;
        let result = extract_rate("primary", &CurrencyPair::usd_cny(), body);

        assert!(matches!(result, Err(FxError::MissingField { .. })));
    }

    #[test]
    fn test_extract_rate_non_numeric() {
        let body = br#"{"rates":{"CNY":"7.1"}}"#;
        let result = extract_rate("primary", &CurrencyPair::usd_cny(), body);

        assert!(matches!(result, Err(FxError::MissingField { .. })));
    }

    #[test]
    fn test_extract_rate_scientific_notation() {
        let body = br#"{"rates":{"USD":1.4e-1}}"#;
        let rate = extract_rate("primary", &CurrencyPair::cny_usd(), body).unwrap();

        assert_eq!(rate, dec!(0.14));
    }

    #[tokio::test]
    async fn test_mock_feed() {
        let feed = MockRateFeed::new("test");
        feed.set_rate(CurrencyPair::usd_cny(), dec!(7.1));

        assert_eq!(feed.fetch_rate(&CurrencyPair::usd_cny()).await.unwrap(), dec!(7.1));
        assert!(feed.fetch_rate(&CurrencyPair::cny_usd()).await.is_err());
        assert_eq!(feed.calls(), 2);
    }
}
