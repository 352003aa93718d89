//! Primary/backup rate lookup.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};
use usdcny_common::CurrencyPair;

use crate::feed::RateFeed;

/// Looks a rate up on the primary feed, then once on the backup feed.
///
/// Feed errors never escape: they are logged and folded into `None`.
#[derive(Clone)]
pub struct RateSource {
    primary: Arc<dyn RateFeed>,
    backup: Arc<dyn RateFeed>,
}

impl RateSource {
    /// Create a source from a primary and a backup feed.
    pub fn new(primary: Arc<dyn RateFeed>, backup: Arc<dyn RateFeed>) -> Self {
        Self { primary, backup }
    }

    /// Get the rate for `pair`, or `None` if both feeds fail.
    pub async fn fetch_rate(&self, pair: &CurrencyPair) -> Option<Decimal> {
        for feed in [&self.primary, &self.backup] {
            match feed.fetch_rate(pair).await {
                Ok(rate) => {
                    debug!(
                        feed = feed.name(),
                        pair = %pair,
                        rate = %rate,
                        "Got rate from feed"
                    );
                    return Some(rate);
                }
                Err(e) => {
                    warn!(
                        feed = feed.name(),
                        pair = %pair,
                        error = %e,
                        "Feed failed to return rate"
                    );
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MockRateFeed;
    use rust_decimal_macros::dec;

    fn feeds() -> (Arc<MockRateFeed>, Arc<MockRateFeed>) {
        (
            Arc::new(MockRateFeed::new("primary")),
            Arc::new(MockRateFeed::new("backup")),
        )
    }

    #[tokio::test]
    async fn test_primary_success_skips_backup() {
        let (primary, backup) = feeds();
        primary.set_rate(CurrencyPair::usd_cny(), dec!(7.1));
        backup.set_rate(CurrencyPair::usd_cny(), dec!(7.3));

        let source = RateSource::new(primary.clone(), backup.clone());
        let rate = source.fetch_rate(&CurrencyPair::usd_cny()).await;

        assert_eq!(rate, Some(dec!(7.1)));
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test]
    async fn test_backup_used_after_primary_failure() {
        let (primary, backup) = feeds();
        backup.set_rate(CurrencyPair::cny_usd(), dec!(0.139));

        let source = RateSource::new(primary.clone(), backup.clone());
        let rate = source.fetch_rate(&CurrencyPair::cny_usd()).await;

        assert_eq!(rate, Some(dec!(0.139)));
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_fail_is_absent() {
        let (primary, backup) = feeds();

        let source = RateSource::new(primary.clone(), backup.clone());
        let rate = source.fetch_rate(&CurrencyPair::usd_cny()).await;

        assert_eq!(rate, None);
        // one backup attempt, no retries
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 1);
    }
}
