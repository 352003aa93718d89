//! Converter facade handed to the presentation layer.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument};
use usdcny_common::{ConversionDirection, RatePair};

use crate::config::FxConfig;
use crate::conversion::{self, ConversionResult};
use crate::error::FxResult;
use crate::provider::{ProviderState, RateProvider, RefreshOutcome};
use crate::units;

/// Owns the rate provider and the user's conversion direction.
pub struct CurrencyConverter {
    provider: Arc<RateProvider>,
    direction: RwLock<ConversionDirection>,
}

impl CurrencyConverter {
    /// Create a converter over an existing provider, starting at USD → CNY.
    pub fn new(provider: Arc<RateProvider>) -> Self {
        Self {
            provider,
            direction: RwLock::new(ConversionDirection::default()),
        }
    }

    /// Create a converter talking to the configured HTTP feeds.
    pub fn from_config(config: &FxConfig) -> FxResult<Self> {
        Ok(Self::new(Arc::new(RateProvider::from_config(config)?)))
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<RateProvider> {
        &self.provider
    }

    /// Refresh rates.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.provider.refresh().await
    }

    /// The latest adopted pair.
    pub fn current_rate_pair(&self) -> Option<RatePair> {
        self.provider.current_rate_pair()
    }

    /// Provider lifecycle state.
    pub fn state(&self) -> ProviderState {
        self.provider.state()
    }

    /// Receive every newly adopted pair.
    pub fn subscribe(&self) -> watch::Receiver<Option<RatePair>> {
        self.provider.subscribe()
    }

    /// Current direction.
    pub fn direction(&self) -> ConversionDirection {
        *self.direction.read()
    }

    /// Set the direction explicitly.
    pub fn set_direction(&self, direction: ConversionDirection) {
        *self.direction.write() = direction;
    }

    /// Flip the direction and return the new one. Rates are untouched.
    pub fn toggle_direction(&self) -> ConversionDirection {
        let mut direction = self.direction.write();
        *direction = direction.toggle();
        debug!(direction = %*direction, "Switched conversion direction");
        *direction
    }

    /// Convert `amount` in the current direction.
    #[instrument(skip(self), fields(direction = %self.direction()))]
    pub fn convert(&self, amount: Decimal) -> ConversionResult {
        self.convert_in(amount, self.direction())
    }

    /// Convert `amount` in an explicit direction.
    pub fn convert_in(&self, amount: Decimal, direction: ConversionDirection) -> ConversionResult {
        conversion::convert(amount, direction, self.current_rate_pair().as_ref())
    }

    /// Convert user text in the current direction.
    pub fn convert_input(&self, text: &str) -> ConversionResult {
        conversion::convert_input(text, self.direction(), self.current_rate_pair().as_ref())
    }

    /// `1 USD = 7.20 CNY` for the current direction, once rates are loaded.
    pub fn rate_label(&self) -> Option<String> {
        conversion::format_rate_label(self.direction(), self.current_rate_pair().as_ref())
    }

    /// Divide-by-a-million conversion.
    pub fn convert_fixed_divisor(&self, amount: Decimal) -> String {
        units::convert_fixed_divisor(amount)
    }

    /// Parse a storage size such as `1.5G` into bytes.
    pub fn parse_storage_size(&self, text: &str) -> FxResult<i128> {
        units::parse_storage_size(text)
    }
}
