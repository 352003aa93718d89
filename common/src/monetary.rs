//! Currency codes, pairs and conversion direction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Display symbol for the currency, falling back to the code.
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "USD" => "$",
            "CNY" => "¥",
            other => other,
        }
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn cny() -> Self {
        Self::new("CNY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A currency pair: one unit of `base` is worth `rate` units of `quote`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Base currency (the one the rate is quoted per unit of).
    pub base: Currency,
    /// Quote currency (the target of the rate lookup).
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    pub fn usd_cny() -> Self {
        Self::new(Currency::usd(), Currency::cny())
    }

    pub fn cny_usd() -> Self {
        Self::new(Currency::cny(), Currency::usd())
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Which way an amount is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConversionDirection {
    /// Dollars in, yuan out.
    #[default]
    UsdToCny,
    /// Yuan in, dollars out.
    CnyToUsd,
}

impl ConversionDirection {
    /// The opposite direction. Pure; touches no rate state.
    pub fn toggle(self) -> Self {
        match self {
            ConversionDirection::UsdToCny => ConversionDirection::CnyToUsd,
            ConversionDirection::CnyToUsd => ConversionDirection::UsdToCny,
        }
    }

    /// Currency of the amount the user enters.
    pub fn source(self) -> Currency {
        match self {
            ConversionDirection::UsdToCny => Currency::usd(),
            ConversionDirection::CnyToUsd => Currency::cny(),
        }
    }

    /// Currency of the converted amount.
    pub fn target(self) -> Currency {
        self.source_target().1
    }

    /// The pair whose rate this direction multiplies by.
    pub fn pair(self) -> CurrencyPair {
        let (base, quote) = self.source_target();
        CurrencyPair::new(base, quote)
    }

    fn source_target(self) -> (Currency, Currency) {
        match self {
            ConversionDirection::UsdToCny => (Currency::usd(), Currency::cny()),
            ConversionDirection::CnyToUsd => (Currency::cny(), Currency::usd()),
        }
    }
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source(), self.target())
    }
}
