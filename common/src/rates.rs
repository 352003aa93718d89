//! The USD/CNY rate pair.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ConversionDirection, CurrencyPair, RatePairError, Result, Timestamp};

/// Where a rate pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateOrigin {
    /// Both rates were fetched from a rate API.
    Live,
    /// Both rates came from the simulated generator. Not a market rate.
    Simulated,
}

impl RateOrigin {
    pub fn is_simulated(&self) -> bool {
        matches!(self, RateOrigin::Simulated)
    }
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateOrigin::Live => write!(f, "live"),
            RateOrigin::Simulated => write!(f, "simulated"),
        }
    }
}

/// Both directions of the USD/CNY rate, observed together.
///
/// A pair only exists once both rates are known; the "not loaded yet" state
/// is the absence of a pair, so a zero rate is never used in arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePair {
    usd_to_cny: Decimal,
    cny_to_usd: Decimal,
    observed_at: Timestamp,
    origin: RateOrigin,
}

impl RatePair {
    /// Create a pair, rejecting zero or negative rates.
    pub fn new(
        usd_to_cny: Decimal,
        cny_to_usd: Decimal,
        observed_at: Timestamp,
        origin: RateOrigin,
    ) -> Result<Self> {
        for (pair, value) in [
            (CurrencyPair::usd_cny(), usd_to_cny),
            (CurrencyPair::cny_usd(), cny_to_usd),
        ] {
            if value <= Decimal::ZERO {
                return Err(RatePairError::NonPositiveRate {
                    pair,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            usd_to_cny,
            cny_to_usd,
            observed_at,
            origin,
        })
    }

    /// Dollars to yuan.
    pub fn usd_to_cny(&self) -> Decimal {
        self.usd_to_cny
    }

    /// Yuan to dollars.
    pub fn cny_to_usd(&self) -> Decimal {
        self.cny_to_usd
    }

    /// The rate a conversion in `direction` multiplies by.
    pub fn rate_for(&self, direction: ConversionDirection) -> Decimal {
        match direction {
            ConversionDirection::UsdToCny => self.usd_to_cny,
            ConversionDirection::CnyToUsd => self.cny_to_usd,
        }
    }

    pub fn observed_at(&self) -> Timestamp {
        self.observed_at
    }

    pub fn origin(&self) -> RateOrigin {
        self.origin
    }

    pub fn is_simulated(&self) -> bool {
        self.origin.is_simulated()
    }
}

impl fmt::Display for RatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "USD/CNY {} CNY/USD {} ({})",
            self.usd_to_cny, self.cny_to_usd, self.origin
        )
    }
}
