//! Simulated rates for when no feed answers.
//!
//! The generator is a smooth function of wall-clock time around fixed base
//! rates. It keeps conversions working offline and is always labelled
//! [`RateOrigin::Simulated`]; it is not a market estimate.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use usdcny_common::{unix_millis, RateOrigin, RatePair, Timestamp};

/// USD→CNY base the oscillation is centred on.
pub const USD_CNY_BASE: f64 = 7.2;

/// CNY→USD base the oscillation is centred on.
pub const CNY_USD_BASE: f64 = 0.14;

/// Peak swing added to the USD→CNY base.
pub const AMPLITUDE: f64 = 0.05;

/// Period divisor of the sinusoid, in milliseconds.
pub const PERIOD_MS: f64 = 1_000_000.0;

/// Decimal places simulated rates are rounded to.
pub const PRECISION: u32 = 14;

/// Swing for the CNY→USD rate is this fraction of the USD→CNY swing.
const INVERSE_SCALE: f64 = 0.01;

fn variation(millis: i64) -> f64 {
    (millis as f64 / PERIOD_MS).sin() * AMPLITUDE
}

fn to_decimal(value: f64) -> Decimal {
    // both inputs are bounded near their bases, so conversion cannot fail
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp(PRECISION)
}

/// USD→CNY simulated rate at `millis` since the epoch.
pub fn usd_to_cny_at(millis: i64) -> Decimal {
    to_decimal(USD_CNY_BASE + variation(millis))
}

/// CNY→USD simulated rate at `millis` since the epoch.
pub fn cny_to_usd_at(millis: i64) -> Decimal {
    to_decimal(CNY_USD_BASE + variation(millis) * INVERSE_SCALE)
}

/// Both simulated rates from one timestamp.
pub fn simulated_pair(at: Timestamp) -> RatePair {
    let millis = unix_millis(at);
    RatePair::new(
        usd_to_cny_at(millis),
        cny_to_usd_at(millis),
        at,
        RateOrigin::Simulated,
    )
    .expect("simulated rates never leave the neighbourhood of their positive bases")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_base_rates_at_epoch() {
        assert_eq!(usd_to_cny_at(0), dec!(7.2));
        assert_eq!(cny_to_usd_at(0), dec!(0.14));
    }

    #[test]
    fn test_deterministic() {
        let t = 1_718_000_000_000;
        assert_eq!(usd_to_cny_at(t), usd_to_cny_at(t));
        assert_eq!(cny_to_usd_at(t), cny_to_usd_at(t));
    }

    #[test]
    fn test_bounded_oscillation() {
        for t in (0..20).map(|i| i * 157_079_i64 + 1_700_000_000_000) {
            let usd = usd_to_cny_at(t);
            let cny = cny_to_usd_at(t);

            assert!(usd >= dec!(7.15) && usd <= dec!(7.25), "usd {} at {}", usd, t);
            assert!(cny >= dec!(0.1395) && cny <= dec!(0.1405), "cny {} at {}", cny, t);
            assert!(usd.scale() <= PRECISION);
        }
    }

    #[test]
    fn test_peak_of_wave() {
        // sin(pi/2) = 1
        let quarter = (std::f64::consts::FRAC_PI_2 * PERIOD_MS).round() as i64;
        assert_eq!(usd_to_cny_at(quarter).round_dp(6), dec!(7.25));
        assert_eq!(cny_to_usd_at(quarter).round_dp(6), dec!(0.1405));
    }

    #[test]
    fn test_simulated_pair_shares_timestamp() {
        let at = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        let pair = simulated_pair(at);

        assert!(pair.is_simulated());
        assert_eq!(pair.observed_at(), at);
        assert_eq!(pair.usd_to_cny(), usd_to_cny_at(1_700_000_123_456));
        assert_eq!(pair.cny_to_usd(), cny_to_usd_at(1_700_000_123_456));
    }
}
