//! Currency conversion and display formatting.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use usdcny_common::{ConversionDirection, RatePair};

use crate::error::{FxError, FxResult};

/// Decimal places a converted amount is rounded to.
pub const CONVERSION_PLACES: u32 = 4;

/// Decimal places shown in the rate label.
pub const RATE_LABEL_PLACES: u32 = 2;

/// Outcome of converting an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionResult {
    /// Formatted target amount, trailing zeros stripped.
    Converted(String),
    /// No rate has been loaded for the direction.
    RateUnavailable,
    /// The amount was not a non-negative number.
    InvalidInput,
}

impl ConversionResult {
    /// The formatted amount, if the conversion produced one.
    pub fn value(&self) -> Option<&str> {
        match self {
            ConversionResult::Converted(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionResult::Converted(v) => write!(f, "{}", v),
            ConversionResult::RateUnavailable => write!(f, "rate not loaded"),
            ConversionResult::InvalidInput => write!(f, "invalid amount"),
        }
    }
}

/// Convert `amount` in `direction` using `pair`.
///
/// A missing pair yields [`ConversionResult::RateUnavailable`] whatever the
/// amount; a negative amount yields [`ConversionResult::InvalidInput`].
pub fn convert(
    amount: Decimal,
    direction: ConversionDirection,
    pair: Option<&RatePair>,
) -> ConversionResult {
    let rate = match pair.map(|p| p.rate_for(direction)) {
        Some(rate) if rate > Decimal::ZERO => rate,
        _ => return ConversionResult::RateUnavailable,
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        return ConversionResult::InvalidInput;
    }

    match amount.checked_mul(rate) {
        Some(value) => ConversionResult::Converted(format_amount(value, CONVERSION_PLACES)),
        None => ConversionResult::InvalidInput,
    }
}

/// Convert user-entered text.
pub fn convert_input(
    text: &str,
    direction: ConversionDirection,
    pair: Option<&RatePair>,
) -> ConversionResult {
    match parse_amount(text) {
        Ok(amount) => convert(amount, direction, pair),
        Err(_) if pair.is_none() => ConversionResult::RateUnavailable,
        Err(_) => ConversionResult::InvalidInput,
    }
}

/// Parse a decimal amount, accepting plain and scientific notation.
pub fn parse_amount(text: &str) -> FxResult<Decimal> {
    parse_decimal(text.trim()).ok_or_else(|| FxError::InvalidInput(text.to_string()))
}

static DECIMAL_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?)([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE]([+-]?[0-9]+))?$")
        .expect("decimal literal pattern")
});

/// Parse `[+-]digits[.digits][e[+-]digits]`, also `5.` and `.5`.
///
/// Exponents too small for 28 decimal places underflow to zero instead of
/// failing; ones too large to represent return `None`.
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let caps = DECIMAL_LITERAL.captures(text)?;

    let mantissa = &caps[2];
    let padded = match (mantissa.starts_with('.'), mantissa.ends_with('.')) {
        (true, _) => format!("0{}", mantissa),
        (_, true) => format!("{}0", mantissa),
        _ => mantissa.to_string(),
    };
    let mut value = Decimal::from_str(&padded).ok()?;

    if let Some(exponent) = caps.get(3) {
        value = scale_by_power_of_ten(value, exponent.as_str().parse().ok()?)?;
    }

    if &caps[1] == "-" {
        value = -value;
    }
    Some(value)
}

fn scale_by_power_of_ten(value: Decimal, exponent: i32) -> Option<Decimal> {
    if value.is_zero() {
        return Some(value);
    }
    if exponent >= 0 {
        (0..exponent).try_fold(value, |acc, _| acc.checked_mul(Decimal::TEN))
    } else {
        // nothing survives 60 divisions at 28 places
        let steps = exponent.unsigned_abs().min(60);
        Some((0..steps).fold(value, |acc, _| acc / Decimal::TEN))
    }
}

/// Round half away from zero to `places`, then strip trailing zeros.
pub fn format_amount(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    strip_trailing_zeros(&format!("{:.*}", places as usize, rounded))
}

/// Drop trailing fractional zeros, and the point itself if nothing is left.
///
/// `12.3400` → `12.34`, `12.0000` → `12`, `0.0001` → `0.0001`. Text without
/// a decimal point is returned unchanged.
pub fn strip_trailing_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `1 USD = 7.20 CNY` style label for the current direction.
pub fn format_rate_label(direction: ConversionDirection, pair: Option<&RatePair>) -> Option<String> {
    let rate = pair?.rate_for(direction);
    let shown = rate.round_dp_with_strategy(RATE_LABEL_PLACES, RoundingStrategy::MidpointAwayFromZero);

    Some(format!(
        "1 {} = {:.*} {}",
        direction.source(),
        RATE_LABEL_PLACES as usize,
        shown,
        direction.target()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use usdcny_common::{now, RateOrigin};

    fn pair() -> RatePair {
        RatePair::new(dec!(7.1234), dec!(0.1404), now(), RateOrigin::Live).unwrap()
    }

    #[test]
    fn test_strip_trailing_zeros() {
        assert_eq!(strip_trailing_zeros("12.3400"), "12.34");
        assert_eq!(strip_trailing_zeros("12.0000"), "12");
        assert_eq!(strip_trailing_zeros("0.0001"), "0.0001");
        assert_eq!(strip_trailing_zeros("0.0000"), "0");
        assert_eq!(strip_trailing_zeros("100"), "100");
        assert_eq!(strip_trailing_zeros("100.50"), "100.5");
    }

    #[test]
    fn test_format_amount_rounds_half_away_from_zero() {
        assert_eq!(format_amount(dec!(1.23445), 4), "1.2345");
        assert_eq!(format_amount(dec!(12.34), 4), "12.34");
        assert_eq!(format_amount(dec!(12), 4), "12");
        assert_eq!(format_amount(dec!(0.00004), 4), "0");
    }

    #[test]
    fn test_convert_both_directions() {
        let pair = pair();

        assert_eq!(
            convert(dec!(100), ConversionDirection::UsdToCny, Some(&pair)),
            ConversionResult::Converted("712.34".to_string())
        );
        assert_eq!(
            convert(dec!(1000), ConversionDirection::CnyToUsd, Some(&pair)),
            ConversionResult::Converted("140.4".to_string())
        );
        assert_eq!(
            convert(dec!(0), ConversionDirection::UsdToCny, Some(&pair)),
            ConversionResult::Converted("0".to_string())
        );
    }

    #[test]
    fn test_convert_without_rates() {
        for amount in [dec!(0), dec!(1), dec!(-5), dec!(1000000)] {
            assert_eq!(
                convert(amount, ConversionDirection::UsdToCny, None),
                ConversionResult::RateUnavailable
            );
        }
    }

    #[test]
    fn test_convert_negative_amount() {
        assert_eq!(
            convert(dec!(-1), ConversionDirection::CnyToUsd, Some(&pair())),
            ConversionResult::InvalidInput
        );
    }

    #[test]
    fn test_convert_input() {
        let pair = pair();

        assert_eq!(
            convert_input(" 10 ", ConversionDirection::UsdToCny, Some(&pair)).value(),
            Some("71.234")
        );
        assert_eq!(
            convert_input("1e2", ConversionDirection::UsdToCny, Some(&pair)).value(),
            Some("712.34")
        );
        assert_eq!(
            convert_input("abc", ConversionDirection::UsdToCny, Some(&pair)),
            ConversionResult::InvalidInput
        );
        assert_eq!(
            convert_input("", ConversionDirection::UsdToCny, Some(&pair)),
            ConversionResult::InvalidInput
        );
        assert_eq!(
            convert_input("abc", ConversionDirection::UsdToCny, None),
            ConversionResult::RateUnavailable
        );
    }

    #[test]
    fn test_convert_input_exponent_forms() {
        let pair = pair();

        assert_eq!(
            convert_input("1e-30", ConversionDirection::UsdToCny, Some(&pair)).value(),
            Some("0")
        );
        assert_eq!(
            convert_input("2.5E1", ConversionDirection::UsdToCny, Some(&pair)).value(),
            Some("178.085")
        );
        assert_eq!(
            convert_input(".5", ConversionDirection::UsdToCny, Some(&pair)).value(),
            Some("3.5617")
        );
        assert_eq!(
            convert_input("1e99", ConversionDirection::UsdToCny, Some(&pair)),
            ConversionResult::InvalidInput
        );
    }

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(parse_decimal("5."), Some(dec!(5)));
        assert_eq!(parse_decimal("-1.5e2"), Some(dec!(-150)));
        assert_eq!(parse_decimal("1e-3"), Some(dec!(0.001)));
        assert_eq!(parse_decimal("1e-30"), Some(Decimal::ZERO));
        assert_eq!(parse_decimal("1_000"), None);
        assert_eq!(parse_decimal("e5"), None);
        assert_eq!(parse_decimal("1e"), None);
    }

    #[test]
    fn test_rate_label() {
        let pair = pair();

        assert_eq!(
            format_rate_label(ConversionDirection::UsdToCny, Some(&pair)).unwrap(),
            "1 USD = 7.12 CNY"
        );
        assert_eq!(
            format_rate_label(ConversionDirection::CnyToUsd, Some(&pair)).unwrap(),
            "1 CNY = 0.14 USD"
        );
        assert!(format_rate_label(ConversionDirection::UsdToCny, None).is_none());
    }

    proptest! {
        #[test]
        fn prop_converted_value_close_to_product(
            cents in 0u64..100_000_000_000,
            rate_ten_thousandths in 1u64..1_000_000,
            reverse in any::<bool>(),
        ) {
            let amount = Decimal::new(cents as i64, 2);
            let rate = Decimal::new(rate_ten_thousandths as i64, 4);
            let direction = if reverse {
                ConversionDirection::CnyToUsd
            } else {
                ConversionDirection::UsdToCny
            };
            let pair = RatePair::new(rate, rate, now(), RateOrigin::Live).unwrap();

            let result = convert(amount, direction, Some(&pair));
            let shown: Decimal = result.value().unwrap().parse().unwrap();

            prop_assert!((shown - amount * rate).abs() <= dec!(0.0001));
        }
    }
}
