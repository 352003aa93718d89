//! Auxiliary unit converters: divide-by-a-million scaling and storage sizes.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::conversion::{format_amount, parse_amount, parse_decimal};
use crate::error::{FxError, FxResult};

/// Divisor used by the fixed-divisor converter.
pub const FIXED_DIVISOR: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Decimal places kept by the fixed-divisor converter before stripping.
pub const FIXED_DIVISOR_PLACES: u32 = 20;

static STORAGE_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:E[+-]?[0-9]+)?)\s*([KMGTP])$")
        .expect("storage size pattern")
});

/// `amount / 1_000_000`, up to 20 decimal places, trailing zeros stripped.
pub fn convert_fixed_divisor(amount: Decimal) -> String {
    format_amount(amount / FIXED_DIVISOR, FIXED_DIVISOR_PLACES)
}

/// Fixed-divisor conversion of user text; `None` for non-numeric input.
pub fn convert_fixed_divisor_input(text: &str) -> Option<String> {
    parse_amount(text).ok().map(convert_fixed_divisor)
}

/// Decimal multiplier for a storage unit letter.
pub fn unit_multiplier(unit: char) -> Option<Decimal> {
    let exponent = match unit.to_ascii_uppercase() {
        'K' => 3,
        'M' => 6,
        'G' => 9,
        'T' => 12,
        'P' => 15,
        _ => return None,
    };
    Some(Decimal::from(10u64.pow(exponent)))
}

/// Parse `<number><unit>` (or a bare number) into a whole byte count.
///
/// Units are 1000-based and case-insensitive, with optional whitespace
/// before the unit. The result is floored.
pub fn parse_storage_size(text: &str) -> FxResult<i128> {
    let normalized = text.trim().to_uppercase();
    let invalid = || FxError::InvalidFormat(text.to_string());

    let bytes = if let Some(caps) = STORAGE_SIZE.captures(&normalized) {
        let number = parse_decimal(&caps[1]).ok_or_else(invalid)?;
        let unit = caps[2].chars().next().ok_or_else(invalid)?;
        let multiplier = unit_multiplier(unit).ok_or_else(invalid)?;
        number.checked_mul(multiplier).ok_or_else(invalid)?
    } else {
        parse_decimal(&normalized).ok_or_else(invalid)?
    };

    bytes.floor().to_i128().ok_or_else(invalid)
}
