//! usdcny FX pipeline
//!
//! Fetches USD↔CNY rates, falls back to simulated rates when no feed
//! answers, and converts amounts between the two currencies.
//!
//! # Features
//!
//! - Primary and backup HTTP rate feeds, one backup attempt per lookup
//! - Concurrent USD→CNY and CNY→USD lookups sharing one in-flight refresh
//! - Deterministic simulated rates when live data is unavailable
//! - Bidirectional conversion with 4-place display formatting
//! - Fixed-divisor and storage-size converters
//!
//! # Example
//!
//! ```rust,ignore
//! use usdcny_fx::{CurrencyConverter, FxConfig};
//! use rust_decimal_macros::dec;
//!
//! let converter = CurrencyConverter::from_config(&FxConfig::default())?;
//!
//! let outcome = converter.refresh().await;
//! println!("{}", outcome.notice.message);
//!
//! // 100 USD in CNY
//! let cny = converter.convert(dec!(100));
//! ```

pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod feed;
pub mod http;
pub mod provider;
pub mod simulated;
pub mod source;
pub mod units;

pub use config::{FeedConfig, FxConfig};
pub use conversion::{convert, format_amount, ConversionResult};
pub use engine::CurrencyConverter;
pub use error::{FxError, FxResult};
pub use feed::RateFeed;
pub use http::HttpRateFeed;
pub use provider::{Notice, ProviderState, RateProvider, RefreshOutcome, Severity};
pub use source::RateSource;
pub use units::{convert_fixed_divisor, parse_storage_size};
