//! usdcny Common Types
//!
//! Shared types used across the usdcny workspace: currency codes, the
//! conversion direction, and the USD/CNY rate pair held by the provider.

pub mod monetary;
pub mod rates;
pub mod error;
pub mod time;

pub use monetary::*;
pub use rates::*;
pub use error::*;
pub use time::*;
