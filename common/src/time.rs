//! Time utilities.

use chrono::{DateTime, Local, Utc};

/// A timestamp with timezone (always UTC internally).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds since the Unix epoch for a timestamp.
pub fn unix_millis(timestamp: Timestamp) -> i64 {
    timestamp.timestamp_millis()
}

/// Render a timestamp in local time as `YYYY/MM/DD HH:MM:SS`.
pub fn format_local(timestamp: Timestamp) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y/%m/%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unix_millis() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(unix_millis(ts), 1_700_000_000_123);
    }

    #[test]
    fn test_format_local_shape() {
        let formatted = format_local(now());
        // "2024/01/02 03:04:05"
        assert_eq!(formatted.len(), 19);
        assert_eq!(&formatted[4..5], "/");
        assert_eq!(&formatted[13..14], ":");
    }
}
