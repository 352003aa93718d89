//! Pipeline configuration.

use std::time::Duration;

/// Default primary endpoint template.
pub const DEFAULT_PRIMARY_URL: &str = "https://api.exchangerate-api.com/v4/latest/{base}";

/// Default backup endpoint template.
pub const DEFAULT_BACKUP_URL: &str = "https://api.fxratesapi.com/latest?base={base}&symbols={quote}";

/// Endpoint configuration for one rate feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Feed name used in logs.
    pub name: String,
    /// URL template; `{base}` and `{quote}` are substituted per lookup.
    pub url_template: String,
}

impl FeedConfig {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }
}

/// Main pipeline configuration.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Feed tried first for each lookup.
    pub primary: FeedConfig,
    /// Feed tried once when the primary fails.
    pub backup: FeedConfig,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Deadline for the joint USD/CNY + CNY/USD lookup.
    pub refresh_timeout: Duration,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            primary: FeedConfig::new("exchangerate-api", DEFAULT_PRIMARY_URL),
            backup: FeedConfig::new("fxratesapi", DEFAULT_BACKUP_URL),
            request_timeout: Duration::from_secs(8),
            connect_timeout: Duration::from_secs(3),
            refresh_timeout: Duration::from_secs(20),
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("USDCNY_PRIMARY_URL") {
            config.primary.url_template = url;
        }

        if let Ok(url) = std::env::var("USDCNY_BACKUP_URL") {
            config.backup.url_template = url;
        }

        if let Some(ms) = env_millis("USDCNY_REQUEST_TIMEOUT_MS") {
            config.request_timeout = ms;
        }

        if let Some(ms) = env_millis("USDCNY_CONNECT_TIMEOUT_MS") {
            config.connect_timeout = ms;
        }

        if let Some(ms) = env_millis("USDCNY_REFRESH_TIMEOUT_MS") {
            config.refresh_timeout = ms;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        for feed in [&self.primary, &self.backup] {
            if !feed.url_template.starts_with("http://") && !feed.url_template.starts_with("https://") {
                return Err(format!("{} URL must be http(s): {}", feed.name, feed.url_template));
            }
            if !feed.url_template.contains("{base}") {
                return Err(format!("{} URL must contain {{base}}", feed.name));
            }
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be 0".to_string());
        }

        if self.connect_timeout > self.request_timeout {
            return Err("Connect timeout cannot exceed request timeout".to_string());
        }

        // primary and backup run back to back inside one refresh
        if self.refresh_timeout < self.request_timeout * 2 {
            return Err("Refresh timeout must cover a primary and a backup request".to_string());
        }

        Ok(())
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}
