//! usdcny CLI
//!
//! Refreshes USD/CNY rates and runs the converters from the command line.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usdcny_fx::{CurrencyConverter, FxConfig};

mod commands;

/// usdcny command-line interface
#[derive(Parser, Debug)]
#[command(name = "usdcny")]
#[command(about = "USD/CNY exchange rates and unit converters")]
struct Args {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Primary rate endpoint template ({base} and {quote} are substituted)
    #[arg(long, global = true)]
    primary_url: Option<String>,

    /// Backup rate endpoint template
    #[arg(long, global = true)]
    backup_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    request_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh and print the current rate pair
    Rates,
    /// Convert an amount (USD → CNY unless --reverse)
    Convert {
        /// Amount to convert
        amount: String,
        /// Convert CNY → USD instead
        #[arg(short, long)]
        reverse: bool,
    },
    /// Divide an amount by one million
    Scale {
        /// Amount to scale
        amount: String,
    },
    /// Parse a storage size such as 1.5G into bytes
    Storage {
        /// Size with optional K/M/G/T/P suffix
        size: String,
    },
    /// Refresh periodically and print every new rate pair
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value = "60")]
        interval: u64,
    },
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

fn log_directives(rust_log: Option<String>) -> String {
    rust_log.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn init_logging(json: bool) {
    let filter =
        tracing_subscriber::EnvFilter::new(log_directives(std::env::var("RUST_LOG").ok()));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(args: &Args) -> anyhow::Result<FxConfig> {
    let mut config = FxConfig::from_env();

    if let Some(url) = &args.primary_url {
        config.primary.url_template = url.clone();
    }
    if let Some(url) = &args.backup_url {
        config.backup.url_template = url.clone();
    }
    if let Some(ms) = args.request_timeout_ms {
        config.request_timeout = std::time::Duration::from_millis(ms);
        config.connect_timeout = config.connect_timeout.min(config.request_timeout);
        config.refresh_timeout = config.refresh_timeout.max(config.request_timeout * 2);
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json);

    match &args.command {
        Command::Scale { amount } => return commands::scale(amount),
        Command::Storage { size } => return commands::storage(size),
        _ => {}
    }

    let config = load_config(&args)?;
    let converter = CurrencyConverter::from_config(&config)?;
    info!(
        primary = %config.primary.url_template,
        backup = %config.backup.url_template,
        "Converter ready"
    );

    match args.command {
        Command::Rates => commands::rates(&converter).await,
        Command::Convert { amount, reverse } => commands::convert(&converter, &amount, reverse).await,
        Command::Watch { interval } => commands::watch(&converter, interval).await,
        Command::Scale { .. } | Command::Storage { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directives_default_to_info() {
        assert_eq!(log_directives(None), "info");
        assert_eq!(log_directives(Some("usdcny_fx=debug".into())), "usdcny_fx=debug");
    }
}
