//! Subcommand implementations.

use std::time::Duration;

use anyhow::{anyhow, Context};
use tracing::info;

use usdcny_common::{format_local, ConversionDirection, RatePair};
use usdcny_fx::{conversion, units, ConversionResult, CurrencyConverter, RefreshOutcome, Severity};

fn report(outcome: &RefreshOutcome) {
    match outcome.notice.severity {
        Severity::Info => info!(message = %outcome.notice.message, "Refresh complete"),
        Severity::Warning | Severity::Error => {
            eprintln!("[{}] {}", outcome.notice.severity, outcome.notice.message)
        }
    }
}

fn print_pair(pair: &RatePair) {
    for direction in [ConversionDirection::UsdToCny, ConversionDirection::CnyToUsd] {
        if let Some(label) = conversion::format_rate_label(direction, Some(pair)) {
            println!("{}", label);
        }
    }
    println!("source: {}", pair.origin());
    println!("last updated: {}", format_local(pair.observed_at()));
}

/// `usdcny rates`
pub async fn rates(converter: &CurrencyConverter) -> anyhow::Result<()> {
    let outcome = converter.refresh().await;
    report(&outcome);
    print_pair(&outcome.pair);
    Ok(())
}

/// `usdcny convert <amount> [--reverse]`
pub async fn convert(converter: &CurrencyConverter, amount: &str, reverse: bool) -> anyhow::Result<()> {
    if reverse {
        converter.set_direction(ConversionDirection::CnyToUsd);
    }

    let outcome = converter.refresh().await;
    report(&outcome);

    let direction = converter.direction();
    match converter.convert_input(amount) {
        ConversionResult::Converted(value) => {
            println!(
                "{}{} = {}{}",
                direction.source().symbol(),
                amount.trim(),
                direction.target().symbol(),
                value
            );
            if let Some(label) = converter.rate_label() {
                println!("{}", label);
            }
            Ok(())
        }
        ConversionResult::RateUnavailable => Err(anyhow!("Exchange rates are not loaded yet")),
        ConversionResult::InvalidInput => Err(anyhow!("Invalid amount: {:?}", amount)),
    }
}

/// `usdcny scale <amount>`
pub fn scale(amount: &str) -> anyhow::Result<()> {
    let scaled = units::convert_fixed_divisor_input(amount)
        .ok_or_else(|| anyhow!("Invalid amount: {:?}", amount))?;
    println!("{}", scaled);
    Ok(())
}

/// `usdcny storage <size>`
pub fn storage(size: &str) -> anyhow::Result<()> {
    let bytes = units::parse_storage_size(size).context("Invalid storage size")?;
    println!("{}", bytes);
    Ok(())
}

/// `usdcny watch --interval <secs>`
pub async fn watch(converter: &CurrencyConverter, interval_secs: u64) -> anyhow::Result<()> {
    let mut changes = converter.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = converter.refresh().await;
                report(&outcome);
            }
            changed = changes.changed() => {
                changed.context("Rate provider closed")?;
                let latest = changes.borrow_and_update().clone();
                if let Some(pair) = latest {
                    print_pair(&pair);
                    println!();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                return Ok(());
            }
        }
    }
}
