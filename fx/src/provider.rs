//! Rate provider: the current USD/CNY pair and how it gets refreshed.

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn, Instrument, Span};
use usdcny_common::{now, CurrencyPair, RateOrigin, RatePair, Timestamp};

use crate::config::FxConfig;
use crate::error::{FxError, FxResult};
use crate::http::HttpRateFeed;
use crate::simulated::simulated_pair;
use crate::source::RateSource;

/// Provider lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// No refresh has completed yet.
    Uninitialized,
    /// A refresh is in flight.
    Loading,
    /// The current pair came from the rate feeds.
    ReadyReal,
    /// The current pair is simulated.
    ReadySimulated,
}

impl ProviderState {
    /// Check if a pair is available for conversions.
    pub fn is_ready(&self) -> bool {
        matches!(self, ProviderState::ReadyReal | ProviderState::ReadySimulated)
    }
}

/// How loudly a refresh result should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Caller-facing description of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Result of a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    /// The pair adopted by the refresh.
    pub pair: RatePair,
    /// What to tell the user about it.
    pub notice: Notice,
    /// True if this caller waited on another caller's refresh instead of
    /// issuing its own lookups.
    pub joined: bool,
}

/// Owns the current rate pair and refreshes it from a [`RateSource`].
///
/// Refreshes look up USD→CNY and CNY→USD concurrently. Both must succeed
/// for a live pair; otherwise both rates are replaced by simulated ones.
/// The lookup runs on its own task, so a caller that goes away does not
/// abort it. Callers that arrive while a refresh is in flight wait for it
/// and share its result rather than issuing their own lookups.
pub struct RateProvider {
    inner: Arc<Inner>,
}

type InFlight = watch::Receiver<Option<RefreshOutcome>>;

struct Inner {
    source: RateSource,
    refresh_timeout: Duration,
    in_flight: Mutex<Option<InFlight>>,
    last_outcome: RwLock<Option<RefreshOutcome>>,
    changes: watch::Sender<Option<RatePair>>,
}

/// Empties the in-flight slot when the refresh task ends, even by panic.
struct ClearInFlight(Arc<Inner>);

impl Drop for ClearInFlight {
    fn drop(&mut self) {
        *self.0.in_flight.lock() = None;
    }
}

impl RateProvider {
    /// Create a provider over `source`; the joint lookup is bounded by
    /// `refresh_timeout`.
    pub fn new(source: RateSource, refresh_timeout: Duration) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                source,
                refresh_timeout,
                in_flight: Mutex::new(None),
                last_outcome: RwLock::new(None),
                changes,
            }),
        }
    }

    /// Create a provider with HTTP feeds built from `config`.
    pub fn from_config(config: &FxConfig) -> FxResult<Self> {
        let client = HttpRateFeed::build_client(config.request_timeout, config.connect_timeout)?;
        let primary = Arc::new(HttpRateFeed::new(&config.primary, client.clone()));
        let backup = Arc::new(HttpRateFeed::new(&config.backup, client));

        Ok(Self::new(
            RateSource::new(primary, backup),
            config.refresh_timeout,
        ))
    }

    /// Refresh both rates.
    ///
    /// Never fails: if live rates cannot be obtained the adopted pair is
    /// simulated and the notice says so. Dropping the returned future does
    /// not cancel the refresh; it still runs to an adopted pair.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let (mut done, joined) = self.start_or_join();
        if joined {
            debug!("Joined in-flight refresh");
        }

        loop {
            let finished = done.borrow_and_update().clone();
            if let Some(outcome) = finished {
                return RefreshOutcome { joined, ..outcome };
            }
            if done.changed().await.is_err() {
                break;
            }
        }

        // the refresh task died without publishing an outcome
        warn!("Refresh task ended without a result");
        self.inner.adopt(Inner::simulated(
            Severity::Error,
            "Rate refresh aborted, using simulated data",
        ))
    }

    fn start_or_join(&self) -> (InFlight, bool) {
        let mut slot = self.inner.in_flight.lock();
        if let Some(done) = slot.as_ref() {
            return (done.clone(), true);
        }

        let (publish, done) = watch::channel(None);
        *slot = Some(done.clone());
        drop(slot);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(
            async move {
                let clear = ClearInFlight(Arc::clone(&inner));
                let outcome = inner.fetch_pair().await;
                let outcome = inner.adopt(outcome);
                drop(clear);
                publish.send_replace(Some(outcome));
            }
            .instrument(Span::current()),
        );

        (done, false)
    }

    /// The latest adopted pair, if any refresh has completed.
    pub fn current_rate_pair(&self) -> Option<RatePair> {
        self.inner.changes.borrow().clone()
    }

    /// When the current pair was observed.
    pub fn last_updated(&self) -> Option<Timestamp> {
        self.inner.changes.borrow().as_ref().map(RatePair::observed_at)
    }

    /// The notice from the most recent refresh.
    pub fn last_notice(&self) -> Option<Notice> {
        self.inner.last_outcome.read().as_ref().map(|o| o.notice.clone())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ProviderState {
        if self.inner.in_flight.lock().is_some() {
            return ProviderState::Loading;
        }

        match self.inner.changes.borrow().as_ref().map(RatePair::origin) {
            None => ProviderState::Uninitialized,
            Some(RateOrigin::Live) => ProviderState::ReadyReal,
            Some(RateOrigin::Simulated) => ProviderState::ReadySimulated,
        }
    }

    /// Receive every newly adopted pair.
    pub fn subscribe(&self) -> watch::Receiver<Option<RatePair>> {
        self.inner.changes.subscribe()
    }
}

impl Inner {
    async fn fetch_pair(&self) -> RefreshOutcome {
        let usd_cny = CurrencyPair::usd_cny();
        let cny_usd = CurrencyPair::cny_usd();

        let lookups = async {
            tokio::join!(
                self.source.fetch_rate(&usd_cny),
                self.source.fetch_rate(&cny_usd)
            )
        };

        match tokio::time::timeout(self.refresh_timeout, lookups).await {
            Ok((Some(usd_to_cny), Some(cny_to_usd))) => {
                match RatePair::new(usd_to_cny, cny_to_usd, now(), RateOrigin::Live) {
                    Ok(pair) => RefreshOutcome {
                        pair,
                        notice: Notice::new(Severity::Info, "Exchange rates refreshed"),
                        joined: false,
                    },
                    Err(e) => {
                        let e = FxError::from(e);
                        warn!(error = %e, "Feeds returned an unusable pair");
                        Self::simulated(Severity::Error, format!(
                            "Rate lookup failed, using simulated data: {}",
                            e
                        ))
                    }
                }
            }
            Ok((usd_to_cny, cny_to_usd)) => {
                // a single missing direction discards the other one too
                warn!(
                    usd_cny_found = usd_to_cny.is_some(),
                    cny_usd_found = cny_to_usd.is_some(),
                    "Live rates unavailable"
                );
                Self::simulated(
                    Severity::Warning,
                    "Live rates unavailable, using simulated data",
                )
            }
            Err(_) => {
                warn!(timeout_ms = self.refresh_timeout.as_millis() as u64, "Rate lookup timed out");
                Self::simulated(
                    Severity::Error,
                    format!(
                        "Rate lookup timed out after {}ms, using simulated data",
                        self.refresh_timeout.as_millis()
                    ),
                )
            }
        }
    }

    fn simulated(severity: Severity, message: impl Into<String>) -> RefreshOutcome {
        RefreshOutcome {
            pair: simulated_pair(now()),
            notice: Notice::new(severity, message),
            joined: false,
        }
    }

    fn adopt(&self, outcome: RefreshOutcome) -> RefreshOutcome {
        info!(
            usd_cny = %outcome.pair.usd_to_cny(),
            cny_usd = %outcome.pair.cny_to_usd(),
            origin = %outcome.pair.origin(),
            "Adopted rate pair"
        );

        *self.last_outcome.write() = Some(outcome.clone());
        self.changes.send_replace(Some(outcome.pair.clone()));

        outcome
    }
}
