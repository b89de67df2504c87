//! Drives providers end to end and turns every failure into a result.
//!
//! Each provider gets its own session, which is closed on every exit path:
//! success, provider error, timeout or panic. Results come back in the order
//! the providers were configured; unknown provider keys are skipped with a
//! warning and produce no result.

use crate::browser::{Page, SessionFactory};
use crate::error::ProviderError;
use crate::model::{aggregate, AggregateSummary, BillResult, ProviderConfig, RunConfig};
use crate::provider::{BillProvider, ProviderKind, Registry, Timing};
use futures::future::join_all;
use futures::FutureExt;
use rust_decimal::Decimal;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// Results and totals of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub results: Vec<BillResult>,
    pub summary: AggregateSummary,
}

pub struct Orchestrator {
    registry: Registry,
    sessions: Arc<dyn SessionFactory>,
    timing: Timing,
    provider_timeout: Duration,
    close_timeout: Duration,
    parallel: bool,
}

impl Orchestrator {
    pub fn new(registry: Registry, sessions: Arc<dyn SessionFactory>, timing: Timing) -> Self {
        Self {
            registry,
            sessions,
            timing,
            provider_timeout: Duration::from_secs(120),
            close_timeout: Duration::from_secs(10),
            parallel: false,
        }
    }

    /// Bounds a single provider's whole run.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Bounds how long releasing a session may take.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Scrapes providers concurrently. Result order is unchanged.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Scrapes every provider in `config` and aggregates the household totals.
    pub async fn run_pass(&self, config: &RunConfig) -> RunOutcome {
        let results = self.run(&config.providers).await;
        let summary = aggregate(&results, &config.static_bills, config.household_size);
        tracing::info!(
            providers = results.len(),
            failed = results.iter().filter(|r| !r.is_success()).count(),
            total = %summary.total,
            per_person = %summary.per_person,
            "Aggregation pass finished"
        );
        RunOutcome { results, summary }
    }

    /// Returns one result per recognized provider, in input order.
    pub async fn run(&self, providers: &[ProviderConfig]) -> Vec<BillResult> {
        let recognized: Vec<(Arc<dyn BillProvider>, &ProviderConfig)> = providers
            .iter()
            .filter_map(|config| {
                let kind = ProviderKind::from_key(&config.name);
                match self.registry.lookup(&kind) {
                    Some(provider) => Some((provider, config)),
                    None => {
                        let err = ProviderError::UnknownProvider(config.name.clone());
                        tracing::warn!(error = %err, "Skipping provider");
                        None
                    }
                }
            })
            .collect();

        if self.parallel {
            return join_all(
                recognized
                    .iter()
                    .map(|(provider, config)| self.scrape_bill(provider.as_ref(), config)),
            )
            .await;
        }

        let mut results = Vec::with_capacity(recognized.len());
        for (provider, config) in &recognized {
            results.push(self.scrape_bill(provider.as_ref(), config).await);
        }
        results
    }

    /// Runs one provider in a fresh session. Never fails; errors become the result.
    pub async fn scrape_bill(
        &self,
        provider: &dyn BillProvider,
        config: &ProviderConfig,
    ) -> BillResult {
        let name = provider.display_name();
        tracing::info!(provider = %name, "Scraping provider");

        let page = match time::timeout(self.provider_timeout, self.sessions.open()).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                tracing::error!(provider = %name, error = %e, "Could not open session");
                return BillResult::failed(name, e);
            }
            Err(_elapsed) => {
                let e = ProviderError::timeout(self.provider_timeout);
                tracing::error!(provider = %name, error = %e, "Session did not open");
                return BillResult::failed(name, e);
            }
        };

        let outcome = AssertUnwindSafe(time::timeout(
            self.provider_timeout,
            self.drive(provider, config, page.as_ref()),
        ))
        .catch_unwind()
        .await;

        match time::timeout(self.close_timeout, page.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(provider = %name, error = %e, "Failed to close session"),
            Err(_elapsed) => tracing::warn!(
                provider = %name,
                timeout_ms = self.close_timeout.as_millis() as u64,
                "Session close timed out"
            ),
        }

        let result = match outcome {
            Ok(Ok(Ok(balance))) => Ok(balance),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_elapsed)) => Err(ProviderError::timeout(self.provider_timeout)),
            Err(panic) => Err(ProviderError::Aborted(panic_message(panic.as_ref()))),
        };

        match result {
            Ok(balance) => {
                tracing::info!(provider = %name, %balance, "Balance scraped");
                BillResult::succeeded(name, balance)
            }
            Err(e) => {
                tracing::error!(provider = %name, error = %e, "Provider failed");
                BillResult::failed(name, e)
            }
        }
    }

    async fn drive(
        &self,
        provider: &dyn BillProvider,
        config: &ProviderConfig,
        page: &dyn Page,
    ) -> Result<Decimal, ProviderError> {
        let url = portal_url(provider, config);
        tracing::debug!(provider = %provider.display_name(), user = %config.username, %url, "Authenticating");
        provider
            .authenticate(page, url, &config.username, &config.password, &self.timing)
            .await?;
        provider.extract_balance(page, &self.timing).await
    }
}

/// The configured portal URL, or the adapter's own when none is configured.
fn portal_url<'a>(provider: &'a dyn BillProvider, config: &'a ProviderConfig) -> &'a str {
    if config.url.trim().is_empty() {
        provider.default_url()
    } else {
        config.url.as_str()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
