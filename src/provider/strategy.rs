//! Ordered fallback chains for locating balances and controls.
//!
//! Adapters describe their extraction and submit options as data. The chain
//! walks the list in order and the earliest strategy that resolves wins; a
//! strategy that does not resolve is skipped, never reported.

use super::amount::parse_amount;
use crate::browser::{Locator, Page, ValueSource};
use crate::error::ProviderError;
use rust_decimal::Decimal;
use std::time::Duration;

/// Wait budgets for each step of a provider run.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// Per-strategy wait for credential fields and error banners
    pub element_wait: Duration,
    /// Per-strategy wait for balance elements
    pub balance_wait: Duration,
    /// Per-strategy wait for alternative submit controls
    pub submit_wait: Duration,
    /// Bound on a portal reaching its loaded state
    pub page_load_timeout: Duration,
    /// Extra pause after navigation for portals that render late
    pub settle: Duration,
    /// Additional navigation attempts before giving up
    pub navigation_retries: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_secs(5),
            balance_wait: Duration::from_secs(10),
            submit_wait: Duration::from_secs(2),
            page_load_timeout: Duration::from_secs(30),
            settle: Duration::from_secs(2),
            navigation_retries: 0,
        }
    }
}

/// One candidate locator plus how to read its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStrategy {
    pub locator: Locator,
    pub source: ValueSource,
}

impl ExtractionStrategy {
    pub const fn text(locator: Locator) -> Self {
        Self {
            locator,
            source: ValueSource::Text,
        }
    }

    pub const fn input_value(locator: Locator) -> Self {
        Self {
            locator,
            source: ValueSource::InputValue,
        }
    }

    /// Resolves this strategy to an amount, `None` when it does not apply.
    async fn attempt(&self, page: &dyn Page, wait: Duration) -> Option<Decimal> {
        match page.is_visible_within(&self.locator, wait).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(locator = %self.locator, "Strategy did not resolve in time");
                return None;
            }
            Err(e) => {
                tracing::debug!(locator = %self.locator, error = %e, "Strategy lookup failed");
                return None;
            }
        }

        let raw = match page.read(&self.locator, self.source).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(locator = %self.locator, error = %e, "Strategy read failed");
                return None;
            }
        };

        match parse_amount(&raw) {
            Ok(amount) => Some(amount),
            Err(e) => {
                tracing::debug!(locator = %self.locator, error = %e, "Strategy value not parseable");
                None
            }
        }
    }
}

/// Walks `strategies` in order and returns the first parseable amount.
pub async fn extract_first(
    page: &dyn Page,
    strategies: &[ExtractionStrategy],
    wait: Duration,
) -> Result<Decimal, ProviderError> {
    for (index, strategy) in strategies.iter().enumerate() {
        if let Some(amount) = strategy.attempt(page, wait).await {
            tracing::debug!(strategy = index, locator = %strategy.locator, %amount, "Balance found");
            return Ok(amount);
        }
    }
    Err(ProviderError::BalanceNotFound)
}

/// Clicks the first visible control among `controls`.
///
/// The first entry is the primary control and gets `primary_wait`; the rest are
/// alternatives tried with `alternative_wait` each.
pub async fn click_first_visible(
    page: &dyn Page,
    controls: &[Locator],
    primary_wait: Duration,
    alternative_wait: Duration,
) -> Result<(), ProviderError> {
    for (index, locator) in controls.iter().enumerate() {
        let wait = if index == 0 {
            primary_wait
        } else {
            alternative_wait
        };
        match page.is_visible_within(locator, wait).await {
            Ok(true) => {
                tracing::debug!(strategy = index, %locator, "Clicking submit control");
                page.click(locator).await?;
                return Ok(());
            }
            Ok(false) => {
                tracing::debug!(strategy = index, %locator, "Submit control not visible");
            }
            Err(e) => {
                tracing::debug!(strategy = index, %locator, error = %e, "Submit lookup failed");
            }
        }
    }
    Err(ProviderError::SubmitControlNotFound)
}
