//! Mock implementations of BillProvider for testing.

use crate::browser::Page;
use crate::error::ProviderError;
use crate::provider::{BillProvider, Timing};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

enum Behavior {
    Balance(Decimal),
    FailAuthentication(Box<dyn Fn() -> ProviderError + Send + Sync>),
    FailExtraction(Box<dyn Fn() -> ProviderError + Send + Sync>),
    Panic,
    Hang,
}

/// A provider that skips the browser and returns a scripted outcome.
pub struct MockProvider {
    name: String,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn new(name: impl Into<String>, behavior: Behavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a provider that authenticates and reports `balance`.
    pub fn with_balance(name: impl Into<String>, balance: Decimal) -> Self {
        Self::new(name, Behavior::Balance(balance))
    }

    /// Creates a provider whose authentication fails with the built error.
    pub fn failing_authentication<F>(name: impl Into<String>, error: F) -> Self
    where
        F: Fn() -> ProviderError + Send + Sync + 'static,
    {
        Self::new(name, Behavior::FailAuthentication(Box::new(error)))
    }

    /// Creates a provider whose balance extraction fails with the built error.
    pub fn failing_extraction<F>(name: impl Into<String>, error: F) -> Self
    where
        F: Fn() -> ProviderError + Send + Sync + 'static,
    {
        Self::new(name, Behavior::FailExtraction(Box::new(error)))
    }

    /// Creates a provider that panics while authenticating.
    pub fn panicking(name: impl Into<String>) -> Self {
        Self::new(name, Behavior::Panic)
    }

    /// Creates a provider that never finishes authenticating.
    pub fn hanging(name: impl Into<String>) -> Self {
        Self::new(name, Behavior::Hang)
    }

    /// Shared counter of authenticate calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl BillProvider for MockProvider {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn default_url(&self) -> &str {
        "https://portal.test/login"
    }

    async fn authenticate(
        &self,
        page: &dyn Page,
        url: &str,
        _identifier: &str,
        _secret: &str,
        _timing: &Timing,
    ) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        page.goto(url).await?;
        match &self.behavior {
            Behavior::FailAuthentication(error) => Err(error()),
            Behavior::Panic => panic!("{} portal exploded", self.name),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Behavior::Balance(_) | Behavior::FailExtraction(_) => Ok(()),
        }
    }

    async fn extract_balance(
        &self,
        _page: &dyn Page,
        _timing: &Timing,
    ) -> Result<Decimal, ProviderError> {
        match &self.behavior {
            Behavior::Balance(balance) => Ok(*balance),
            Behavior::FailExtraction(error) => Err(error()),
            _ => Err(ProviderError::BalanceNotFound),
        }
    }
}
