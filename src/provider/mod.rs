//! Provider contract, site adapters and the registry that maps configuration
//! keys onto them.

pub mod amount;
pub mod electric;
pub mod gas;
pub mod login;
pub mod strategy;
pub mod water;

pub use electric::ElectricProvider;
pub use gas::GasProvider;
pub use strategy::Timing;
pub use water::WaterProvider;

use crate::browser::Page;
use crate::error::ProviderError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A site-specific adapter for one billing portal.
///
/// Implementors are stateless; all per-attempt state lives in the [`Page`].
#[async_trait]
pub trait BillProvider: Send + Sync {
    /// Human-readable name used in results.
    fn display_name(&self) -> &str;

    /// Portal address used when the configuration does not give one.
    fn default_url(&self) -> &str;

    /// Logs into the portal at `url`.
    async fn authenticate(
        &self,
        page: &dyn Page,
        url: &str,
        identifier: &str,
        secret: &str,
        timing: &Timing,
    ) -> Result<(), ProviderError>;

    /// Reads the amount currently owed from an authenticated page.
    async fn extract_balance(&self, page: &dyn Page, timing: &Timing)
        -> Result<Decimal, ProviderError>;
}

/// Symbolic provider key from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gas,
    Electric,
    Water,
    /// A key no adapter exists for; kept so it can be reported.
    Unknown(String),
}

impl ProviderKind {
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "nmg" | "gas" => ProviderKind::Gas,
            "electric" | "pnm" => ProviderKind::Electric,
            "water" | "abcwua" => ProviderKind::Water,
            _ => ProviderKind::Unknown(key.to_string()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderKind::Gas => write!(f, "gas"),
            ProviderKind::Electric => write!(f, "electric"),
            ProviderKind::Water => write!(f, "water"),
            ProviderKind::Unknown(key) => write!(f, "{}", key),
        }
    }
}

/// Maps provider kinds to adapter instances.
#[derive(Clone, Default)]
pub struct Registry {
    providers: HashMap<ProviderKind, Arc<dyn BillProvider>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter.
    pub fn standard() -> Self {
        Self::new()
            .register(ProviderKind::Gas, GasProvider)
            .register(ProviderKind::Electric, ElectricProvider)
            .register(ProviderKind::Water, WaterProvider)
    }

    /// Adds or replaces the adapter for `kind`. Unknown kinds are never registered.
    pub fn register(mut self, kind: ProviderKind, provider: impl BillProvider + 'static) -> Self {
        if let ProviderKind::Unknown(key) = &kind {
            tracing::warn!(%key, "Refusing to register adapter under an unknown key");
            return self;
        }
        self.providers.insert(kind, Arc::new(provider));
        self
    }

    /// Finds the adapter for `kind`; `None` means the caller should skip it.
    pub fn lookup(&self, kind: &ProviderKind) -> Option<Arc<dyn BillProvider>> {
        self.providers.get(kind).cloned()
    }
}
