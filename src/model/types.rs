use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Login details for one provider portal.
///
/// `name` is the symbolic key resolved against the provider registry.
#[derive(Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Largest amount accepted for a single bill, scraped or fixed.
///
/// Keeps the household total far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// A fixed recurring charge that is added to the total without scraping.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StaticBill {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Number of people sharing the bills. Always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HouseholdSize(NonZeroU32);

impl HouseholdSize {
    pub fn new(size: i64) -> Result<Self, ConfigError> {
        u32::try_from(size)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(ConfigError::InvalidHouseholdSize(size))
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for HouseholdSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated, read-only input for one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub providers: Vec<ProviderConfig>,
    pub static_bills: Vec<StaticBill>,
    pub household_size: HouseholdSize,
}

/// Outcome of scraping one recognized provider.
///
/// Only [`BillResult::succeeded`] and [`BillResult::failed`] build values, so
/// `error` is present exactly when the run failed. A provider that genuinely
/// owes nothing yields a zero balance with no error.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BillResult {
    provider: String,
    #[serde(with = "rust_decimal::serde::float")]
    balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BillResult {
    pub fn succeeded(provider: impl Into<String>, balance: Decimal) -> Self {
        Self {
            provider: provider.into(),
            balance: balance.max(Decimal::ZERO),
            error: None,
        }
    }

    pub fn failed(provider: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            provider: provider.into(),
            balance: Decimal::ZERO,
            error: Some(error.to_string()),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals for one run, shared equally across the household.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub per_person: Decimal,
    pub household_size: u32,
}
