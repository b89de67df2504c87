use crate::error::ConfigError;
use crate::model::{HouseholdSize, ProviderConfig, RunConfig, StaticBill, MAX_AMOUNT};
use crate::provider::{ProviderKind, Timing};
use rust_decimal::Decimal;
use serde_derive::Deserialize;
use std::str::FromStr;
use std::time::Duration;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

/// Which delivery surface to run.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Cli,
    Server,
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    pub config_file: Option<String>,
}

impl AppConfig {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.as_str()).unwrap_or(tracing::Level::INFO)
    }
}

pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    envy::from_env::<AppConfig>().map_err(ConfigError::env_parse)
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36".to_string()
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_locale() -> String {
    "en-US".to_string()
}

/// Session factory settings, including the fingerprint each session presents.
#[derive(Deserialize, Debug, Clone)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_locale")]
    pub locale: String,
}

pub fn load_browser_config() -> Result<BrowserConfig, ConfigError> {
    envy::prefixed("BROWSER_")
        .from_env::<BrowserConfig>()
        .map_err(ConfigError::env_parse)
}

fn default_element_wait_ms() -> u64 {
    5_000
}

fn default_balance_wait_ms() -> u64 {
    10_000
}

fn default_submit_wait_ms() -> u64 {
    2_000
}

fn default_page_load_timeout_ms() -> u64 {
    30_000
}

fn default_settle_ms() -> u64 {
    2_000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_provider_timeout_sec() -> u64 {
    120
}

/// Wait budgets and scheduling for the scrape steps.
#[derive(Deserialize, Debug, Clone)]
pub struct ScraperConfig {
    #[serde(default = "default_element_wait_ms")]
    pub element_wait_ms: u64,
    #[serde(default = "default_balance_wait_ms")]
    pub balance_wait_ms: u64,
    #[serde(default = "default_submit_wait_ms")]
    pub submit_wait_ms: u64,
    #[serde(default = "default_page_load_timeout_ms")]
    pub page_load_timeout_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub navigation_retries: u32,
    #[serde(default = "default_provider_timeout_sec")]
    pub provider_timeout_sec: u64,
    // scrape providers concurrently instead of one after another
    #[serde(default)]
    pub parallel: bool,
}

impl ScraperConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            element_wait: Duration::from_millis(self.element_wait_ms),
            balance_wait: Duration::from_millis(self.balance_wait_ms),
            submit_wait: Duration::from_millis(self.submit_wait_ms),
            page_load_timeout: Duration::from_millis(self.page_load_timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            navigation_retries: self.navigation_retries,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub fn load_scraper_config() -> Result<ScraperConfig, ConfigError> {
    envy::prefixed("SCRAPER_")
        .from_env::<ScraperConfig>()
        .map_err(ConfigError::env_parse)
}

fn default_providers() -> String {
    "nmg,electric,water".to_string()
}

fn default_household_size() -> i64 {
    3
}

#[derive(Deserialize, Debug)]
struct HouseholdEnv {
    #[serde(default = "default_providers")]
    providers: String,
    #[serde(default)]
    static_bills: String,
    #[serde(default = "default_household_size")]
    household_size: i64,
}

#[derive(Deserialize)]
struct ProviderEnv {
    #[serde(default)]
    url: String,
    username: String,
    password: String,
}

/// Household configuration as written in a JSON config file.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RunConfigFile {
    providers: Vec<ProviderConfig>,
    #[serde(default)]
    static_bills: Vec<StaticBill>,
    #[serde(default = "default_household_size")]
    household_size: i64,
}

/// Loads and validates the household configuration.
///
/// Reads `path` as JSON when given, otherwise the process environment.
pub fn load_run_config(path: Option<&str>) -> Result<RunConfig, ConfigError> {
    match path {
        Some(path) => {
            let contents =
                std::fs::read_to_string(path).map_err(|e| ConfigError::file(path, e))?;
            parse_run_config_json(&contents).map_err(|e| match e {
                ConfigError::EnvParse(message) => ConfigError::file(path, message),
                other => other,
            })
        }
        None => load_run_config_from_env(),
    }
}

fn parse_run_config_json(contents: &str) -> Result<RunConfig, ConfigError> {
    let file: RunConfigFile =
        serde_json::from_str(contents).map_err(ConfigError::env_parse)?;
    validate(file.providers, file.static_bills, file.household_size)
}

fn load_run_config_from_env() -> Result<RunConfig, ConfigError> {
    let household = envy::from_env::<HouseholdEnv>().map_err(ConfigError::env_parse)?;

    let mut providers = Vec::new();
    for key in household
        .providers
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
    {
        if let ProviderKind::Unknown(_) = ProviderKind::from_key(key) {
            // no adapter, so no credentials are required; the run skips it
            tracing::warn!(provider = %key, "No adapter registered for provider key");
            providers.push(ProviderConfig {
                name: key.to_string(),
                url: String::new(),
                username: String::new(),
                password: String::new(),
            });
            continue;
        }
        let prefix = format!("PROVIDER_{}_", key.to_uppercase());
        let env = envy::prefixed(prefix.as_str())
            .from_env::<ProviderEnv>()
            .map_err(|e| ConfigError::missing(format!("{}*: {}", prefix, e)))?;
        providers.push(ProviderConfig {
            name: key.to_string(),
            url: env.url,
            username: env.username,
            password: env.password,
        });
    }

    let static_bills = parse_static_bills(&household.static_bills)?;
    validate(providers, static_bills, household.household_size)
}

/// Parses `Label=amount` pairs separated by commas.
fn parse_static_bills(raw: &str) -> Result<Vec<StaticBill>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, amount) = entry.split_once('=').ok_or_else(|| {
                ConfigError::invalid("STATIC_BILLS", format!("expected Label=amount, got '{}'", entry))
            })?;
            let amount = Decimal::from_str(amount.trim())
                .map_err(|e| ConfigError::invalid("STATIC_BILLS", format!("{}: {}", entry, e)))?;
            Ok(StaticBill {
                name: name.trim().to_string(),
                amount,
            })
        })
        .collect()
}

fn validate(
    providers: Vec<ProviderConfig>,
    static_bills: Vec<StaticBill>,
    household_size: i64,
) -> Result<RunConfig, ConfigError> {
    let household_size = HouseholdSize::new(household_size)?;
    if let Some(bill) = static_bills.iter().find(|bill| bill.amount.is_sign_negative()) {
        return Err(ConfigError::invalid(
            "static bill",
            format!("{} has negative amount {}", bill.name, bill.amount),
        ));
    }
    if let Some(bill) = static_bills.iter().find(|bill| bill.amount > MAX_AMOUNT) {
        return Err(ConfigError::invalid(
            "static bill",
            format!("{} amount {} exceeds {}", bill.name, bill.amount, MAX_AMOUNT),
        ));
    }
    Ok(RunConfig {
        providers,
        static_bills,
        household_size,
    })
}
