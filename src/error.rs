//! Error types for the household bill scraper.
//!
//! Configuration errors are fatal to a whole run and surface before any scraping
//! begins. Everything raised while driving a single provider is a [`ProviderError`],
//! which the orchestrator folds into that provider's `BillResult` instead of
//! propagating it.

use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type that encompasses all application errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic errors that don't fit other categories
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parsing failed
    #[error("failed to parse environment variables: {0}")]
    EnvParse(String),

    /// Required configuration value is missing
    #[error("missing required configuration: {0}")]
    Missing(String),

    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },

    /// Household size must be a positive integer
    #[error("invalid household size {0}: must be greater than zero")]
    InvalidHouseholdSize(i64),

    /// Configuration file could not be read or decoded
    #[error("failed to load configuration file {path}: {message}")]
    File { path: String, message: String },
}

/// Failures of the browsing capability itself.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// A new isolated session could not be opened
    #[error("failed to open browser session: {0}")]
    SessionStart(String),

    /// A single browser command failed
    #[error("browser command '{command}' failed: {message}")]
    Command { command: String, message: String },

    /// A bounded wait ran out
    #[error("timed out after {millis} ms waiting for {what}")]
    Timeout { what: String, millis: u128 },
}

/// Failures of a single provider's authenticate/extract run.
///
/// The `Display` text of each variant is what ends up in `BillResult.error`.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Config referenced a key with no registered adapter
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// Portal never finished loading
    #[error("failed to reach portal {url}: {message}")]
    Navigation { url: String, message: String },

    /// A credential field was missing or not interactable
    #[error("{0} field not found")]
    FieldNotFound(String),

    /// Neither the primary nor any alternative submit control was visible
    #[error("submit control not found")]
    SubmitControlNotFound,

    /// The portal showed an explicit error banner after submission
    #[error("login failed: {0}")]
    AuthenticationFailed(String),

    /// Every extraction strategy was exhausted
    #[error("could not find balance on page")]
    BalanceNotFound,

    /// Matched text was not a usable amount
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Browser command failure during the run
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The whole provider run exceeded its deadline
    #[error("provider run timed out after {millis} ms")]
    Timeout { millis: u128 },

    /// The provider run panicked
    #[error("provider run aborted: {0}")]
    Aborted(String),
}

/// Amount parsing errors.
#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    /// No numeric substring in the input
    #[error("no amount found in '{0}'")]
    NoAmount(String),

    /// Signed amounts (credits) are not supported
    #[error("negative or credit amount '{0}' is not supported")]
    Negative(String),

    /// Amount above the accepted ceiling
    #[error("amount '{0}' exceeds the accepted maximum")]
    TooLarge(String),

    /// Numeric substring did not fit a decimal
    #[error("failed to parse amount from '{text}': {message}")]
    Invalid { text: String, message: String },
}

impl ConfigError {
    /// Creates a new environment parse error.
    pub fn env_parse(err: impl std::fmt::Display) -> Self {
        Self::EnvParse(err.to_string())
    }

    /// Creates a new missing configuration error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::File {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl BrowserError {
    /// Creates a command error for the named browser operation.
    pub fn command(command: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Command {
            command: command.into(),
            message: err.to_string(),
        }
    }

    pub fn timeout(what: impl Into<String>, duration: std::time::Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            millis: duration.as_millis(),
        }
    }
}

impl ProviderError {
    /// Creates a field not found error naming the missing field.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound(field.into())
    }

    /// Creates a navigation error for the given portal.
    pub fn navigation(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: err.to_string(),
        }
    }

    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout {
            millis: duration.as_millis(),
        }
    }

    /// Creates an authentication error carrying the banner text.
    pub fn authentication_failed(banner: impl AsRef<str>) -> Self {
        Self::AuthenticationFailed(banner.as_ref().trim().to_string())
    }
}

impl ParseError {
    /// Creates an invalid amount error.
    pub fn invalid(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Invalid {
            text: text.into(),
            message: err.to_string(),
        }
    }
}
