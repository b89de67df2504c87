//! The browsing capability the scraping core drives.
//!
//! Providers only ever see a [`Page`]: navigate, fill, click, wait and read.
//! How a session is launched, fingerprinted or timed is owned by the
//! [`SessionFactory`] implementation.

pub mod webdriver;

pub use webdriver::WebDriverSessionFactory;

use crate::error::BrowserError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// How to find an element on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(&'static str),
    XPath(&'static str),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "css={}", css),
            Locator::XPath(xpath) => write!(f, "xpath={}", xpath),
        }
    }
}

/// Which value of a resolved element to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Rendered text content
    Text,
    /// Current value of a form control
    InputValue,
}

/// An isolated browsing context used for exactly one provider attempt.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigates to `url`.
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Waits until the current document has finished loading.
    async fn wait_until_loaded(&self, timeout: Duration) -> Result<(), BrowserError>;

    /// Returns true once the first element matching `locator` is visible,
    /// false if that does not happen within `timeout`.
    async fn is_visible_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, BrowserError>;

    /// Replaces the value of the first matching form field.
    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError>;

    /// Clicks the first matching element.
    async fn click(&self, locator: &Locator) -> Result<(), BrowserError>;

    /// Reads a value from the first matching element, `None` if nothing matches.
    async fn read(
        &self,
        locator: &Locator,
        source: ValueSource,
    ) -> Result<Option<String>, BrowserError>;

    /// Releases the session.
    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}

/// Produces a fresh, isolated [`Page`] per scrape attempt.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Page>, BrowserError>;
}
