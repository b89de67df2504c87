//! WebDriver-backed sessions.
//!
//! Every call to [`WebDriverSessionFactory::open`] starts a brand new WebDriver
//! session, so cookies and storage never leak between providers.

use super::{Locator, Page, SessionFactory, ValueSource};
use crate::config::BrowserConfig;
use crate::error::BrowserError;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time::{sleep, Instant};

pub struct WebDriverSessionFactory {
    config: BrowserConfig,
    poll_interval: Duration,
}

impl WebDriverSessionFactory {
    pub fn new(config: BrowserConfig, poll_interval: Duration) -> Self {
        Self {
            config,
            poll_interval,
        }
    }

    /// Chrome capabilities carrying the session fingerprint.
    fn capabilities(&self) -> Map<String, Value> {
        let config = &self.config;
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-features=IsolateOrigins,site-per-process".to_string(),
            format!("--window-size={},{}", config.window_width, config.window_height),
            format!("--lang={}", config.locale),
            format!("--user-agent={}", config.user_agent),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "excludeSwitches": ["enable-automation"],
                "useAutomationExtension": false,
                "prefs": { "intl.accept_languages": config.locale },
            }),
        );
        caps
    }
}

#[async_trait]
impl SessionFactory for WebDriverSessionFactory {
    async fn open(&self) -> Result<Box<dyn Page>, BrowserError> {
        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|e| BrowserError::SessionStart(e.to_string()))?;
        tracing::debug!(webdriver = %self.config.webdriver_url, "Opened browser session");

        Ok(Box::new(WebDriverPage {
            client,
            poll_interval: self.poll_interval,
        }))
    }
}

pub struct WebDriverPage {
    client: Client,
    poll_interval: Duration,
}

impl WebDriverPage {
    async fn first(&self, locator: &Locator) -> Result<Option<Element>, BrowserError> {
        let found = self
            .client
            .find_all(to_webdriver(locator))
            .await
            .map_err(|e| BrowserError::command(format!("find {}", locator), e))?;
        Ok(found.into_iter().next())
    }

    async fn require(&self, locator: &Locator) -> Result<Element, BrowserError> {
        self.first(locator).await?.ok_or_else(|| {
            BrowserError::command(format!("find {}", locator), "no matching element")
        })
    }
}

fn to_webdriver(locator: &Locator) -> fantoccini::Locator<'static> {
    match *locator {
        Locator::Css(css) => fantoccini::Locator::Css(css),
        Locator::XPath(xpath) => fantoccini::Locator::XPath(xpath),
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| BrowserError::command("goto", e))
    }

    async fn wait_until_loaded(&self, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self
                .client
                .execute("return document.readyState", vec![])
                .await
                .map_err(|e| BrowserError::command("readyState", e))?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::timeout("page load", timeout));
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn is_visible_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.first(locator).await? {
                match element.is_displayed().await {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    // element went stale between lookup and check
                    Err(e) => tracing::trace!(%locator, error = %e, "Visibility check failed"),
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        let element = self.require(locator).await?;
        element
            .clear()
            .await
            .map_err(|e| BrowserError::command("clear", e))?;
        element
            .send_keys(value)
            .await
            .map_err(|e| BrowserError::command("send_keys", e))
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.require(locator)
            .await?
            .click()
            .await
            .map_err(|e| BrowserError::command("click", e))
    }

    async fn read(
        &self,
        locator: &Locator,
        source: ValueSource,
    ) -> Result<Option<String>, BrowserError> {
        let Some(element) = self.first(locator).await? else {
            return Ok(None);
        };
        let value = match source {
            ValueSource::Text => Some(element.text().await),
            ValueSource::InputValue => element.prop("value").await.transpose(),
        };
        value
            .transpose()
            .map_err(|e| BrowserError::command("read", e))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.client
            .close()
            .await
            .map_err(|e| BrowserError::command("close", e))
    }
}
