//! A [`Page`] that serves static HTML snapshots of a portal.
//!
//! CSS locators are evaluated with `scraper`; XPath locators never match, which
//! makes the CSS fallbacks of each adapter reachable in tests. Clicking any
//! visible control swaps the login snapshot for the post-submit snapshot.

use crate::browser::{Locator, Page, SessionFactory, ValueSource};
use crate::error::BrowserError;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct HtmlPage {
    login: String,
    after_submit: String,
    current: Mutex<String>,
    filled: Mutex<HashMap<String, String>>,
}

impl HtmlPage {
    /// Creates a page that shows `login` after navigation and `after_submit` after a click.
    pub fn new(login: &str, after_submit: &str) -> Self {
        Self {
            login: login.to_string(),
            after_submit: after_submit.to_string(),
            current: Mutex::new(login.to_string()),
            filled: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a page that always shows `html`.
    pub fn showing(html: &str) -> Self {
        Self::new(html, html)
    }

    /// Value typed into the field matching `css`, if any.
    pub fn field_value(&self, css: &str) -> Option<String> {
        self.filled.lock().unwrap().get(css).cloned()
    }

    /// Runs `f` against the first element matching a CSS locator.
    fn with_first<R>(
        &self,
        locator: &Locator,
        f: impl FnOnce(ElementRef) -> R,
    ) -> Result<Option<R>, BrowserError> {
        let Locator::Css(css) = *locator else {
            return Ok(None);
        };
        let selector = Selector::parse(css)
            .map_err(|e| BrowserError::command(format!("find {}", locator), e))?;
        let html = self.current.lock().unwrap().clone();
        let document = Html::parse_document(&html);
        let result = document.select(&selector).next().map(f);
        Ok(result)
    }
}

fn is_displayed(element: ElementRef) -> bool {
    let hidden = |el: ElementRef| {
        let value = el.value();
        value.attr("hidden").is_some()
            || value.attr("type") == Some("hidden")
            || value
                .attr("style")
                .map(|style| style.replace(' ', "").contains("display:none"))
                .unwrap_or(false)
    };
    !hidden(element) && !element.ancestors().filter_map(ElementRef::wrap).any(hidden)
}

#[async_trait]
impl Page for HtmlPage {
    async fn goto(&self, _url: &str) -> Result<(), BrowserError> {
        *self.current.lock().unwrap() = self.login.clone();
        Ok(())
    }

    async fn wait_until_loaded(&self, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn is_visible_within(
        &self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        Ok(self.with_first(locator, is_displayed)?.unwrap_or(false))
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        match (self.with_first(locator, |_| ())?, locator) {
            (Some(()), Locator::Css(css)) => {
                self.filled
                    .lock()
                    .unwrap()
                    .insert(css.to_string(), value.to_string());
                Ok(())
            }
            _ => Err(BrowserError::command("fill", "no matching element")),
        }
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        match self.with_first(locator, |_| ())? {
            Some(()) => {
                *self.current.lock().unwrap() = self.after_submit.clone();
                Ok(())
            }
            None => Err(BrowserError::command("click", "no matching element")),
        }
    }

    async fn read(
        &self,
        locator: &Locator,
        source: ValueSource,
    ) -> Result<Option<String>, BrowserError> {
        let value = self.with_first(locator, |element| match source {
            ValueSource::Text => Some(element.text().collect::<String>()),
            ValueSource::InputValue => element.value().attr("value").map(str::to_string),
        })?;
        Ok(value.flatten())
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        Ok(())
    }
}

/// Opens an [`HtmlPage`] per session, choosing snapshots by portal URL.
#[derive(Default)]
pub struct HtmlSessionFactory {
    portals: Vec<(String, &'static str, &'static str)>,
}

impl HtmlSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `login` then `after_submit` for URLs starting with `url_prefix`.
    pub fn with_portal(
        mut self,
        url_prefix: &str,
        login: &'static str,
        after_submit: &'static str,
    ) -> Self {
        self.portals
            .push((url_prefix.to_string(), login, after_submit));
        self
    }
}

#[async_trait]
impl SessionFactory for HtmlSessionFactory {
    async fn open(&self) -> Result<Box<dyn Page>, BrowserError> {
        Ok(Box::new(RoutedHtmlPage {
            portals: self.portals.clone(),
            page: Mutex::new(None),
        }))
    }
}

/// Picks the matching snapshot pair on first navigation.
struct RoutedHtmlPage {
    portals: Vec<(String, &'static str, &'static str)>,
    page: Mutex<Option<Arc<HtmlPage>>>,
}

impl RoutedHtmlPage {
    fn current(&self) -> Result<Arc<HtmlPage>, BrowserError> {
        self.page
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BrowserError::command("find", "no page loaded"))
    }
}

#[async_trait]
impl Page for RoutedHtmlPage {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let (_, login, after_submit) = self
            .portals
            .iter()
            .find(|(prefix, _, _)| url.starts_with(prefix.as_str()))
            .ok_or_else(|| BrowserError::command("goto", format!("net::ERR_NAME_NOT_RESOLVED {}", url)))?;
        let page = Arc::new(HtmlPage::new(login, after_submit));
        page.goto(url).await?;
        *self.page.lock().unwrap() = Some(page);
        Ok(())
    }

    async fn wait_until_loaded(&self, timeout: Duration) -> Result<(), BrowserError> {
        self.current()?.wait_until_loaded(timeout).await
    }

    async fn is_visible_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, BrowserError> {
        self.current()?.is_visible_within(locator, timeout).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        self.current()?.fill(locator, value).await
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.current()?.click(locator).await
    }

    async fn read(
        &self,
        locator: &Locator,
        source: ValueSource,
    ) -> Result<Option<String>, BrowserError> {
        self.current()?.read(locator, source).await
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hidden_elements_are_not_visible() {
        let page = HtmlPage::showing(
            r#"<div style="display: none"><span class="a">x</span></div>
               <input class="b" type="hidden" value="1">
               <span class="c">shown</span>"#,
        );
        let wait = Duration::ZERO;

        assert!(!page.is_visible_within(&Locator::Css(".a"), wait).await.unwrap());
        assert!(!page.is_visible_within(&Locator::Css(".b"), wait).await.unwrap());
        assert!(page.is_visible_within(&Locator::Css(".c"), wait).await.unwrap());
        assert!(!page.is_visible_within(&Locator::XPath("//span"), wait).await.unwrap());
    }

    #[tokio::test]
    async fn test_click_moves_to_next_snapshot() {
        let page = HtmlPage::new("<button>Go</button>", "<p class=\"done\">ok</p>");
        page.click(&Locator::Css("button")).await.unwrap();

        let text = page
            .read(&Locator::Css(".done"), ValueSource::Text)
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("ok"));
    }
}
