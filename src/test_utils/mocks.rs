//! Scripted browser doubles.
//!
//! [`MockPage`] answers locator queries from a fixed table and records every
//! interaction. [`MockSessionFactory`] hands out such pages and counts how many
//! sessions were opened and closed.

pub mod providers;

use crate::browser::{Locator, Page, SessionFactory, ValueSource};
use crate::error::BrowserError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Re-export provider mocks for convenience
pub use providers::*;

#[derive(Debug, Clone, Default)]
struct MockElement {
    visible: bool,
    text: Option<String>,
    value: Option<String>,
}

/// A page whose elements are declared up front.
#[derive(Default)]
pub struct MockPage {
    elements: HashMap<Locator, MockElement>,
    broken: HashSet<Locator>,
    navigation_failures: AtomicU32,
    visited: Mutex<Vec<String>>,
    filled: Mutex<Vec<(Locator, String)>>,
    clicked: Mutex<Vec<Locator>>,
    closed: Option<Arc<AtomicUsize>>,
    stall_close: bool,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_element(mut self, locator: Locator, element: MockElement) -> Self {
        self.elements.insert(locator, element);
        self
    }

    /// Adds a visible element with the given text content.
    pub fn with_visible_text(self, locator: Locator, text: &str) -> Self {
        self.with_element(
            locator,
            MockElement {
                visible: true,
                text: Some(text.to_string()),
                value: None,
            },
        )
    }

    /// Adds an element that exists but never becomes visible.
    pub fn with_hidden_text(self, locator: Locator, text: &str) -> Self {
        self.with_element(
            locator,
            MockElement {
                visible: false,
                text: Some(text.to_string()),
                value: None,
            },
        )
    }

    /// Adds a visible form input holding `value`.
    pub fn with_visible_input(self, locator: Locator, value: &str) -> Self {
        self.with_element(
            locator,
            MockElement {
                visible: true,
                text: None,
                value: Some(value.to_string()),
            },
        )
    }

    /// Adds a visible, empty control such as a field or button.
    pub fn with_visible_control(self, locator: Locator) -> Self {
        self.with_element(
            locator,
            MockElement {
                visible: true,
                ..Default::default()
            },
        )
    }

    /// Makes every lookup of `locator` fail with a browser error.
    pub fn with_broken_locator(mut self, locator: Locator) -> Self {
        self.broken.insert(locator);
        self
    }

    /// Makes the next `count` navigations fail.
    pub fn failing_navigations(self, count: u32) -> Self {
        self.navigation_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Increments `counter` when the page is closed.
    pub fn with_close_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.closed = Some(counter);
        self
    }

    /// Makes `close` never resolve.
    pub fn stalling_close(mut self) -> Self {
        self.stall_close = true;
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn filled(&self) -> Vec<(Locator, String)> {
        self.filled.lock().unwrap().clone()
    }

    pub fn clicked(&self) -> Vec<Locator> {
        self.clicked.lock().unwrap().clone()
    }

    fn lookup(&self, locator: &Locator) -> Result<Option<&MockElement>, BrowserError> {
        if self.broken.contains(locator) {
            return Err(BrowserError::command(
                format!("find {}", locator),
                "invalid selector",
            ));
        }
        Ok(self.elements.get(locator))
    }
}

#[async_trait]
impl Page for MockPage {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.visited.lock().unwrap().push(url.to_string());
        let remaining = self.navigation_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.navigation_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(BrowserError::command("goto", "net::ERR_CONNECTION_RESET"));
        }
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
        Ok(self.lookup(locator)?.is_some_and(|element| element.visible))
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        self.lookup(locator)?
            .ok_or_else(|| BrowserError::command("fill", "no matching element"))?;
        self.filled
            .lock()
            .unwrap()
            .push((*locator, value.to_string()));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        self.lookup(locator)?
            .ok_or_else(|| BrowserError::command("click", "no matching element"))?;
        self.clicked.lock().unwrap().push(*locator);
        Ok(())
    }

    async fn read(
        &self,
        locator: &Locator,
        source: ValueSource,
    ) -> Result<Option<String>, BrowserError> {
        Ok(self.lookup(locator)?.and_then(|element| match source {
            ValueSource::Text => element.text.clone(),
            ValueSource::InputValue => element.value.clone(),
        }))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        if self.stall_close {
            std::future::pending::<()>().await;
        }
        if let Some(counter) = &self.closed {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Hands out a fresh [`MockPage`] per session and tracks their lifecycle.
pub struct MockSessionFactory {
    make_page: Box<dyn Fn() -> MockPage + Send + Sync>,
    fail_open: bool,
    stall_open: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MockSessionFactory {
    /// Creates a factory whose sessions are built by `make_page`.
    pub fn new<F>(make_page: F) -> Self
    where
        F: Fn() -> MockPage + Send + Sync + 'static,
    {
        Self {
            make_page: Box::new(make_page),
            fail_open: false,
            stall_open: false,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a factory handing out empty pages.
    pub fn blank() -> Self {
        Self::new(MockPage::new)
    }

    /// Creates a factory that cannot open sessions.
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::blank()
        }
    }

    /// Creates a factory whose `open` never resolves.
    pub fn stalled() -> Self {
        Self {
            stall_open: true,
            ..Self::blank()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self) -> Result<Box<dyn Page>, BrowserError> {
        if self.stall_open {
            std::future::pending::<()>().await;
        }
        if self.fail_open {
            return Err(BrowserError::SessionStart(
                "connection refused".to_string(),
            ));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let page = (self.make_page)().with_close_counter(Arc::clone(&self.closed));
        Ok(Box::new(page))
    }
}
