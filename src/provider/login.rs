//! Shared portal login flow.
//!
//! `Start -> NavigatedToPortal -> CredentialsFilled -> SubmitAttempted ->
//! Authenticated | failed`. Each adapter supplies a [`LoginForm`] describing its
//! fields, submit controls and error banner; the flow itself is the same for all.

use super::strategy::{click_first_visible, Timing};
use crate::browser::{Locator, Page, ValueSource};
use crate::error::ProviderError;
use std::time::Duration;
use tokio::time::sleep;

/// A credential input and the name used when it cannot be found.
#[derive(Debug, Clone, Copy)]
pub struct CredentialField {
    pub label: &'static str,
    pub locator: Locator,
}

#[derive(Debug, Clone, Copy)]
pub struct LoginForm {
    pub identifier: CredentialField,
    pub secret: CredentialField,
    /// Primary submit control first, then alternatives in order.
    pub submit: &'static [Locator],
    /// Banner shown by the portal when the credentials are rejected.
    pub error_banner: Option<Locator>,
    pub settle_before_fill: bool,
    pub settle_after_submit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Start,
    NavigatedToPortal,
    CredentialsFilled,
    SubmitAttempted,
    Authenticated,
}

/// Drives `form` on `page` from a blank session to an authenticated one.
pub async fn log_in(
    page: &dyn Page,
    form: &LoginForm,
    url: &str,
    identifier: &str,
    secret: &str,
    timing: &Timing,
) -> Result<LoginState, ProviderError> {
    let mut state = LoginState::Start;
    tracing::debug!(?state, %url, "Starting login");

    navigate(page, url, timing).await?;
    state = advance(state, LoginState::NavigatedToPortal);
    if form.settle_before_fill {
        sleep(timing.settle).await;
    }

    fill_field(page, &form.identifier, identifier, timing.element_wait).await?;
    fill_field(page, &form.secret, secret, timing.element_wait).await?;
    state = advance(state, LoginState::CredentialsFilled);

    click_first_visible(page, form.submit, timing.element_wait, timing.submit_wait).await?;
    state = advance(state, LoginState::SubmitAttempted);

    page.wait_until_loaded(timing.page_load_timeout).await?;
    if form.settle_after_submit {
        sleep(timing.settle).await;
    }

    if let Some(banner) = &form.error_banner {
        if let Some(message) = read_banner(page, banner).await {
            tracing::warn!(%message, "Portal rejected login");
            return Err(ProviderError::authentication_failed(message));
        }
    }

    Ok(advance(state, LoginState::Authenticated))
}

fn advance(from: LoginState, to: LoginState) -> LoginState {
    tracing::debug!(?from, ?to, "Login state");
    to
}

/// Loads `url`, retrying up to `timing.navigation_retries` extra times.
async fn navigate(page: &dyn Page, url: &str, timing: &Timing) -> Result<(), ProviderError> {
    let mut attempt = 0;
    loop {
        let result = match page.goto(url).await {
            Ok(()) => page.wait_until_loaded(timing.page_load_timeout).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => return Ok(()),
            Err(e) if attempt < timing.navigation_retries => {
                attempt += 1;
                tracing::warn!(%url, attempt, error = %e, "Navigation failed, retrying");
            }
            Err(e) => return Err(ProviderError::navigation(url, e)),
        }
    }
}

async fn fill_field(
    page: &dyn Page,
    field: &CredentialField,
    value: &str,
    wait: Duration,
) -> Result<(), ProviderError> {
    let visible = page
        .is_visible_within(&field.locator, wait)
        .await
        .unwrap_or(false);
    if !visible {
        return Err(ProviderError::field_not_found(field.label));
    }
    page.fill(&field.locator, value).await.map_err(|e| {
        tracing::debug!(field = field.label, error = %e, "Field not interactable");
        ProviderError::field_not_found(field.label)
    })
}

/// Returns the banner text when an error banner is showing.
async fn read_banner(page: &dyn Page, banner: &Locator) -> Option<String> {
    if !page
        .is_visible_within(banner, Duration::ZERO)
        .await
        .unwrap_or(false)
    {
        return None;
    }
    page.read(banner, ValueSource::Text)
        .await
        .ok()
        .flatten()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
