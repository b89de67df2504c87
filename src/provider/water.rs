//! ABCWUA water, paid through the E-BillExpress guest payment flow.
//!
//! There is no account login: the identifier is the 10-digit account number
//! and the secret is the service zip code. The amount owed is pre-filled into
//! the payment form, so it is read from the input's value rather than text.

use super::login::{log_in, CredentialField, LoginForm};
use super::strategy::{extract_first, ExtractionStrategy, Timing};
use super::BillProvider;
use crate::browser::{Locator, Page};
use crate::error::ProviderError;
use async_trait::async_trait;
use rust_decimal::Decimal;

const PORTAL_URL: &str = "https://www.e-billexpress.com/ebpp/ABCWUA/";

const LOGIN_FORM: LoginForm = LoginForm {
    identifier: CredentialField {
        label: "Account Number",
        locator: Locator::Css("input[name=\"AccountNumber\"]"),
    },
    secret: CredentialField {
        label: "Service Zip Code",
        locator: Locator::Css("input[name=\"PIN\"]"),
    },
    submit: &[
        Locator::Css("button#pay-now-button"),
        Locator::XPath("//button[contains(normalize-space(.), 'One-Time Payment')]"),
    ],
    error_banner: Some(Locator::Css(
        ".alert-danger, .error-message, .field-validation-error",
    )),
    settle_before_fill: true,
    settle_after_submit: true,
};

const BALANCE_STRATEGIES: &[ExtractionStrategy] = &[ExtractionStrategy::input_value(
    Locator::Css("input[name=\"PaymentAmount\"]"),
)];

pub struct WaterProvider;

#[async_trait]
impl BillProvider for WaterProvider {
    fn display_name(&self) -> &str {
        "ABCWUA (Water)"
    }

    fn default_url(&self) -> &str {
        PORTAL_URL
    }

    async fn authenticate(
        &self,
        page: &dyn Page,
        url: &str,
        identifier: &str,
        secret: &str,
        timing: &Timing,
    ) -> Result<(), ProviderError> {
        log_in(page, &LOGIN_FORM, url, identifier, secret, timing).await?;
        Ok(())
    }

    async fn extract_balance(
        &self,
        page: &dyn Page,
        timing: &Timing,
    ) -> Result<Decimal, ProviderError> {
        extract_first(page, BALANCE_STRATEGIES, timing.balance_wait).await
    }
}
