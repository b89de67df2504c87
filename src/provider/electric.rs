//! PNM electric, behind an Auth0-hosted login page.

use super::login::{log_in, CredentialField, LoginForm};
use super::strategy::{extract_first, ExtractionStrategy, Timing};
use super::BillProvider;
use crate::browser::{Locator, Page};
use crate::error::ProviderError;
use async_trait::async_trait;
use rust_decimal::Decimal;

const PORTAL_URL: &str = "https://login.pnm.com/u/login";

const LOGIN_FORM: LoginForm = LoginForm {
    identifier: CredentialField {
        label: "identifier",
        locator: Locator::Css("input[name=\"username\"]"),
    },
    secret: CredentialField {
        label: "secret",
        locator: Locator::Css("input[name=\"password\"]"),
    },
    submit: &[
        Locator::Css("button[data-action-button-primary=\"true\"]"),
        Locator::Css("button[name=\"action\"][value=\"default\"]"),
        Locator::XPath("//button[@type='submit' and contains(normalize-space(.), 'Log In')]"),
        Locator::XPath("//*[normalize-space(text())='Log In']"),
    ],
    error_banner: None,
    settle_before_fill: false,
    // dashboard keeps rendering after the load event
    settle_after_submit: true,
};

const BALANCE_STRATEGIES: &[ExtractionStrategy] = &[
    // <div class="text-secondary"><span class="amttxt">Amount Due</span> <span>$89.35</span></div>
    ExtractionStrategy::text(Locator::XPath(
        "//div[contains(concat(' ', normalize-space(@class), ' '), ' text-secondary ')]\
         //span[contains(concat(' ', normalize-space(@class), ' '), ' amttxt ') and contains(., 'Amount Due')]\
         /following-sibling::span[1]",
    )),
    ExtractionStrategy::text(Locator::Css("div.text-secondary span.amttxt + span")),
];

pub struct ElectricProvider;

#[async_trait]
impl BillProvider for ElectricProvider {
    fn display_name(&self) -> &str {
        "PNM (Electric)"
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
