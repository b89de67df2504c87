//! New Mexico Gas, billed through a Paymentus customer portal.

use super::login::{log_in, CredentialField, LoginForm};
use super::strategy::{extract_first, ExtractionStrategy, Timing};
use super::BillProvider;
use crate::browser::{Locator, Page};
use crate::error::ProviderError;
use async_trait::async_trait;
use rust_decimal::Decimal;

const PORTAL_URL: &str = "https://ipn4.paymentus.com/cp/nmg";

const LOGIN_FORM: LoginForm = LoginForm {
    identifier: CredentialField {
        label: "identifier",
        locator: Locator::Css("input[name=\"loginId\"]"),
    },
    secret: CredentialField {
        label: "secret",
        locator: Locator::Css("input[name=\"password\"]"),
    },
    submit: &[Locator::Css("button[type=\"submit\"], input[type=\"submit\"]")],
    error_banner: None,
    settle_before_fill: false,
    settle_after_submit: false,
};

const BALANCE_STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy::text(Locator::Css(".balance-amount")),
    ExtractionStrategy::text(Locator::Css(".current-balance")),
    ExtractionStrategy::text(Locator::Css("[data-testid=\"balance\"]")),
    // any leaf element whose text starts with a dollar amount
    ExtractionStrategy::text(Locator::XPath(
        "//*[not(*) and starts-with(normalize-space(.), '$') and translate(substring(normalize-space(.), 2, 1), '0123456789', '') = '']",
    )),
];

pub struct GasProvider;

#[async_trait]
impl BillProvider for GasProvider {
    fn display_name(&self) -> &str {
        "New Mexico Gas (NMG)"
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
        extract_first(page, BALANCE_STRATEGIES, timing.element_wait).await
    }
}
