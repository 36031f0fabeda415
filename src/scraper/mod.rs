pub mod browser;
pub mod extractor;

use thirtyfour::prelude::*;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::config::{self, portal};
use crate::error::ScrapeError;
use crate::models::{AuthOutcome, Credentials, RecordSet};
use browser::BrowserDriver;
use extractor::TableExtractor;

/// Owns one browser automation session end-to-end.
///
/// The session is exclusively owned by the request flow that opened it
/// and is released through `close` on every exit path. `close` is
/// idempotent; the orchestration functions below are the single
/// finalization point.
pub struct SessionDriver {
    browser: Option<BrowserDriver>,
}

impl SessionDriver {
    /// Starts one browser process against the configured WebDriver
    /// endpoint. Failure here is terminal for the whole call.
    pub async fn open(headless: bool) -> Result<Self, ScrapeError> {
        let url = config::webdriver_url();
        let browser = BrowserDriver::new(&url, headless)
            .await
            .map_err(|e| ScrapeError::DriverInit(chain_message(&e)))?;

        info!("browser session started (headless={})", headless);
        Ok(Self {
            browser: Some(browser),
        })
    }

    /// Drives the login form and answers whether the session is now
    /// authenticated.
    ///
    /// Only the first field lookup can fail the call; every later
    /// navigation or element error is reduced to `Rejected`. The verdict
    /// comes from the post-submit URL alone, never from page content.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, ScrapeError> {
        let browser = self.browser()?;

        info!("navigating to login page");
        if let Err(e) = browser.navigate(portal::LOGIN_URL).await {
            error!("login navigation failed: {}", e);
            return Ok(AuthOutcome::Rejected);
        }

        let username_field = browser
            .wait_for_element(By::Name(portal::USERNAME_FIELD), portal::ELEMENT_TIMEOUT_SECS)
            .await
            .map_err(|e| ScrapeError::ElementNotFound(format!("username field: {}", chain_message(&e))))?;

        if let Err(e) = self.fill_and_submit(browser, &username_field, credentials).await {
            error!("login sequence failed: {}", e);
            return Ok(AuthOutcome::Rejected);
        }

        // fixed settle interval for the client-side redirect; no polling
        sleep(Duration::from_secs(portal::SETTLE_INTERVAL_SECS)).await;

        let current_url = match browser.current_url().await {
            Ok(url) => url,
            Err(e) => {
                error!("could not read post-submit URL: {}", e);
                return Ok(AuthOutcome::Rejected);
            }
        };

        let outcome = auth_outcome_from_url(&current_url);
        match outcome {
            AuthOutcome::Authenticated => info!("login successful"),
            _ => warn!("login rejected, still on login page"),
        }
        Ok(outcome)
    }

    async fn fill_and_submit(
        &self,
        browser: &BrowserDriver,
        username_field: &thirtyfour::WebElement,
        credentials: &Credentials,
    ) -> anyhow::Result<()> {
        browser.type_into(username_field, &credentials.username).await?;

        // assumed present once the username field resolved; no bounded wait
        let password_field = browser.find_element(By::Name(portal::PASSWORD_FIELD)).await?;
        browser.type_into(&password_field, &credentials.password).await?;

        let submit = browser
            .find_element(By::XPath(portal::SUBMIT_BUTTON_XPATH))
            .await?;
        submit.click().await?;
        Ok(())
    }

    /// Extracts the result table. Requires a positive authentication
    /// verdict first; failures degrade to an empty record set.
    pub async fn extract(&self) -> Result<RecordSet, ScrapeError> {
        let browser = self.browser()?;
        Ok(TableExtractor::new(browser).extract().await)
    }

    /// Tears down the browser process. Safe to call when already closed.
    pub async fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            if let Err(e) = browser.quit().await {
                error!("failed to quit browser session: {}", e);
            } else {
                info!("browser session closed");
            }
        }
    }

    fn browser(&self) -> Result<&BrowserDriver, ScrapeError> {
        self.browser.as_ref().ok_or(ScrapeError::SessionClosed)
    }
}

/// Renders an error with its full cause chain, so boundary messages keep
/// the underlying WebDriver failure and not just the outermost context.
pub(crate) fn chain_message(e: &anyhow::Error) -> String {
    format!("{:#}", e)
}

/// URL heuristic: still on the login page means rejected, anywhere else
/// means authenticated. Deliberately binary; no third verdict.
fn auth_outcome_from_url(url: &str) -> AuthOutcome {
    if url.contains(portal::LOGIN_MARKER) {
        AuthOutcome::Rejected
    } else {
        AuthOutcome::Authenticated
    }
}

/// Full flow for one request: open, login, extract when authenticated,
/// and always close the session before returning.
pub async fn run_extraction(
    credentials: &Credentials,
    headless: bool,
) -> Result<RecordSet, ScrapeError> {
    let mut driver = SessionDriver::open(headless).await?;

    let result = async {
        match driver.login(credentials).await? {
            AuthOutcome::Authenticated => driver.extract().await,
            _ => Err(ScrapeError::AuthenticationFailed),
        }
    }
    .await;

    driver.close().await;
    result
}

/// Headless login-only probe used by the test-login endpoint.
pub async fn verify_login(credentials: &Credentials) -> Result<AuthOutcome, ScrapeError> {
    let mut driver = SessionDriver::open(true).await?;
    let result = driver.login(credentials).await;
    driver.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_still_on_login_page_is_rejected() {
        assert_eq!(
            auth_outcome_from_url("https://sol.lideraviacao.com.br/Login?expired=True"),
            AuthOutcome::Rejected
        );
    }

    #[test]
    fn url_away_from_login_page_is_authenticated() {
        assert_eq!(
            auth_outcome_from_url(
                "https://sol.lideraviacao.com.br/AcompanhamentoCliente/AcompanhamentoCliente"
            ),
            AuthOutcome::Authenticated
        );
    }

    #[test]
    fn marker_check_is_case_sensitive() {
        // lowercase "login" elsewhere in the URL is not the login page
        assert_eq!(
            auth_outcome_from_url("https://sol.lideraviacao.com.br/home?from=login"),
            AuthOutcome::Authenticated
        );
    }

    fn closed_session() -> SessionDriver {
        SessionDriver { browser: None }
    }

    #[tokio::test]
    async fn close_is_idempotent_when_already_closed() {
        let mut driver = closed_session();
        driver.close().await;
        driver.close().await;
        assert!(matches!(driver.browser(), Err(ScrapeError::SessionClosed)));
    }

    #[tokio::test]
    async fn closed_session_errors_instead_of_panicking() {
        let driver = closed_session();
        let credentials = Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        };

        assert!(matches!(
            driver.login(&credentials).await,
            Err(ScrapeError::SessionClosed)
        ));
        assert!(matches!(driver.extract().await, Err(ScrapeError::SessionClosed)));
    }

    #[test]
    fn chain_message_keeps_the_cause_chain() {
        use anyhow::Context;

        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let error = inner
            .context("failed to connect to WebDriver at http://localhost:9515")
            .unwrap_err();

        let message = chain_message(&error);
        assert!(message.contains("failed to connect to WebDriver"));
        assert!(message.contains("connection refused"));
    }
}
