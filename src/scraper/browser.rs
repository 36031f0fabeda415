use anyhow::{Context, Result};
use thirtyfour::prelude::*;
use tokio::time::{sleep, Duration};

/// Fixed runtime flags for headless-environment compatibility. Not
/// configurable; the portal is served to a spoofed desktop Chrome.
const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--window-size=1920,1080",
    "--user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
];

/// Thin wrapper around one thirtyfour session. One live browser process
/// per instance; `quit` consumes the wrapper so the process cannot be
/// torn down twice.
pub struct BrowserDriver {
    driver: WebDriver,
}

impl BrowserDriver {
    pub async fn new(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();

        for arg in CHROME_ARGS.iter().copied() {
            caps.add_arg(arg)?;
        }
        if headless {
            caps.add_arg("--headless")?;
        }

        let driver = WebDriver::new(webdriver_url, caps)
            .await
            .with_context(|| format!("failed to connect to WebDriver at {}", webdriver_url))?;

        Ok(Self { driver })
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    pub async fn find_element(&self, selector: By) -> Result<WebElement> {
        self.driver.find(selector).await.context("element not found")
    }

    /// Poll for an element until it appears or the bounded wait elapses.
    pub async fn wait_for_element(&self, selector: By, timeout_secs: u64) -> Result<WebElement> {
        let timeout = Duration::from_secs(timeout_secs);
        let start = std::time::Instant::now();

        loop {
            if let Ok(element) = self.driver.find(selector.clone()).await {
                return Ok(element);
            }

            if start.elapsed() > timeout {
                return Err(anyhow::anyhow!(
                    "timeout after {}s waiting for {:?}",
                    timeout_secs,
                    selector
                ));
            }

            sleep(Duration::from_millis(500)).await;
        }
    }

    pub async fn type_into(&self, element: &WebElement, text: &str) -> Result<()> {
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}
