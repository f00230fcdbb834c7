use std::time::{Duration, Instant};

use async_trait::async_trait;
use thirtyfour::{error::WebDriverResult, prelude::*};

use crate::{domain::html_to_text, services::Renderer};

const SCROLL_STEP_PX: u32 = 800;
const SCROLL_INTERVAL: Duration = Duration::from_millis(200);
const MAX_SCROLL_STEPS: usize = 40;
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Renders pages in a fresh headless chrome session per url.
pub struct Droid {
    webdriver_url: String,
    timeout: Duration,
}

impl Droid {
    /// Probes the webdriver once. `None` means rendering is unavailable for this run.
    pub async fn detect(webdriver_url: &str, timeout: Duration) -> Option<Self> {
        let droid = Droid {
            webdriver_url: webdriver_url.to_string(),
            timeout,
        };

        match droid.new_driver().await {
            Ok(driver) => {
                if let Err(e) = driver.quit().await {
                    log::warn!("Failed to close probe session: {:?}", e);
                }
                log::info!("Rendered fetches enabled via {}", webdriver_url);
                Some(droid)
            }
            Err(e) => {
                log::warn!(
                    "Webdriver at {} unavailable, rendered fetches disabled: {:?}",
                    webdriver_url,
                    e
                );
                None
            }
        }
    }

    async fn new_driver(&self) -> WebDriverResult<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless=new")?;
        caps.add_arg("--ignore-certificate-errors")?;
        caps.add_arg("--incognito")?;

        let driver = WebDriver::new(&self.webdriver_url, caps).await?;
        driver.set_page_load_timeout(self.timeout).await?;
        driver.set_script_timeout(self.timeout).await?;

        Ok(driver)
    }

    async fn capture(&self, driver: &WebDriver, url: &str) -> WebDriverResult<String> {
        driver.goto(url).await?;
        self.wait_until_ready(driver).await;
        auto_scroll(driver).await;

        driver.source().await
    }

    /// Waits for `document.readyState == "complete"`, then lets pending requests settle.
    async fn wait_until_ready(&self, driver: &WebDriver) {
        let start = Instant::now();

        while start.elapsed() < self.timeout {
            match driver.execute("return document.readyState;", vec![]).await {
                Ok(ret) if ret.json().as_str() == Some("complete") => break,
                Ok(_) => {}
                Err(e) => log::debug!("Failed to check readyState: {:?}", e),
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }

        tokio::time::sleep(SETTLE_DELAY).await;
    }
}

/// Scrolls until the page stops moving, to trigger lazy-loaded content.
async fn auto_scroll(driver: &WebDriver) {
    let script = format!(
        "window.scrollBy(0, {}); return window.scrollY;",
        SCROLL_STEP_PX
    );
    let mut last_position = -1.0;

    for _ in 0..MAX_SCROLL_STEPS {
        let position = match driver.execute(&script, vec![]).await {
            Ok(ret) => ret.json().as_f64().unwrap_or(0.0),
            Err(e) => {
                log::debug!("Scroll script failed: {:?}", e);
                return;
            }
        };
        if position <= last_position {
            return;
        }
        last_position = position;
        tokio::time::sleep(SCROLL_INTERVAL).await;
    }
}

#[async_trait]
impl Renderer for Droid {
    async fn render(&self, url: &str) -> String {
        let driver = match self.new_driver().await {
            Ok(driver) => driver,
            Err(e) => {
                log::error!("Render session error for {}: {:?}", url, e);
                return "".to_string();
            }
        };

        let page_source = self.capture(&driver, url).await;
        if let Err(e) = driver.quit().await {
            log::warn!("Failed to close render session: {:?}", e);
        }

        match page_source {
            Ok(html_content) => html_to_text(&html_content),
            Err(e) => {
                log::error!("Render fetch error for {}: {:?}", url, e);
                "".to_string()
            }
        }
    }
}
