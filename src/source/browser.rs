//! Headless Chromium page source.
//!
//! Renders a mirror timeline in a real browser, because the "load more"
//! cursor and the stat counters are only reliable after the page scripts run.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::{PageSource, PageSourceError};
use crate::constants::{TIMELINE_ITEM_SELECTOR, USER_AGENT, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::markup::parse_timeline;
use crate::models::RawRecord;

/// Interval between readiness checks while waiting for timeline items.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Finds the "Load more" anchor, scrolls it into view and clicks it.
const LOAD_MORE_SCRIPT: &str = r"(() => {
    const link = Array.from(document.querySelectorAll('a'))
        .find((a) => a.textContent.includes('Load more'));
    if (!link) {
        return false;
    }
    link.scrollIntoView();
    link.click();
    return true;
})()";

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight); true";

/// Browser session settings.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Path to Chrome/Chromium executable (None for auto-detection).
    pub chrome_path: Option<String>,
    pub headless: bool,
    /// Bounded wait for timeline items to appear.
    pub page_timeout: Duration,
    /// Settle time after the first navigation.
    pub initial_load_delay: Duration,
    /// Settle time after each advance.
    pub advance_delay: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            page_timeout: Duration::from_secs(10),
            initial_load_delay: Duration::from_secs(5),
            advance_delay: Duration::from_secs(3),
        }
    }
}

fn browser_err(e: impl std::fmt::Display) -> PageSourceError {
    PageSourceError::Browser(e.to_string())
}

/// Page source backed by a single Chromium tab.
pub struct ChromiumPageSource {
    options: BrowserOptions,
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl ChromiumPageSource {
    /// Launch a browser and open `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be launched or the page cannot
    /// be opened.
    pub async fn open(options: BrowserOptions, url: &str) -> Result<Self, PageSourceError> {
        info!(url = %url, headless = options.headless, "Launching browser");

        let mut builder = BrowserConfig::builder()
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .request_timeout(options.page_timeout)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg(format!("--window-size={WINDOW_WIDTH},{WINDOW_HEIGHT}"))
            .arg(format!("--user-agent={USER_AGENT}"));

        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(ref chrome_path) = options.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        let config = builder
            .build()
            .map_err(|e| browser_err(format!("Failed to build browser config: {e}")))?;

        let (mut browser, mut handler) = Browser::launch(config).await.map_err(browser_err)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        let page = match browser.new_page(url).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(browser_err(e));
            }
        };

        if let Err(e) = page.wait_for_navigation().await {
            warn!(url = %url, error = %e, "Initial navigation did not settle");
        }
        tokio::time::sleep(options.initial_load_delay).await;

        Ok(Self {
            options,
            browser,
            handler,
            page,
        })
    }

    async fn wait_for_timeline(&self) -> Result<(), PageSourceError> {
        let deadline = Instant::now() + self.options.page_timeout;
        loop {
            match self.page.find_elements(TIMELINE_ITEM_SELECTOR).await {
                Ok(items) if !items.is_empty() => return Ok(()),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Timeline not ready yet"),
            }
            if Instant::now() >= deadline {
                return Err(PageSourceError::Timeout(self.options.page_timeout));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Shut the browser down.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            error!("Failed to close browser: {e}");
        } else {
            info!("Browser shutdown complete");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }
}

#[async_trait]
impl PageSource for ChromiumPageSource {
    async fn fetch_batch(&mut self) -> Result<Vec<RawRecord>, PageSourceError> {
        self.wait_for_timeline().await?;
        let html = self.page.content().await.map_err(browser_err)?;
        let records = parse_timeline(&html);
        debug!(records = records.len(), "Fetched timeline batch");
        Ok(records)
    }

    async fn activate_load_more(&mut self) -> Result<bool, PageSourceError> {
        let found: bool = self
            .page
            .evaluate(LOAD_MORE_SCRIPT)
            .await
            .map_err(browser_err)?
            .into_value()
            .map_err(browser_err)?;

        if found {
            tokio::time::sleep(self.options.advance_delay).await;
        }
        Ok(found)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), PageSourceError> {
        self.page
            .evaluate(SCROLL_SCRIPT)
            .await
            .map_err(browser_err)?;
        tokio::time::sleep(self.options.advance_delay).await;
        Ok(())
    }
}
