//! Page rendering via chromiumoxide.

#![cfg(feature = "browser")]

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session::{self, PageSession};
use super::{BrowserRenderer, RenderError, RenderRequest, Renderer};

/// JavaScript to wait for page ready state.
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

fn browser_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Browser(e.to_string())
}

/// Wait for the page to reach a ready state.
async fn wait_for_page_ready(page: &Page, timeout: Duration) {
    match tokio::time::timeout(timeout, page.evaluate(WAIT_FOR_READY_SCRIPT.to_string())).await {
        Ok(Ok(result)) => {
            let state: String = result
                .into_value()
                .unwrap_or_else(|_| "unknown".to_string());
            debug!("Page ready state: {}", state);
        }
        Ok(Err(e)) => debug!("Could not check ready state: {}", e),
        Err(_) => warn!("Timeout waiting for page ready state"),
    }
}

/// A chromiumoxide tab driven by [`session::render_page`].
struct ChromePage {
    page: Page,
    timeout: Duration,
    user_agent: Option<String>,
}

#[async_trait]
impl PageSession for ChromePage {
    async fn goto(&self, url: &str) -> Result<(), RenderError> {
        if let Some(ref user_agent) = self.user_agent {
            self.page
                .execute(SetUserAgentOverrideParams::new(user_agent.clone()))
                .await
                .map_err(browser_error)?;
        }

        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                reason: e,
            })?;

        tokio::time::timeout(self.timeout, self.page.execute(nav_params))
            .await
            .map_err(|_| RenderError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {:?}", self.timeout),
            })?
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        wait_for_page_ready(&self.page, self.timeout).await;
        Ok(())
    }

    async fn find(&self, selector: &str) -> bool {
        self.page.find_element(selector).await.is_ok()
    }

    async fn click(&self, selector: &str) -> Result<(), String> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| e.to_string())?;
        element.click().await.map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn content(&self) -> Result<String, RenderError> {
        self.page.content().await.map_err(browser_error)
    }

    async fn close(&self) {
        if let Err(e) = self.page.clone().close().await {
            debug!("Page close failed: {}", e);
        }
    }
}

impl BrowserRenderer {
    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), RenderError> {
        info!(
            "Launching browser {} (headless={})",
            self.executable.display(),
            self.config.headless
        );

        let mut builder = BrowserConfig::builder().chrome_executable(&self.executable);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }

    /// Open a page and render into it. The page is closed on every path.
    async fn render_in(&self, browser: &Browser, request: &RenderRequest) -> Result<String, RenderError> {
        let page = browser.new_page("about:blank").await.map_err(browser_error)?;
        let page = ChromePage {
            page,
            timeout: self.config.navigation_timeout(),
            user_agent: self.config.user_agent.clone(),
        };
        session::render_page(&page, request, &self.config).await
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&mut self, request: &RenderRequest) -> Result<String, RenderError> {
        let (mut browser, handler_task) = self.launch().await?;

        let result = self.render_in(&browser, request).await;

        if let Err(e) = browser.close().await {
            debug!("Browser close failed: {}", e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Browser process wait failed: {}", e);
        }
        handler_task.abort();

        result
    }
}
