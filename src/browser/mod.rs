//! Rendering sessions for JavaScript-populated reader pages.
//!
//! Uses chromiumoxide (CDP). Every render owns a whole browser process: it is
//! launched for one URL and closed again before `render` returns, whatever the
//! outcome.

mod config;
mod driver;
mod render;
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
mod session;
mod types;
pub mod wait;

pub use config::RenderConfig;
pub use driver::locate_browser;
pub use types::{Interaction, RenderRequest};

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Browser driver unavailable: {0}")]
    DriverUnavailable(String),
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Timed out after {timeout:?} waiting for `{selector}` on {url}")]
    ConditionTimeout {
        url: String,
        selector: String,
        timeout: Duration,
    },
    #[error("Click on `{selector}` failed: {reason}")]
    Interaction { selector: String, reason: String },
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,
}

/// Something that turns a URL into fully rendered markup.
#[async_trait]
pub trait Renderer: Send {
    async fn render(&mut self, request: &RenderRequest) -> Result<String, RenderError>;
}

/// Headless Chromium renderer.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub struct BrowserRenderer {
    config: RenderConfig,
    executable: PathBuf,
}

impl BrowserRenderer {
    /// Resolve the browser binary up front so a missing driver fails before
    /// any navigation is attempted.
    pub fn new(config: RenderConfig, driver_path: Option<&Path>) -> Result<Self, RenderError> {
        let executable = locate_browser(driver_path)?;
        Ok(Self { config, executable })
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&mut self, _request: &RenderRequest) -> Result<String, RenderError> {
        Err(RenderError::NotCompiled)
    }
}
