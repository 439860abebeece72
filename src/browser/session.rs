//! What one render does with an open page: navigate, wait, click, read.
//!
//! The page itself sits behind [`PageSession`] so the waiting rules run the
//! same against Chromium and against an in-memory page.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::wait::poll_until;
use super::{Interaction, RenderConfig, RenderError, RenderRequest};

/// The handful of page operations a render needs.
#[async_trait]
pub(crate) trait PageSession: Send + Sync {
    /// Load `url` and wait for the document to be ready.
    async fn goto(&self, url: &str) -> Result<(), RenderError>;

    /// Whether `selector` currently matches an element.
    async fn find(&self, selector: &str) -> bool;

    async fn click(&self, selector: &str) -> Result<(), String>;

    /// Current serialized markup.
    async fn content(&self) -> Result<String, RenderError>;

    async fn close(&self);
}

/// Render `request` into `page`. The page is closed before returning.
pub(crate) async fn render_page<P>(
    page: &P,
    request: &RenderRequest,
    config: &RenderConfig,
) -> Result<String, RenderError>
where
    P: PageSession + ?Sized,
{
    let result = drive(page, request, config).await;
    page.close().await;
    result
}

async fn drive<P>(page: &P, request: &RenderRequest, config: &RenderConfig) -> Result<String, RenderError>
where
    P: PageSession + ?Sized,
{
    let url = request.url.as_str();
    page.goto(url).await?;

    match request.ready_selector {
        Some(ref selector) => {
            if !wait_for(page, selector, config).await {
                if request.interaction.is_some() {
                    return Err(RenderError::ConditionTimeout {
                        url: url.to_string(),
                        selector: selector.clone(),
                        timeout: config.wait_timeout(),
                    });
                }
                warn!(
                    "`{}` did not appear on {} within {:?}; settling for {:?}",
                    selector,
                    url,
                    config.wait_timeout(),
                    config.settle_delay()
                );
                tokio::time::sleep(config.settle_delay()).await;
            }
        }
        None => tokio::time::sleep(config.settle_delay()).await,
    }

    if let Some(ref interaction) = request.interaction {
        interact(page, url, interaction, config).await?;
    }

    page.content().await
}

/// Poll until `selector` matches an element. Returns false on timeout.
async fn wait_for<P>(page: &P, selector: &str, config: &RenderConfig) -> bool
where
    P: PageSession + ?Sized,
{
    debug!("Waiting for selector: {}", selector);
    poll_until(config.wait_timeout(), config.poll_interval(), move || async move {
        page.find(selector).await.then_some(())
    })
    .await
    .is_some()
}

/// Click the control and wait for what it reveals.
async fn interact<P>(
    page: &P,
    url: &str,
    interaction: &Interaction,
    config: &RenderConfig,
) -> Result<(), RenderError>
where
    P: PageSession + ?Sized,
{
    let selector = interaction.click.as_str();
    if !wait_for(page, selector, config).await {
        return Err(RenderError::ConditionTimeout {
            url: url.to_string(),
            selector: selector.to_string(),
            timeout: config.wait_timeout(),
        });
    }

    debug!("Clicking `{}`", selector);
    page.click(selector)
        .await
        .map_err(|reason| RenderError::Interaction {
            selector: selector.to_string(),
            reason,
        })?;

    if let Some(ref reveal) = interaction.reveal {
        if !wait_for(page, reveal, config).await {
            warn!("`{}` not revealed after clicking `{}` on {}", reveal, selector, url);
        }
    }

    Ok(())
}
