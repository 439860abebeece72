//! Chapter discovery from a single chapter URL.

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::browser::{RenderError, Renderer};
use crate::models::ChapterRef;
use crate::sites::{NavigationOrder, SiteAdapter, SiteError};

#[derive(Debug, Error)]
pub enum ListError {
    #[error("Invalid chapter URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Site(#[from] SiteError),
    #[error("Cannot skip {skip} chapters: only {available} listed")]
    SkipOutOfRange { skip: usize, available: usize },
}

/// List every chapter of the title `url` belongs to, oldest first, leaving
/// out the `skip` most recent ones.
pub async fn list_chapters<R: Renderer + ?Sized>(
    renderer: &mut R,
    site: SiteAdapter,
    url: &str,
    skip: usize,
) -> Result<Vec<ChapterRef>, ListError> {
    let page_url = Url::parse(url).map_err(|e| ListError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let markup = renderer.render(&site.listing_request(page_url.clone())).await?;
    let found = site.list_chapter_urls(&markup, &page_url)?;
    info!("{}: {} chapters listed from {}", site, found.len(), url);

    order_chapters(found, site.navigation_order(), skip)
}

/// Normalize a navigation listing to oldest-first after dropping the `skip`
/// newest chapters.
pub fn order_chapters<T>(
    found: Vec<T>,
    order: NavigationOrder,
    skip: usize,
) -> Result<Vec<T>, ListError> {
    let available = found.len();
    if skip > available {
        return Err(ListError::SkipOutOfRange { skip, available });
    }

    let mut chapters: Vec<T> = order.newest_first(found).into_iter().skip(skip).collect();
    chapters.reverse();
    Ok(chapters)
}
