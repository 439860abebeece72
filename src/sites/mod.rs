//! Site adapters.
//!
//! Each supported origin is a variant of [`SiteAdapter`], chosen once from the
//! input URL's prefix. A variant only describes where things live in rendered
//! markup (see [`profile`]); adapters never touch the network or the browser.

mod markup;
pub mod profile;
pub mod trim;

use std::collections::HashSet;

use scraper::Html;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::browser::{Interaction, RenderRequest};
use crate::models::{ChapterRef, PageSource};

pub use profile::{NavigationOrder, SiteProfile};
pub use trim::TrimPolicy;

use markup::{attr_slots, attr_values, resolve_link};

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Unsupported site: {url} (supported prefixes: {supported})")]
    UnsupportedSite { url: String, supported: String },
    #[error("Chapter navigation not found on {site} page (looked for `{selector}`)")]
    NavigationNotFound {
        site: &'static str,
        selector: String,
    },
    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

/// Supported origin sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteAdapter {
    Mangakoma,
    Rawkuma,
    Manga1001,
}

impl SiteAdapter {
    pub const ALL: [SiteAdapter; 3] = [Self::Mangakoma, Self::Rawkuma, Self::Manga1001];

    /// Select the adapter whose known prefix matches `url`.
    pub fn for_url(url: &str) -> Result<Self, SiteError> {
        Self::ALL
            .into_iter()
            .find(|site| site.profile().prefixes.iter().any(|p| url.starts_with(p)))
            .ok_or_else(|| SiteError::UnsupportedSite {
                url: url.to_string(),
                supported: Self::supported_prefixes().join(", "),
            })
    }

    pub fn supported_prefixes() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .flat_map(|site| site.profile().prefixes.iter().copied())
            .collect()
    }

    pub fn profile(&self) -> &'static SiteProfile {
        match self {
            Self::Mangakoma => &profile::MANGAKOMA,
            Self::Rawkuma => &profile::RAWKUMA,
            Self::Manga1001 => &profile::MANGA1001,
        }
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn navigation_order(&self) -> NavigationOrder {
        self.profile().navigation.order
    }

    pub fn trim_policy(&self) -> TrimPolicy {
        self.profile().trim
    }

    /// Render request for the page carrying the chapter navigation.
    ///
    /// Sites with an interaction wait on the click target; the wait is
    /// mandatory there since the click cannot be issued before it exists.
    pub fn listing_request(&self, url: Url) -> RenderRequest {
        let profile = self.profile();
        match profile.interaction {
            Some(spec) => RenderRequest::new(url)
                .wait_for(spec.click)
                .interact(Interaction::new(spec.click).reveal(spec.reveal)),
            None => RenderRequest::new(url).wait_for(profile.navigation.primary),
        }
    }

    /// Render request for a chapter's reader page.
    pub fn chapter_request(&self, url: Url) -> RenderRequest {
        RenderRequest::new(url).wait_for(self.profile().pages.ready)
    }

    /// Chapter URLs in the site's native navigation order.
    ///
    /// Sites with a fallback lookup only consult it when the primary selector
    /// finds at most one chapter, since some layouts render just the current
    /// chapter inline and the full list inside a modal.
    pub fn list_chapter_urls(
        &self,
        markup: &str,
        base: &Url,
    ) -> Result<Vec<ChapterRef>, SiteError> {
        let nav = &self.profile().navigation;
        let doc = Html::parse_document(markup);

        let mut found = collect_links(&doc, nav.primary, nav.attr, base)?;
        let mut selector = nav.primary;

        if found.len() <= 1 {
            if let Some(fallback) = nav.fallback {
                debug!(
                    "{}: primary navigation yielded {} entries, trying `{}`",
                    self.name(),
                    found.len(),
                    fallback
                );
                let alternate = collect_links(&doc, fallback, nav.attr, base)?;
                if alternate.len() > found.len() {
                    found = alternate;
                    selector = fallback;
                }
            }
        }

        if found.is_empty() {
            return Err(SiteError::NavigationNotFound {
                site: self.name(),
                selector: match nav.fallback {
                    Some(fallback) => format!("{}` or `{}", nav.primary, fallback),
                    None => nav.primary.to_string(),
                },
            });
        }

        debug!(
            "{}: {} chapters via `{}`",
            self.name(),
            found.len(),
            selector
        );
        Ok(found.into_iter().map(ChapterRef::new).collect())
    }

    /// One slot per matched page element, in rendered DOM order.
    ///
    /// Elements without a usable source (no attribute, a placeholder `data:`
    /// URI) stay as `None` so [`trim`](Self::trim) still sees the positions
    /// the site renders its decorative entries at.
    pub fn extract_page_sources(
        &self,
        markup: &str,
        base: &Url,
    ) -> Result<Vec<Option<PageSource>>, SiteError> {
        let pages = &self.profile().pages;
        let doc = Html::parse_document(markup);
        Ok(attr_slots(&doc, pages.selector, pages.attrs)?
            .into_iter()
            .map(|raw| raw.and_then(|raw| PageSource::parse(&raw, base)))
            .collect())
    }

    /// Drop decorative entries per this site's policy.
    pub fn trim<T>(&self, slots: Vec<T>) -> Vec<T> {
        self.trim_policy().apply(slots)
    }

    /// Extract, trim, then keep the usable sources.
    pub fn page_sources(&self, markup: &str, base: &Url) -> Result<Vec<PageSource>, SiteError> {
        let slots = self.extract_page_sources(markup, base)?;
        Ok(self.trim(slots).into_iter().flatten().collect())
    }
}

impl std::fmt::Display for SiteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved, de-duplicated links in document order.
fn collect_links(
    doc: &Html,
    selector: &str,
    attr: &str,
    base: &Url,
) -> Result<Vec<Url>, SiteError> {
    let mut seen = HashSet::new();
    Ok(attr_values(doc, selector, &[attr])?
        .iter()
        .filter_map(|raw| resolve_link(raw, base))
        .filter(|url| seen.insert(url.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn urls(chapters: &[ChapterRef]) -> Vec<&str> {
        chapters.iter().map(|c| c.as_str()).collect()
    }

    const MANGAKOMA_CHAPTER: &str = r#"
        <html><body>
          <select class="chapter-select">
            <option value="https://mangakoma01.net/manga/tuishino-zi/di53hua">第53話</option>
            <option value="https://mangakoma01.net/manga/tuishino-zi/di52hua" selected>第52話</option>
            <option value="/manga/tuishino-zi/di51hua">第51話</option>
          </select>
          <div class="separator"><a href="https://img.example.com/cover.jpg"><img></a></div>
          <div class="separator"><a href="https://img.example.com/001.jpg"><img></a></div>
          <div class="separator"><a href="https://img.example.com/002.jpg"><img></a></div>
          <div class="separator"><a href="https://img.example.com/ad.png"><img></a></div>
          <div class="separator"><a href="https://img.example.com/next.jpg"><img></a></div>
        </body></html>
    "#;

    #[test]
    fn test_for_url_dispatch() {
        assert_eq!(
            SiteAdapter::for_url("https://mangakoma01.net/manga/tuishino-zi/di52hua").unwrap(),
            SiteAdapter::Mangakoma
        );
        assert_eq!(
            SiteAdapter::for_url("https://rawkuma.com/some-title-chapter-3/").unwrap(),
            SiteAdapter::Rawkuma
        );
        assert_eq!(
            SiteAdapter::for_url("https://manga1001.su/title/ch-1").unwrap(),
            SiteAdapter::Manga1001
        );
    }

    #[test]
    fn test_for_url_unsupported() {
        let err = SiteAdapter::for_url("https://example.com/manga/1").unwrap_err();
        assert!(matches!(err, SiteError::UnsupportedSite { .. }));
        assert!(err.to_string().contains("mangakoma01.net"));
    }

    #[test]
    fn test_mangakoma_chapter_list_native_order() {
        let page = base("https://mangakoma01.net/manga/tuishino-zi/di52hua");
        let chapters = SiteAdapter::Mangakoma
            .list_chapter_urls(MANGAKOMA_CHAPTER, &page)
            .unwrap();
        assert_eq!(
            urls(&chapters),
            vec![
                "https://mangakoma01.net/manga/tuishino-zi/di53hua",
                "https://mangakoma01.net/manga/tuishino-zi/di52hua",
                "https://mangakoma01.net/manga/tuishino-zi/di51hua",
            ]
        );
    }

    #[test]
    fn test_mangakoma_pages_and_trim() {
        let page = base("https://mangakoma01.net/manga/tuishino-zi/di52hua");
        let slots = SiteAdapter::Mangakoma
            .extract_page_sources(MANGAKOMA_CHAPTER, &page)
            .unwrap();
        // The png anchor never matches the jpg selector
        assert_eq!(slots.len(), 4);

        let trimmed = SiteAdapter::Mangakoma
            .page_sources(MANGAKOMA_CHAPTER, &page)
            .unwrap();
        let names: Vec<String> = trimmed.iter().map(|s| s.file_name()).collect();
        assert_eq!(names, vec!["001.jpg", "002.jpg"]);
    }

    #[test]
    fn test_navigation_not_found() {
        let page = base("https://mangakoma01.net/manga/x/1");
        let err = SiteAdapter::Mangakoma
            .list_chapter_urls("<html><body><p>loading</p></body></html>", &page)
            .unwrap_err();
        assert!(matches!(
            err,
            SiteError::NavigationNotFound {
                site: "mangakoma",
                ..
            }
        ));
    }

    #[test]
    fn test_rawkuma_skips_placeholder_option_and_lazy_src() {
        let markup = r#"
            <select id="chapter">
              <option value="">Select Chapter</option>
              <option value="https://rawkuma.com/title-chapter-3/">Chapter 3</option>
              <option value="https://rawkuma.com/title-chapter-2/">Chapter 2</option>
              <option value="https://rawkuma.com/title-chapter-1/">Chapter 1</option>
            </select>
            <div id="readerarea">
              <img src="data:image/gif;base64,R0lGOD" data-src="https://cdn.rawkuma.com/banner.jpg">
              <img data-src="https://cdn.rawkuma.com/01.jpg" src="data:image/gif;base64,R0lGOD">
              <img src="https://cdn.rawkuma.com/02.jpg">
            </div>
        "#;
        let page = base("https://rawkuma.com/title-chapter-2/");

        let chapters = SiteAdapter::Rawkuma.list_chapter_urls(markup, &page).unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].slug(), Some("title-chapter-3"));

        let slots = SiteAdapter::Rawkuma.extract_page_sources(markup, &page).unwrap();
        assert_eq!(slots.len(), 3);
        let trimmed = SiteAdapter::Rawkuma.page_sources(markup, &page).unwrap();
        assert_eq!(
            trimmed,
            vec![
                PageSource::Remote(base("https://cdn.rawkuma.com/01.jpg")),
                PageSource::Remote(base("https://cdn.rawkuma.com/02.jpg")),
            ]
        );
    }

    #[test]
    fn test_manga1001_primary_list_wins_when_populated() {
        let markup = r#"
            <ul class="chapter-list">
              <li><a href="/title/ch-3">3</a></li>
              <li><a href="/title/ch-2">2</a></li>
              <li><a href="/title/ch-1">1</a></li>
            </ul>
            <div id="chapterModal"><a href="/title/ch-9">9</a></div>
        "#;
        let page = base("https://manga1001.su/title/ch-2");
        let chapters = SiteAdapter::Manga1001.list_chapter_urls(markup, &page).unwrap();
        assert_eq!(
            urls(&chapters),
            vec![
                "https://manga1001.su/title/ch-3",
                "https://manga1001.su/title/ch-2",
                "https://manga1001.su/title/ch-1",
            ]
        );
    }

    #[test]
    fn test_manga1001_falls_back_to_modal() {
        let markup = r#"
            <ul class="chapter-list"><li><a href="/title/ch-2">current</a></li></ul>
            <div id="chapterModal" class="modal">
              <a href="/title/ch-3">3</a>
              <a href="/title/ch-2">2</a>
              <a href="/title/ch-2">2 (dup)</a>
              <a href="/title/ch-1">1</a>
            </div>
        "#;
        let page = base("https://manga1001.su/title/ch-2");
        let chapters = SiteAdapter::Manga1001.list_chapter_urls(markup, &page).unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[2].slug(), Some("ch-1"));
    }

    #[test]
    fn test_manga1001_single_entry_without_modal_is_kept() {
        let markup = r#"<ul class="chapter-list"><li><a href="/title/ch-1">1</a></li></ul>"#;
        let page = base("https://manga1001.su/title/ch-1");
        let chapters = SiteAdapter::Manga1001.list_chapter_urls(markup, &page).unwrap();
        assert_eq!(urls(&chapters), vec!["https://manga1001.su/title/ch-1"]);
    }

    #[test]
    fn test_manga1001_nothing_found_names_both_paths() {
        let page = base("https://manga1001.su/title/ch-1");
        let err = SiteAdapter::Manga1001
            .list_chapter_urls("<div></div>", &page)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ul.chapter-list"));
        assert!(msg.contains("chapterModal"));
    }

    #[test]
    fn test_manga1001_keeps_every_page() {
        let markup = r#"
            <div class="chapter-content">
              <img src="/p/1.webp"><img src="/p/2.webp"><img src="/p/3.webp">
            </div>
        "#;
        let page = base("https://manga1001.su/title/ch-1");
        let sources = SiteAdapter::Manga1001.page_sources(markup, &page).unwrap();
        assert_eq!(sources.len(), 3);
    }

    #[test]
    fn test_unusable_leading_banner_is_still_trimmed() {
        let markup = r#"
            <div id="readerarea">
              <img src="data:image/svg+xml,%3Csvg%3E">
              <img src="https://cdn.rawkuma.com/01.jpg">
              <img src="https://cdn.rawkuma.com/02.jpg">
              <img src="https://cdn.rawkuma.com/03.jpg">
            </div>
        "#;
        let page = base("https://rawkuma.com/title-chapter-2/");

        let slots = SiteAdapter::Rawkuma.extract_page_sources(markup, &page).unwrap();
        assert_eq!(slots.len(), 4);
        assert!(slots[0].is_none());

        let names: Vec<String> = SiteAdapter::Rawkuma
            .page_sources(markup, &page)
            .unwrap()
            .iter()
            .map(|s| s.file_name())
            .collect();
        assert_eq!(names, vec!["01.jpg", "02.jpg", "03.jpg"]);
    }

    #[test]
    fn test_sourceless_elements_count_for_both_ends() {
        let markup = r#"
            <div class="separator"><a href="https://img.example.com/001.jpg"><img></a></div>
            <div class="separator"><a href="https://img.example.com/002.jpg"><img></a></div>
        "#;
        let page = base("https://mangakoma01.net/manga/x/1");
        // Rawkuma-style lazy images with nothing loaded yet
        let lazy = r#"<div id="readerarea"><img><img src="https://cdn.rawkuma.com/01.jpg"><img></div>"#;

        assert!(SiteAdapter::Mangakoma.page_sources(markup, &page).unwrap().is_empty());
        let kept = SiteAdapter::Rawkuma.page_sources(lazy, &page).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].file_name(), "01.jpg");
    }

    #[test]
    fn test_requests_carry_site_waits() {
        let url = base("https://manga1001.su/title/ch-1");
        let listing = SiteAdapter::Manga1001.listing_request(url.clone());
        assert_eq!(listing.ready_selector.as_deref(), Some("button.chapter-list-toggle"));
        assert!(listing.interaction.is_some());

        let listing = SiteAdapter::Rawkuma.listing_request(url.clone());
        assert!(listing.interaction.is_none());
        assert_eq!(listing.ready_selector.as_deref(), Some("select#chapter option[value]"));

        let chapter = SiteAdapter::Mangakoma.chapter_request(url);
        assert_eq!(chapter.ready_selector.as_deref(), Some("div.separator a[href$='jpg']"));
    }
}
