//! Selector helpers over rendered markup.

use scraper::{Html, Selector};
use url::Url;

use super::SiteError;

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, SiteError> {
    Selector::parse(selector).map_err(|e| SiteError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// First non-empty value among `attrs` for every element matching `selector`,
/// in document order. Elements without any such value yield `None`.
pub(crate) fn attr_slots(
    doc: &Html,
    selector: &str,
    attrs: &[&str],
) -> Result<Vec<Option<String>>, SiteError> {
    let selector = parse_selector(selector)?;
    Ok(doc
        .select(&selector)
        .map(|el| {
            attrs
                .iter()
                .filter_map(|attr| el.value().attr(attr))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect())
}

/// Like [`attr_slots`], keeping only elements that had a value.
pub(crate) fn attr_values(
    doc: &Html,
    selector: &str,
    attrs: &[&str],
) -> Result<Vec<String>, SiteError> {
    Ok(attr_slots(doc, selector, attrs)?.into_iter().flatten().collect())
}

/// Resolve a navigation link to an absolute http(s) URL.
/// Placeholders such as `#` or `javascript:` entries are rejected.
pub(crate) fn resolve_link(raw: &str, base: &Url) -> Option<Url> {
    if raw.starts_with('#') || raw.starts_with("javascript:") {
        return None;
    }
    let url = base.join(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
