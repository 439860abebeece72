//! Static per-site selector tables.

use super::trim::TrimPolicy;

/// Order in which a site's chapter navigation enumerates chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOrder {
    NewestFirst,
    OldestFirst,
}

impl NavigationOrder {
    /// Normalize a listing to newest-first.
    pub fn newest_first<T>(self, mut items: Vec<T>) -> Vec<T> {
        if self == Self::OldestFirst {
            items.reverse();
        }
        items
    }
}

/// Where the chapter list lives in a rendered page.
#[derive(Debug, Clone, Copy)]
pub struct NavigationLookup {
    pub primary: &'static str,
    pub attr: &'static str,
    /// Consulted only when `primary` yields at most one entry.
    pub fallback: Option<&'static str>,
    pub order: NavigationOrder,
}

/// Where page images live in a rendered chapter.
#[derive(Debug, Clone, Copy)]
pub struct PageLookup {
    /// Present once the reader has populated its pages.
    pub ready: &'static str,
    pub selector: &'static str,
    /// Attributes tried in order per element.
    pub attrs: &'static [&'static str],
}

/// A click needed before the chapter list shows up in the markup.
#[derive(Debug, Clone, Copy)]
pub struct InteractionSpec {
    pub click: &'static str,
    pub reveal: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub name: &'static str,
    pub prefixes: &'static [&'static str],
    pub navigation: NavigationLookup,
    pub pages: PageLookup,
    pub trim: TrimPolicy,
    pub interaction: Option<InteractionSpec>,
}

pub(super) const MANGAKOMA: SiteProfile = SiteProfile {
    name: "mangakoma",
    prefixes: &["https://mangakoma01.net/", "https://mangakoma.net/"],
    navigation: NavigationLookup {
        primary: "select.chapter-select option[value]",
        attr: "value",
        fallback: None,
        order: NavigationOrder::NewestFirst,
    },
    pages: PageLookup {
        ready: "div.separator a[href$='jpg']",
        selector: "div.separator a[href$='jpg']",
        attrs: &["href"],
    },
    // First and last anchors are thumbnails of the cover and next chapter.
    trim: TrimPolicy::StripBoth,
    interaction: None,
};

pub(super) const RAWKUMA: SiteProfile = SiteProfile {
    name: "rawkuma",
    prefixes: &["https://rawkuma.com/", "https://www.rawkuma.com/"],
    navigation: NavigationLookup {
        primary: "select#chapter option[value]",
        attr: "value",
        fallback: None,
        order: NavigationOrder::NewestFirst,
    },
    pages: PageLookup {
        ready: "div#readerarea img",
        selector: "div#readerarea img",
        attrs: &["data-src", "data-lazy-src", "src"],
    },
    trim: TrimPolicy::StripLeading,
    interaction: None,
};

pub(super) const MANGA1001: SiteProfile = SiteProfile {
    name: "manga1001",
    prefixes: &["https://manga1001.su/", "https://manga1001.in/"],
    navigation: NavigationLookup {
        primary: "ul.chapter-list li a[href]",
        attr: "href",
        fallback: Some("div#chapterModal a[href]"),
        order: NavigationOrder::NewestFirst,
    },
    pages: PageLookup {
        ready: "div.chapter-content img",
        selector: "div.chapter-content img",
        attrs: &["data-src", "src"],
    },
    trim: TrimPolicy::Keep,
    interaction: Some(InteractionSpec {
        click: "button.chapter-list-toggle",
        reveal: "div#chapterModal a[href]",
    }),
};
