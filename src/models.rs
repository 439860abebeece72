//! Core data types passed between pipeline stages.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::utils::sanitize_filename;

/// Absolute URL of one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterRef {
    url: Url,
}

impl ChapterRef {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Last non-empty path segment, used to name the chapter's document.
    pub fn slug(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
    }

    /// Filesystem-safe document stem; falls back to `chapter-<n>`.
    pub fn file_stem(&self, index: usize) -> String {
        match self.slug() {
            Some(slug) => sanitize_filename(slug),
            None => format!("chapter-{}", index + 1),
        }
    }
}

impl fmt::Display for ChapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Location of one rendered page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// Image served over HTTP(S).
    Remote(Url),
    /// Image embedded in the element as a `data:` URI.
    Inline { mime: String, payload: String },
}

impl PageSource {
    /// Parse an attribute value, resolving relative references against `base`.
    pub fn parse(raw: &str, base: &Url) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(rest) = raw.strip_prefix("data:") {
            // Only base64 payloads carry real page images
            let (meta, payload) = rest.split_once(',')?;
            let mime = meta.strip_suffix(";base64")?.to_string();
            return Some(Self::Inline {
                mime,
                payload: payload.to_string(),
            });
        }

        base.join(raw).ok().map(Self::Remote)
    }

    /// Short name used for scratch files and diagnostics.
    pub fn file_name(&self) -> String {
        match self {
            Self::Remote(url) => url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .map(sanitize_filename)
                .unwrap_or_else(|| "page".to_string()),
            Self::Inline { mime, .. } => {
                let ext = mime.rsplit('/').next().unwrap_or("bin");
                format!("inline.{}", sanitize_filename(ext))
            }
        }
    }
}

impl fmt::Display for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url.as_str()),
            Self::Inline { mime, payload } => {
                write!(f, "data:{} ({} bytes encoded)", mime, payload.len())
            }
        }
    }
}

/// A page image written to scratch storage.
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    /// Position of the source in the trimmed page list.
    pub index: usize,
    pub path: PathBuf,
    pub source: String,
}

/// A written chapter document.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    pub chapter: ChapterRef,
    pub path: PathBuf,
    pub pages: usize,
}

impl DocumentArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }
}
