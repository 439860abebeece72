//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::assemble::AssembleError;
use crate::browser::RenderError;
use crate::events::Stage;
use crate::fetcher::FetchError;
use crate::lister::ListError;
use crate::sites::SiteError;

/// Errors that halt a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] FetchError),

    #[error(transparent)]
    List(#[from] ListError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chapter {} ({url}) failed while {stage}: {source}", .index + 1)]
    Chapter {
        index: usize,
        url: String,
        stage: Stage,
        #[source]
        source: ChapterError,
    },
}

impl PipelineError {
    /// The chapter-level cause, if the run stopped inside a chapter.
    pub fn chapter_error(&self) -> Option<&ChapterError> {
        match self {
            Self::Chapter { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Why a single chapter could not produce a document.
#[derive(Debug, Error)]
pub enum ChapterError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("No page images left after trimming ({found} found)")]
    NoPages { found: usize },

    #[error("None of the {attempted} page images could be downloaded")]
    NoImages { attempted: usize },

    #[error("{failed} of {total} page images failed to download")]
    IncompleteChapter { failed: usize, total: usize },

    #[error("Assembly task failed: {0}")]
    Join(String),
}
