//! Progress events emitted by the pipeline.

use std::path::PathBuf;

use tracing::{error, info, warn};

/// Where the pipeline is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ListingChapters,
    ProcessingChapter(usize),
    DownloadingImages,
    Assembling,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListingChapters => write!(f, "listing chapters"),
            Self::ProcessingChapter(i) => write!(f, "processing chapter {}", i + 1),
            Self::DownloadingImages => write!(f, "downloading images"),
            Self::Assembling => write!(f, "assembling"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    ChaptersListed {
        total: usize,
        queued: usize,
    },
    ChapterStarted {
        index: usize,
        total: usize,
        url: String,
    },
    PagesExtracted {
        index: usize,
        found: usize,
        kept: usize,
    },
    ImageFailed {
        index: usize,
        page: usize,
        source: String,
        reason: String,
    },
    ImageUndecodable {
        index: usize,
        page: usize,
        reason: String,
    },
    ChapterCompleted {
        index: usize,
        path: PathBuf,
        pages: usize,
    },
    Aborted {
        stage: Stage,
        message: String,
    },
    Finished {
        documents: usize,
    },
}

/// Receives pipeline events. Implementations decide how to present them.
pub trait EventSink {
    fn emit(&self, event: &PipelineEvent);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, event: &PipelineEvent) {
        (**self).emit(event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ChaptersListed { total, queued } => {
                info!("{} chapters listed, {} queued", total, queued)
            }
            PipelineEvent::ChapterStarted { index, total, url } => {
                info!("[{}/{}] {}", index + 1, total, url)
            }
            PipelineEvent::PagesExtracted { index, found, kept } => {
                info!(
                    "Chapter {}: {} page images found, {} kept after trim",
                    index + 1,
                    found,
                    kept
                )
            }
            PipelineEvent::ImageFailed {
                index,
                page,
                source,
                reason,
            } => warn!(
                "Chapter {}: page {} skipped ({}): {}",
                index + 1,
                page + 1,
                source,
                reason
            ),
            PipelineEvent::ImageUndecodable {
                index,
                page,
                reason,
            } => warn!(
                "Chapter {}: page {} is not an image: {}",
                index + 1,
                page + 1,
                reason
            ),
            PipelineEvent::ChapterCompleted { path, pages, .. } => {
                info!("Wrote {} ({} pages)", path.display(), pages)
            }
            PipelineEvent::Aborted { stage, message } => {
                error!("Aborted while {}: {}", stage, message)
            }
            PipelineEvent::Finished { documents } => info!("Done: {} documents", documents),
        }
    }
}
