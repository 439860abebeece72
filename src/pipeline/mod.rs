//! Chapter pipeline: list, render, fetch, assemble.
//!
//! Chapters are processed one at a time, oldest first. A fatal condition in
//! any chapter stops the run; documents already written stay on disk.

mod error;

pub use error::{ChapterError, PipelineError};

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::assemble::DocumentAssembler;
use crate::browser::Renderer;
use crate::config::Config;
use crate::events::{EventSink, PipelineEvent, Stage};
use crate::fetcher::ImageFetcher;
use crate::lister::list_chapters;
use crate::models::{ChapterRef, DocumentArtifact};
use crate::scratch::ScratchDir;
use crate::sites::SiteAdapter;

/// Result of a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Chapters found in the site navigation.
    pub listed: usize,
    /// Most recent chapters left out by `skip_count`.
    pub skipped: usize,
    /// Documents written, oldest chapter first.
    pub documents: Vec<DocumentArtifact>,
}

pub struct Pipeline<R, S> {
    config: Config,
    renderer: R,
    sink: S,
    fetcher: ImageFetcher,
    assembler: DocumentAssembler,
}

impl<R: Renderer, S: EventSink> Pipeline<R, S> {
    pub fn new(config: Config, renderer: R, sink: S) -> Result<Self, PipelineError> {
        let fetcher = ImageFetcher::new(config.request_timeout(), config.image_user_agent())
            .map_err(PipelineError::Client)?;
        let assembler = DocumentAssembler::new(config.jpeg_quality);

        Ok(Self {
            config,
            renderer,
            sink,
            fetcher,
            assembler,
        })
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Chapters that `run` would process, oldest first.
    pub async fn list(
        &mut self,
        site: SiteAdapter,
        url: &str,
    ) -> Result<Vec<ChapterRef>, PipelineError> {
        Ok(list_chapters(&mut self.renderer, site, url, self.config.skip_count).await?)
    }

    /// Download every listed chapter of the title `url` belongs to.
    pub async fn run(&mut self, site: SiteAdapter, url: &str) -> Result<RunSummary, PipelineError> {
        let chapters = match self.list(site, url).await {
            Ok(chapters) => chapters,
            Err(e) => {
                self.abort(Stage::ListingChapters, &e);
                return Err(e);
            }
        };

        let mut summary = RunSummary {
            listed: chapters.len() + self.config.skip_count,
            skipped: self.config.skip_count,
            documents: Vec::with_capacity(chapters.len()),
        };
        self.sink.emit(&PipelineEvent::ChaptersListed {
            total: summary.listed,
            queued: chapters.len(),
        });

        let output_dir = self.config.output_dir.clone();
        if let Err(source) = tokio::fs::create_dir_all(&output_dir).await {
            let e = PipelineError::OutputDir {
                path: output_dir,
                source,
            };
            self.abort(Stage::ListingChapters, &e);
            return Err(e);
        }

        let total = chapters.len();
        for (index, chapter) in chapters.into_iter().enumerate() {
            self.sink.emit(&PipelineEvent::ChapterStarted {
                index,
                total,
                url: chapter.to_string(),
            });

            let mut stage = Stage::ProcessingChapter(index);
            let result = self
                .process_chapter(site, index, &chapter, &mut stage, &summary.documents)
                .await;
            match result {
                Ok(artifact) => summary.documents.push(artifact),
                Err(source) => {
                    let e = PipelineError::Chapter {
                        index,
                        url: chapter.to_string(),
                        stage,
                        source,
                    };
                    self.abort(stage, &e);
                    return Err(e);
                }
            }
        }

        info!(
            "{} documents written to {}",
            summary.documents.len(),
            self.config.output_dir.display()
        );
        self.sink.emit(&PipelineEvent::Finished {
            documents: summary.documents.len(),
        });
        Ok(summary)
    }

    /// One chapter pass. `stage` tracks progress for error context;
    /// `earlier` holds the documents already written in this run.
    async fn process_chapter(
        &mut self,
        site: SiteAdapter,
        index: usize,
        chapter: &ChapterRef,
        stage: &mut Stage,
        earlier: &[DocumentArtifact],
    ) -> Result<DocumentArtifact, ChapterError> {
        let markup = self
            .renderer
            .render(&site.chapter_request(chapter.url().clone()))
            .await?;
        let slots = site.extract_page_sources(&markup, chapter.url())?;
        let found_count = slots.len();
        let sources: Vec<_> = site.trim(slots).into_iter().flatten().collect();
        self.sink.emit(&PipelineEvent::PagesExtracted {
            index,
            found: found_count,
            kept: sources.len(),
        });
        if sources.is_empty() {
            return Err(ChapterError::NoPages { found: found_count });
        }

        *stage = Stage::DownloadingImages;
        let scratch = ScratchDir::for_chapter(index).map_err(ChapterError::Scratch)?;
        let report = self
            .fetcher
            .fetch_all(&sources, Some(chapter.url()), scratch.path())
            .await?;

        for failure in &report.failures {
            self.sink.emit(&PipelineEvent::ImageFailed {
                index,
                page: failure.index,
                source: failure.source.clone(),
                reason: failure.reason.clone(),
            });
        }
        if self.config.strict && !report.is_complete() {
            return Err(ChapterError::IncompleteChapter {
                failed: report.failures.len(),
                total: sources.len(),
            });
        }
        if report.images.is_empty() {
            return Err(ChapterError::NoImages {
                attempted: sources.len(),
            });
        }

        *stage = Stage::Assembling;
        let title = chapter.file_stem(index);
        let output = self.document_path(&title);
        if let Some(previous) = replaced_document(earlier, &output) {
            warn!(
                "{} replaces {} written earlier for {}",
                output.display(),
                previous.path.display(),
                previous.chapter
            );
        }
        debug!(
            "Assembling {} images into {}",
            report.images.len(),
            output.display()
        );

        let assembler = self.assembler.clone();
        let images = report.images;
        let target = output.clone();
        let assembled = tokio::task::spawn_blocking(move || {
            assembler.assemble(&images, &target, &title)
        })
        .await
        .map_err(|e| ChapterError::Join(e.to_string()))??;
        scratch.release();

        for skipped in &assembled.skipped {
            self.sink.emit(&PipelineEvent::ImageUndecodable {
                index,
                page: skipped.index,
                reason: skipped.reason.clone(),
            });
        }
        self.sink.emit(&PipelineEvent::ChapterCompleted {
            index,
            path: output.clone(),
            pages: assembled.pages,
        });

        Ok(DocumentArtifact {
            chapter: chapter.clone(),
            path: output,
            pages: assembled.pages,
        })
    }

    fn document_path(&self, stem: &str) -> PathBuf {
        self.config.output_dir.join(format!("{}.pdf", stem))
    }

    fn abort(&self, stage: Stage, error: &PipelineError) {
        self.sink.emit(&PipelineEvent::Aborted {
            stage,
            message: error.to_string(),
        });
    }
}

/// The document from this run that a write to `output` would overwrite.
fn replaced_document<'a>(
    earlier: &'a [DocumentArtifact],
    output: &Path,
) -> Option<&'a DocumentArtifact> {
    earlier.iter().find(|doc| doc.path == output)
}
