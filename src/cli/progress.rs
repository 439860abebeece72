//! Console progress display for a download run.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use mangapress::events::{EventSink, PipelineEvent};
use mangapress::utils::truncate_filename;

use super::icons;

/// Renders pipeline events as a chapter progress bar with per-event lines.
pub struct ConsoleSink {
    bar: ProgressBar,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self::with_bar(ProgressBar::with_draw_target(
            Some(0),
            indicatif::ProgressDrawTarget::hidden(),
        ))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .map(|s| s.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(bar_style);
        bar.set_message("Listing chapters");
        Self { bar }
    }

    /// Print above the bar. Unlike `ProgressBar::println` this still prints
    /// when the bar is hidden.
    fn line(&self, message: String) {
        self.bar.suspend(|| println!("{}", message));
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ChaptersListed { total, queued } => {
                self.bar.set_length(*queued as u64);
                self.line(format!(
                    "{} {} chapters found, {} to download",
                    icons::info(),
                    total,
                    queued
                ));
            }
            PipelineEvent::ChapterStarted { url, .. } => {
                let name = url
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .unwrap_or(url.as_str());
                self.bar.set_message(truncate_filename(name, 30));
            }
            PipelineEvent::PagesExtracted { .. } => {}
            PipelineEvent::ImageFailed {
                page,
                source,
                reason,
                ..
            } => self.line(format!(
                "  {} page {} skipped: {} {}",
                icons::warn(),
                page + 1,
                reason,
                style(truncate_filename(source, 60)).dim()
            )),
            PipelineEvent::ImageUndecodable { page, reason, .. } => self.line(format!(
                "  {} page {} not an image: {}",
                icons::warn(),
                page + 1,
                reason
            )),
            PipelineEvent::ChapterCompleted { path, pages, .. } => {
                self.bar.inc(1);
                self.line(format!(
                    "{} {} ({} pages)",
                    icons::success(),
                    path.display(),
                    pages
                ));
            }
            PipelineEvent::Aborted { stage, message } => {
                self.bar.abandon();
                self.line(format!(
                    "{} Stopped while {}: {}",
                    icons::error(),
                    stage,
                    style(message).red()
                ));
            }
            PipelineEvent::Finished { documents } => {
                self.bar.finish_and_clear();
                self.line(format!("{} {} documents written", icons::success(), documents));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mangapress::events::Stage;
    use std::path::PathBuf;

    #[test]
    fn test_progress_tracks_completed_chapters() {
        let sink = ConsoleSink::hidden();
        sink.emit(&PipelineEvent::ChaptersListed {
            total: 5,
            queued: 3,
        });
        sink.emit(&PipelineEvent::ChapterStarted {
            index: 0,
            total: 3,
            url: "https://rawkuma.com/title-chapter-1/".to_string(),
        });
        sink.emit(&PipelineEvent::ChapterCompleted {
            index: 0,
            path: PathBuf::from("title-chapter-1.pdf"),
            pages: 12,
        });

        assert_eq!(sink.bar.length(), Some(3));
        assert_eq!(sink.bar.position(), 1);
        assert_eq!(sink.bar.message(), "title-chapter-1");
    }

    #[test]
    fn test_abort_stops_bar() {
        let sink = ConsoleSink::hidden();
        sink.emit(&PipelineEvent::Aborted {
            stage: Stage::DownloadingImages,
            message: "no images".to_string(),
        });
        assert!(sink.bar.is_finished());
    }
}
