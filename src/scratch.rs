//! Per-chapter scratch storage for downloaded page images.

use std::io;
use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, warn};

/// Temporary directory owned by one chapter pass.
///
/// Removed when dropped, so every exit path of the pass reclaims it.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a scratch directory under the system temp location.
    pub fn for_chapter(index: usize) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("mangapress-ch{:03}-", index + 1))
            .tempdir()?;
        debug!("Scratch dir {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create a scratch directory under `parent`.
    pub fn for_chapter_in(parent: &Path, index: usize) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("mangapress-ch{:03}-", index + 1))
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, logging instead of failing.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch dir {}: {}", path.display(), e);
        }
    }
}
