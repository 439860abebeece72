//! Locating the Chrome/Chromium executable.

use std::path::{Path, PathBuf};

use tracing::info;

use super::RenderError;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Resolve the browser executable.
///
/// An explicit path must exist; it is never silently replaced by a discovered
/// one. Without one, well-known install paths and then `PATH` are searched.
pub fn locate_browser(explicit: Option<&Path>) -> Result<PathBuf, RenderError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(RenderError::DriverUnavailable(format!(
            "{} does not exist or is not a file",
            path.display()
        )));
    }

    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in CHROME_COMMANDS {
        if let Ok(path) = which::which(cmd) {
            info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }
    }

    Err(RenderError::DriverUnavailable(
        "Chrome/Chromium not found. Install it or pass --driver-path:\n\
         - Arch/Manjaro: sudo pacman -S chromium\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium"
            .to_string(),
    ))
}
