//! Styled status icons for console output.

use console::{style, StyledObject};

/// Green check for a written document.
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Cyan arrow for a stage starting.
pub fn info() -> StyledObject<&'static str> {
    style("→").cyan()
}

/// Yellow mark for a skipped page.
pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Red cross for an aborted run.
pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

pub fn bullet() -> StyledObject<&'static str> {
    style("•").dim()
}
