//! Filename helpers for scratch files and output documents.

/// Replace characters that are unsafe in filenames.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('_');
    if trimmed.chars().count() > 100 {
        trimmed.chars().take(100).collect()
    } else if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncate a filename for display, keeping the extension visible.
pub fn truncate_filename(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }

    if let Some(dot_pos) = name.rfind('.') {
        let ext = &name[dot_pos..];
        if ext.len() + 4 < max_len {
            let prefix: String = name.chars().take(max_len - ext.len() - 3).collect();
            return format!("{}...{}", prefix, ext);
        }
    }

    let prefix: String = name.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", prefix)
}
