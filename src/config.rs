//! Run configuration.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file
//! (`--config`, or `mangapress.toml` in the working directory), environment
//! variables, and finally command-line flags applied by the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assemble::DEFAULT_JPEG_QUALITY;
use crate::browser::RenderConfig;

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "mangapress.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory the chapter PDFs are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of most recent chapters to leave out.
    #[serde(default)]
    pub skip_count: usize,

    /// Chrome/Chromium executable. Probed from well-known paths when unset.
    #[serde(default)]
    pub driver_path: Option<PathBuf>,

    /// Treat any failed page download as fatal for the chapter.
    #[serde(default)]
    pub strict: bool,

    /// Per-image request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// User agent for image requests. Falls back to `browser.user_agent` so
    /// image requests look like the page session that found them.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// JPEG quality used when embedding pages.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    #[serde(default)]
    pub browser: RenderConfig,
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            skip_count: 0,
            driver_path: None,
            strict: false,
            request_timeout: default_request_timeout(),
            user_agent: None,
            jpeg_quality: default_jpeg_quality(),
            browser: RenderConfig::default(),
        }
    }
}

impl Config {
    /// Load from an explicit file, or from `mangapress.toml` in the working
    /// directory when present, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides.
    ///
    /// - `MANGAPRESS_OUTPUT_DIR` - output directory
    /// - `MANGAPRESS_DRIVER_PATH` or `CHROME_PATH` - browser executable
    /// - `MANGAPRESS_STRICT` - `1`/`true` enables strict mode
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(dir) = get("MANGAPRESS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("MANGAPRESS_DRIVER_PATH").or_else(|| get("CHROME_PATH")) {
            self.driver_path = Some(PathBuf::from(path));
        }
        if let Some(strict) = get("MANGAPRESS_STRICT") {
            self.strict = matches!(strict.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// User agent for image requests, `None` for the built-in default.
    pub fn image_user_agent(&self) -> Option<&str> {
        self.user_agent
            .as_deref()
            .or(self.browser.user_agent.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.skip_count, 0);
        assert!(!config.strict);
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mangapress.toml");
        std::fs::write(
            &path,
            r#"
output_dir = "/srv/manga"
skip_count = 3
strict = true

[browser]
headless = false
wait_timeout = 20
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/manga"));
        assert_eq!(config.skip_count, 3);
        assert!(config.strict);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.wait_timeout, 20);
        assert_eq!(config.browser.settle_delay_ms, 3000);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "skip_count = \"many\"").unwrap();
        assert!(matches!(
            Config::from_file(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_image_user_agent_follows_browser() {
        let mut config = Config::default();
        assert_eq!(config.image_user_agent(), None);

        config.browser.user_agent = Some("Mozilla/5.0 (X11; Linux x86_64)".to_string());
        assert_eq!(
            config.image_user_agent(),
            Some("Mozilla/5.0 (X11; Linux x86_64)")
        );

        config.user_agent = Some("mangapress-images".to_string());
        assert_eq!(config.image_user_agent(), Some("mangapress-images"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MANGAPRESS_OUTPUT_DIR", "/tmp/out"),
            ("CHROME_PATH", "/opt/chrome"),
            ("MANGAPRESS_STRICT", "TRUE"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.driver_path, Some(PathBuf::from("/opt/chrome")));
        assert!(config.strict);
    }

    #[test]
    fn test_driver_override_prefers_specific_var() {
        let env: HashMap<&str, &str> = [
            ("MANGAPRESS_DRIVER_PATH", "/usr/bin/chromium"),
            ("CHROME_PATH", "/opt/chrome"),
            ("MANGAPRESS_OUTPUT_DIR", ""),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.driver_path, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }
}
