//! Command-line entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::style;

use mangapress::browser::BrowserRenderer;
use mangapress::config::Config;
use mangapress::events::TracingSink;
use mangapress::pipeline::Pipeline;
use mangapress::sites::SiteAdapter;

use super::icons;
use super::progress::ConsoleSink;

#[derive(Parser, Debug)]
#[command(name = "mangapress")]
#[command(about = "Download every chapter of a manga title as PDF documents")]
#[command(version)]
pub struct Cli {
    /// URL of any chapter of the title
    pub url: String,

    /// Directory to write PDFs to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of most recent chapters to leave out
    #[arg(short, long)]
    pub skip: Option<usize>,

    /// Path to the Chrome/Chromium executable
    #[arg(short, long)]
    pub driver_path: Option<PathBuf>,

    /// Config file (default: ./mangapress.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fail a chapter when any page image fails to download
    #[arg(long)]
    pub strict: bool,

    /// Print the chapters that would be downloaded and exit
    #[arg(long)]
    pub list: bool,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

impl Cli {
    /// Config file, then environment, then flags.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let config = Config::load(self.config.as_deref())?.with_env_overrides();
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(skip) = self.skip {
            config.skip_count = skip;
        }
        if let Some(path) = &self.driver_path {
            config.driver_path = Some(path.clone());
        }
        if self.strict {
            config.strict = true;
        }
        if self.headful {
            config.browser.headless = false;
        }
        config
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let site = SiteAdapter::for_url(&cli.url)?;

    let renderer = BrowserRenderer::new(config.browser.clone(), config.driver_path.as_deref())
        .context("Cannot start a browser; pass --driver-path or set CHROME_PATH")?;

    if cli.list {
        let mut pipeline = Pipeline::new(config, renderer, TracingSink)?;
        let chapters = pipeline.list(site, &cli.url).await?;
        println!(
            "{} {} chapters on {}",
            icons::info(),
            chapters.len(),
            style(site).bold()
        );
        for (i, chapter) in chapters.iter().enumerate() {
            println!("  {} {:>4}  {}", icons::bullet(), i + 1, chapter);
        }
        return Ok(());
    }

    let sink = ConsoleSink::new();
    let mut pipeline = Pipeline::new(config, renderer, &sink)?;
    pipeline.run(site, &cli.url).await?;
    Ok(())
}
