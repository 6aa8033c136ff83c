mod logging;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use harvest_logging::harvest_info;
use log::LevelFilter;
use release_notes_engine::{
    Harvester, NotesCache, ReleasesConfig, ReqwestFetcher, DEFAULT_GITHUB_API_BASE,
};

use crate::progress::ConsoleProgress;

#[derive(Debug, Parser)]
#[command(
    name = "release-notes",
    about = "Fetch language release notes and cache them as Markdown"
)]
struct Cli {
    /// Release list and per-language URL sources
    #[arg(short, long, default_value = "releases.json")]
    config: PathBuf,
    /// Cache file to overwrite with the fetched notes
    #[arg(short, long, default_value = "release-notes-cache.json")]
    output: PathBuf,
    /// Base URL of the GitHub REST API
    #[arg(long, default_value = DEFAULT_GITHUB_API_BASE)]
    github_api_base: String,
    /// Also write debug logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log debug detail to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    logging::initialize(level, cli.log_file.as_deref());

    let config = ReleasesConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    harvest_info!(
        "Loaded {} languages and {} release lists from {:?}",
        config.languages.len(),
        config.releases.len(),
        cli.config
    );

    let harvester = Harvester::new(Arc::new(ReqwestFetcher::default()))
        .with_github_api_base(cli.github_api_base);
    let mut cache = NotesCache::new();

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(harvester.harvest(&config, &mut cache, &ConsoleProgress));

    let path = cache
        .save(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    print!("{}", progress::summary(cache.len(), &path.display().to_string()));
    Ok(())
}
