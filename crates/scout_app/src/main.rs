//! episode-scout: finds new episodes of the configured shows on the catalog
//! site and queues their best release in JDownloader.

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use scout_engine::{
    CatalogDriver, CatalogSettings, DownloadSubmitter, FetchSettings, JDownloaderSettings,
    JDownloaderSubmitter, ManifestSubmitter, PlexLibrary, PlexSettings, ReqwestFetcher,
    RunSummary, ShowOutcome,
};
use scout_logging::{level_for_verbosity, scout_error, scout_info, scout_warn};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::logging::LogDestination;

#[derive(Parser)]
#[command(name = "episode-scout")]
#[command(about = "Queue new episodes of your shows for download")]
#[command(version)]
struct Cli {
    /// RON configuration file
    #[arg(short, long, default_value = "config.ron")]
    config: PathBuf,

    /// Write candidates to a JSON manifest instead of submitting them
    #[arg(long)]
    dry_run: bool,

    /// Manifest directory for --dry-run
    #[arg(long, default_value = ".")]
    manifest_dir: PathBuf,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(
        LogDestination::from_log_file(cli.log_file.clone()),
        level_for_verbosity(cli.verbose),
    );

    match run(cli).await {
        Ok(summary) => {
            report(&summary);
            if summary.failed().next().is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            scout_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let config = AppConfig::load(&cli.config)?;
    let timeout = Duration::from_secs(config.general.request_timeout_secs);

    let library = PlexLibrary::new(PlexSettings {
        base_url: config.plex.base_url.clone(),
        token: config.plex.token.clone(),
        tv_library: config.plex.tv_library.clone(),
        request_timeout: timeout,
    })
    .context("cannot set up library client")?;

    let submitter: Arc<dyn DownloadSubmitter> = if cli.dry_run {
        scout_info!("Dry run: recording candidates in {:?}", cli.manifest_dir);
        Arc::new(ManifestSubmitter::new(
            cli.manifest_dir.clone(),
            Arc::new(|| chrono::Utc::now().to_rfc3339()),
        ))
    } else {
        Arc::new(
            JDownloaderSubmitter::new(JDownloaderSettings {
                api_url: config.jdownloader.api_url.clone(),
                autostart: config.jdownloader.autostart,
                extract_password: config.jdownloader.extract_password.clone(),
                request_timeout: timeout,
            })
            .context("cannot set up download manager client")?,
        )
    };

    let fetcher = ReqwestFetcher::new(FetchSettings {
        request_timeout: timeout,
        ..FetchSettings::default()
    })
    .context("cannot set up catalog client")?;

    let mut settings = CatalogSettings::new(
        config.catalog.index_url.clone(),
        config.sync_policy(),
        config.jdownloader.tv_shows_dir.clone(),
    );
    settings.max_pages = config.general.max_pages;
    settings.max_concurrent_shows = config.general.max_concurrent_shows;

    let driver = CatalogDriver::new(settings, Arc::new(fetcher), Arc::new(library), submitter);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            scout_warn!("Interrupted, finishing current pages");
            on_interrupt.cancel();
        }
    });

    let shows = config.get_tv_shows();
    scout_info!("Checking {} show(s)", shows.len());
    Ok(driver.run(&shows, &cancel).await)
}

fn report(summary: &RunSummary) {
    for show in &summary.shows {
        match &show.outcome {
            ShowOutcome::Completed(stop) => scout_info!(
                "{}: {} new episode(s) over {} page(s), {}",
                show.show,
                show.submitted.len(),
                show.pages,
                stop
            ),
            ShowOutcome::Failed(err) => scout_error!("{}: failed: {}", show.show, err),
        }
    }
    scout_info!(
        "{} episode(s) submitted, {} of {} show(s) failed",
        summary.submitted_count(),
        summary.failed().count(),
        summary.shows.len()
    );
}
