//! Binary entrypoint for Waitboard.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use waitboard::cache::FreshnessCache;
use waitboard::feed::FeedClient;
use waitboard::tasks::{console, refresh};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "waitboard", about = "Theme-park wait times kiosk")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Print a one-shot wait-times summary and exit
    #[arg(long)]
    text_only: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("waitboard={}", level).parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = waitboard::config::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    cfg.validate().context("validating configuration")?;

    let groups = cfg.display_groups();
    info!(
        groups = groups.len(),
        refresh = %humantime::format_duration(cfg.refresh_interval),
        "configuration loaded"
    );

    let cache = Arc::new(FreshnessCache::new(
        groups.iter().map(|g| g.slug.clone()),
        cfg.stale_after,
    ));
    let client = FeedClient::new(cfg.feed_base_url.clone(), cfg.fetch_timeout)
        .context("building feed client")?;

    if cli.text_only {
        // One pass over every group, then a plain report. Exercises the same
        // feed + cache path as the kiosk loop.
        let mut fetches = JoinSet::new();
        for group in groups.clone() {
            let client = client.clone();
            let cache = Arc::clone(&cache);
            fetches.spawn(async move {
                refresh::refresh_group(&client, &cache, &group).await;
            });
        }
        while fetches.join_next().await.is_some() {}
        print!("{}", console::text_summary(&groups, &cache));
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let policy = refresh::RefreshPolicy {
        refresh_interval: cfg.refresh_interval,
        retry_delay: cfg.retry_delay,
        max_retries: cfg.max_retries,
    };

    let mut tasks = JoinSet::new();
    for group in groups.clone() {
        tasks.spawn(refresh::run(
            group,
            policy.clone(),
            client.clone(),
            Arc::clone(&cache),
            cancel.clone(),
        ));
    }

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received; shutting down");
                cancel.cancel();
            }
        });
    }

    console::run(
        groups,
        cfg.display_duration,
        cfg.transition_duration,
        Arc::clone(&cache),
        cancel.clone(),
    )
    .await?;

    cancel.cancel();
    while tasks.join_next().await.is_some() {}
    info!("shutdown complete");
    Ok(())
}
