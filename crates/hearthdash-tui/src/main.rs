//! `hearthdash`: terminal dashboard for home-automation devices.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive device data from
//! `hearthdash-core`'s [`DeviceStream`](hearthdash_core::DeviceStream).
//! Pages of widget tiles are laid out on a responsive grid; `e` switches
//! to edit mode for rearranging, adding, and removing widgets.
//!
//! Logs are written to a file (default `/tmp/hearthdash.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hearthdash_config::Config;
use hearthdash_core::{Controller, DashboardModel};

use crate::app::App;

/// Terminal dashboard for home-automation devices.
#[derive(Parser, Debug)]
#[command(name = "hearthdash", version, about)]
struct Cli {
    /// Device API base URL (e.g., http://hub.local:8080/api)
    #[arg(short = 'u', long, env = "HEARTHDASH_URL")]
    url: Option<String>,

    /// Bearer token sent with every request
    #[arg(short = 't', long, env = "HEARTHDASH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file (defaults to the platform config dir)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Layout file (overrides `layout_file` from the config)
    #[arg(short = 'l', long)]
    layout: Option<PathBuf>,

    /// Seconds between device refreshes
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Store the given --token in the system keyring and exit
    #[arg(long, requires = "token")]
    store_token: bool,

    /// Log file path (defaults to /tmp/hearthdash.log)
    #[arg(long, default_value = "/tmp/hearthdash.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr while the
/// terminal is in raw mode. The guard must live until exit so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hearthdash={log_level},hearthdash_core={log_level},hearthdash_config={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("hearthdash.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file merged with environment, then CLI flags on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => hearthdash_config::load_config_from(path),
        None => hearthdash_config::load_config(),
    }
    .wrap_err("failed to load configuration")?;

    if let Some(ref url) = cli.url {
        cfg.api_url = Some(url.clone());
    }
    if let Some(ref token) = cli.token {
        cfg.token = Some(token.clone());
        cfg.token_env = None;
        cfg.keyring = false;
    }
    if let Some(secs) = cli.poll_interval {
        cfg.poll_interval_secs = secs;
    }
    if cli.insecure {
        cfg.insecure = true;
    }
    if let Some(ref layout) = cli.layout {
        cfg.layout_file = Some(layout.clone());
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    if cli.store_token {
        if let Some(ref token) = cli.token {
            hearthdash_config::store_token(token).wrap_err("failed to store token")?;
            println!("token stored in the system keyring");
        }
        return Ok(());
    }

    let cfg = load_config(&cli)?;
    let dashboard_config =
        hearthdash_config::to_dashboard_config(&cfg).wrap_err("invalid configuration")?;
    let layout_path = hearthdash_config::layout_path(&cfg);
    let dashboard = hearthdash_config::load_layout(&layout_path)
        .wrap_err_with(|| format!("failed to load layout from {}", layout_path.display()))?;

    info!(
        url = %dashboard_config.api_url,
        layout = %layout_path.display(),
        pages = dashboard.pages.len(),
        "starting hearthdash"
    );

    let controller = Controller::new(dashboard_config).wrap_err("failed to build API client")?;
    let mut app = App::new(controller, DashboardModel::new(dashboard), layout_path);
    app.run().await?;

    Ok(())
}
