use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::{debug, info};

mod cli;

use cli::Cli;
use ytxd::config::{self, Config};
use ytxd::fetcher::TranscriptFetcher;
use ytxd::routes::{AppState, router};
use ytxd::youtube::YouTubeProvider;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytxd.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytxd")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nConfig is read from: {}\nLogs are written to: {}",
        config::config_path().display(),
        log_dir().join("ytxd.log").display()
    )
}

fn load_config(cli: &Cli) -> Result<Config> {
    match cli.config {
        Some(ref path) => Config::load_from(path),
        // The default location is optional, and a broken file there should not stop the server
        None => Ok(Config::load().unwrap_or_else(|e| {
            eprintln!("Ignoring config {}: {e:#}", config::config_path().display());
            Config::default()
        })),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    setup_logging(cli.verbose)?;

    let config = load_config(&cli)?;

    // CLI flags take priority over the config file
    let host = cli.host.clone().unwrap_or_else(|| config.host().to_string());
    let port = cli.port.unwrap_or_else(|| config.port());
    let timeout = cli.timeout.map(Duration::from_secs).unwrap_or_else(|| config.timeout());
    let languages = if cli.languages.is_empty() {
        config.languages()
    } else {
        cli.languages.clone()
    };
    debug!("Resolved settings: host={host} port={port} timeout={timeout:?} languages={languages:?}");

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .wrap_err("failed to build HTTP client")?;

    let provider = Arc::new(YouTubeProvider::new(client));
    let fetcher = TranscriptFetcher::new(provider).with_timeout(timeout);
    let app = router(AppState::new(fetcher, languages));

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;

    info!("Listening on {addr}");
    eprintln!("ytxd listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    Ok(())
}
