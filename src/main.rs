use anyhow::{Context, Result};
use clap::Parser;
use posto::{util, web, Config, PostoCore, WebAppState};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

/// Saved HTTP requests in nested collections, replayed on demand.
#[derive(Debug, Parser)]
#[command(name = "posto", version, about)]
struct Cli {
    /// Data directory (defaults to ~/.posto)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Address to bind the API to (overrides config.toml)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the API to (overrides config.toml)
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir);

    let mut config = Config::load();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Initialize logging to file (~/.posto/logs/posto.log)
    fs::create_dir_all(util::logs_dir())?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log.level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let server = config.server.clone();
    let core = PostoCore::open_default(config).context("Failed to open database")?;
    tracing::info!(database = ?core.database(), "Posto ready");
    eprintln!("posto listening on http://{}:{}", server.host, server.port);

    web::run_server(WebAppState::new(core), &server).await
}
