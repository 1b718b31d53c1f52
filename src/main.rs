//! txportal main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use txportal_api::{start_server, AppState};
use txportal_config::{Config, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "txportal")]
#[command(version = "0.1.0")]
#[command(about = "Search bank movements across Banco Plaza, Banco de Venezuela and Mercantil", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            eprintln!("{}", e.report());
            return Err(e).with_context(|| format!("Failed to load {}", args.config.display()));
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    if missing {
        log::warn!(
            target: "txportal",
            "Config file {} not found, using defaults",
            args.config.display()
        );
    }
    if let Err(e) = config.validate() {
        log::error!(target: "txportal", "{}", e.report());
        return Err(e).context("Invalid configuration");
    }
    log::info!(
        target: "txportal",
        "Config loaded: bind={}, timeout={}s, page size={}",
        config.bind_address(),
        config.http.timeout_secs,
        config.pagination.records_per_page
    );

    let state = AppState::from_config(config).context("Failed to initialize portal")?;

    let rt = Runtime::new()?;
    rt.block_on(start_server(state))
}
