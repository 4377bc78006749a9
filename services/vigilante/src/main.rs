//! Vigilante CLI
//!
//! Command-line interface for the service health poller.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use vigilante::{load_config, Config};

#[derive(Parser)]
#[command(name = "vigilante")]
#[command(about = "Service health poller with an HTML status dashboard")]
#[command(version)]
struct Args {
    /// Run a single check round and exit (0 if all healthy, 1 otherwise)
    #[arg(long)]
    once: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file and DASHBOARD_PORT)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn load(args: &Args) -> vigilante::Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.apply_env_overrides()?;

    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: once={}, config={:?}, dashboard_port={:?}, log_level={:?}",
        args.once,
        args.config,
        args.dashboard_port,
        args.log_level
    );

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    tracing::debug!(
        "Services: {}, critical: {}, webhook: {}",
        config.services.len(),
        config.services.iter().filter(|s| s.critical).count(),
        config.alerts.webhook_url.is_some()
    );

    if args.once {
        tracing::info!("Mode: single run");
        return match vigilante::run_once(config).await {
            Ok(summary) if summary.all_healthy() => ExitCode::SUCCESS,
            Ok(_) => ExitCode::from(1),
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::from(2)
            }
        };
    }

    tracing::info!("Mode: continuous monitoring");
    match vigilante::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
