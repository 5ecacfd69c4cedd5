use anyhow::Result;
use clap::{Parser, Subcommand};
use skinscan::{
    config,
    image::ImageAsset,
    pipeline::Analyzer,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "skinscan", about = "Analyze a skin photo and fetch diet recommendations")]
struct Cli {
    /// Path to the YAML configuration file (default: $CONFIG_PATH or config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload an image, wait for the diagnosis and fetch recommendations
    Analyze {
        /// Image picked from the gallery or captured by the camera
        image: PathBuf,

        /// Known allergies, comma-separated (e.g. "peanuts, dairy")
        #[arg(long, default_value = "")]
        allergies: String,
    },
    /// Check that the analysis service is reachable
    Health,
}

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

/// Usage errors (no image, unreadable file) exit with 2, service failures with 1.
fn exit_code(err: &skinscan::Error) -> i32 {
    if err.is_input_error() { 2 } else { 1 }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging setup)
    let loaded = match &cli.config {
        Some(path) => config::load_from(path).await,
        None => config::load().await,
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Determine log level: environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logs.level.clone());

    if let Err(e) = validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!("Configuration loaded, service at {}", config.service.base_url);

    let mut analyzer = Analyzer::new(&config)?;

    match cli.command {
        Command::Health => match analyzer.client().health().await {
            Ok(status) => println!("{}", status),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        Command::Analyze { image, allergies } => {
            let cancel = CancellationToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling analysis");
                    ctrl_c_token.cancel();
                }
            });

            let asset = match ImageAsset::from_path(&image).await {
                Ok(asset) => Some(asset),
                Err(skinscan::Error::NoImageSelected) => None,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(exit_code(&e));
                }
            };

            if let Some(asset) = &asset {
                if !asset.is_accepted_by_service() {
                    warn!(
                        "'{}' is not a PNG or JPEG image, the service may reject it",
                        asset.filename
                    );
                }
            }

            match analyzer.analyze(asset, &allergies, &cancel).await {
                Ok(outcome) => {
                    println!("{}", serde_json::to_string_pretty(&outcome.payload())?);
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(exit_code(&e));
                }
            }
        }
    }

    Ok(())
}
