//! Tournament Service
//!
//! Entry point: loads configuration, freezes the template registry and
//! settles tournament request files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use tournament_service::{initialize_logging, load_configuration, ServiceState};

#[derive(Parser, Debug)]
#[command(name = "tournament-service", version, about = "Settle tournament payouts and calcuttas")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Settle a tournament request file
    Settle {
        /// Request JSON: tournament, standings and bids
        request: PathBuf,

        /// Write the result here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List registered payout templates
    Templates,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref()).context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;

    info!("Starting Tournament Service v{}", env!("CARGO_PKG_VERSION"));

    let state = ServiceState::new(config).await?;

    match cli.command {
        Command::Settle { request, output } => {
            if let Err(e) = state.settle_file(&request, output.as_deref()).await {
                error!("Settlement failed: {:#}", e);
                return Err(e);
            }
        }
        Command::Templates => {
            for template in state.templates() {
                let shares: Vec<String> = template
                    .place_shares()
                    .iter()
                    .enumerate()
                    .map(|(idx, share)| format!("{}={}", idx + 1, share))
                    .collect();
                println!("{:<12} {}", template.key, shares.join(" "));
            }
        }
    }

    Ok(())
}
