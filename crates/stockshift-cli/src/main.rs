mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stockshift_core::{SortKey, UrgencyFilter};

#[derive(Debug, Parser)]
#[command(name = "stockshift-cli")]
#[command(about = "Inventory transfer suggestions for a store network")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print ranked transfer suggestions with summary stats
    Suggest {
        /// Network definition (stores, inventory, signals)
        #[arg(long, env = "STOCKSHIFT_NETWORK_PATH", default_value = "./config/network.yaml")]
        network: PathBuf,
        /// Only show one urgency tier (critical, high, medium, low, all)
        #[arg(long, default_value = "all")]
        urgency: UrgencyFilter,
        /// Case-insensitive product name filter
        #[arg(long)]
        search: Option<String>,
        /// Ordering: urgency, savings, distance, or score
        #[arg(long, default_value = "urgency")]
        sort: SortKey,
    },
    /// Write the filtered suggestions as CSV
    Export {
        #[arg(long, env = "STOCKSHIFT_NETWORK_PATH", default_value = "./config/network.yaml")]
        network: PathBuf,
        #[arg(long, default_value = "all")]
        urgency: UrgencyFilter,
        #[arg(long)]
        search: Option<String>,
        /// Destination file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print per-store inventory summaries
    Stores {
        #[arg(long, env = "STOCKSHIFT_NETWORK_PATH", default_value = "./config/network.yaml")]
        network: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // before parsing, so .env can supply clap's env-backed args
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    // Engine thresholds and rates come from STOCKSHIFT_* vars.
    let config = stockshift_core::load_app_config()?;
    let settings = &config.engine;
    tracing::debug!(?settings, "engine settings loaded");

    match cli.command {
        Commands::Suggest {
            network,
            urgency,
            search,
            sort,
        } => report::run_suggest(&network, settings, urgency, search.unwrap_or_default(), sort),
        Commands::Export {
            network,
            urgency,
            search,
            out,
        } => report::run_export(
            &network,
            settings,
            urgency,
            search.unwrap_or_default(),
            out.as_deref(),
        ),
        Commands::Stores { network } => report::run_stores(&network),
    }
}
