//! admissions CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "admissions", version, about = "Multi-step enrollment wizard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive enrollment wizard
    Enroll {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use a seeded in-memory store instead of the configured backend
        #[arg(long)]
        demo: bool,

        /// Ask for the course on the registration form instead of a separate step
        #[arg(long)]
        compact: bool,
    },

    /// Print the active assessment questions in display order
    Questions {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use a seeded in-memory store instead of the configured backend
        #[arg(long)]
        demo: bool,
    },

    /// Print programs and courses with their availability
    Catalog {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check the store configuration and connectivity
    Check {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter admissions.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("admissions=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Enroll {
            config,
            demo,
            compact,
        } => commands::enroll::execute(config, demo, compact).await,
        Commands::Questions { config, demo } => commands::questions::execute(config, demo).await,
        Commands::Catalog { config } => commands::catalog::execute(config),
        Commands::Check { config } => commands::check::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
