//! admirror - Adblock filter-list mirror and consolidation tool.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use admirror::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Update {
            config,
            output_dir,
            max_concurrent,
            filter,
            lint,
        } => {
            admirror::commands::update::run(&config, &output_dir, max_concurrent, filter, lint)
                .await
        }
        Commands::Dedupe { lists_dir } => admirror::commands::dedupe::run(&lists_dir),
        Commands::Migrate { lists_dir } => admirror::commands::migrate::run(&lists_dir),
        Commands::Audit { lists_dir } => admirror::commands::audit::run(&lists_dir),
        Commands::Version => {
            println!("admirror {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
