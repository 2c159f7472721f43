use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use helion::{logging, shutdown};
use helion_config::DiscoveryKind;
use helion_core::catalog::Catalog;
use helion_core::finder::Finder;
use helion_core::ShutdownFlag;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

/// Watches a source directory (or transfer-agent manifest logs), moves new
/// files into the storage area, and opens a catalog entry for each.
#[derive(Parser, Debug)]
#[command(name = "helion-finder")]
struct Args {
    /// Path to the TOML configuration document.
    #[arg(long)]
    config: PathBuf,

    /// Overrides `log.filter` / `RUST_LOG` for this run.
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut validated = match helion_config::load_and_validate(&args.config) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(filter) = &args.log_filter {
        validated.log_filter = filter.clone();
    }
    logging::init(&validated.log_filter);

    let Some(finder_settings) = validated.finder else {
        error!("configuration has no [finder] section; nothing to run");
        return ExitCode::FAILURE;
    };

    let pool = match PgPoolOptions::new()
        .connect(&validated.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            error!(error = %err, "could not connect to the catalog database");
            return ExitCode::FAILURE;
        }
    };
    let catalog = Catalog::new(pool, validated.table_names);

    let shutdown_flag = ShutdownFlag::new();
    shutdown::install(shutdown_flag.clone());

    info!("helion-finder starting");
    let result = match finder_settings.discovery {
        DiscoveryKind::Walk(strategy) => {
            Finder::new(strategy, catalog, finder_settings.config)
                .run(&shutdown_flag)
                .await
        }
        DiscoveryKind::Manifest(strategy) => {
            Finder::new(strategy, catalog, finder_settings.config)
                .run(&shutdown_flag)
                .await
        }
    };

    match result {
        Ok(()) => {
            info!("helion-finder shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "helion-finder exited with an error");
            ExitCode::FAILURE
        }
    }
}
