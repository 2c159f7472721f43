use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use helion::{logging, plugins, shutdown};
use helion_core::catalog::Catalog;
use helion_core::ingester::Ingester;
use helion_core::ShutdownFlag;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

/// Selects cataloged files by status, dispatches them through a worker pool
/// running the configured ingest plugin, and records the outcome.
#[derive(Parser, Debug)]
#[command(name = "helion-ingester")]
struct Args {
    /// Path to the TOML configuration document.
    #[arg(long)]
    config: PathBuf,

    /// Overrides `log.filter` / `RUST_LOG` for this run.
    #[arg(long)]
    log_filter: Option<String>,

    /// Forces a single batch and exit, regardless of `ingester.daemon`.
    #[arg(long)]
    one_shot: bool,
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

    let Some(mut ingester_settings) = validated.ingester else {
        error!("configuration has no [ingester] section; nothing to run");
        return ExitCode::FAILURE;
    };
    if args.one_shot {
        ingester_settings.config.daemon = false;
    }

    let plugin_factory = match plugins::build(&ingester_settings.plugin_name, &ingester_settings.plugin_config) {
        Ok(factory) => factory,
        Err(err) => {
            error!(error = %err, "configuration error");
            return ExitCode::FAILURE;
        }
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

    let ingester = match Ingester::new(catalog, plugin_factory, ingester_settings.config) {
        Ok(ingester) => ingester,
        Err(err) => {
            error!(error = %err, "invalid ingester configuration");
            return ExitCode::FAILURE;
        }
    };

    let shutdown_flag = ShutdownFlag::new();
    shutdown::install(shutdown_flag.clone());

    info!("helion-ingester starting");
    match ingester.run(&shutdown_flag).await {
        Ok(()) => {
            info!("helion-ingester shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "helion-ingester exited with an error");
            ExitCode::FAILURE
        }
    }
}
