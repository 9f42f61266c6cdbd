//! Climate Service - HTTP API
//!
//! Serves precipitation, station and temperature queries over a
//! pre-populated climate store.
//!
//! Usage:
//!   cargo run --release -- --database-url sqlite:///data/hawaii.sqlite
//!   cargo run --release -- --config climate_service.toml --port 8080
//!
//! Environment:
//!   DATABASE_URL - store connection string (postgres://... or a SQLite path)
//!   RUST_LOG     - log filter (default: info)

use clap::Parser;
use climate_service::config::{self, Overrides};
use climate_service::db;
use climate_service::endpoint::{self, ApiContext};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "climate_service",
    version,
    about = "Read-only HTTP API over the Hawaii climate dataset"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut settings = match config::load_config(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    settings.apply(cli.overrides);
    if let Err(e) = settings.validate() {
        log::error!("Configuration error: {}", e);
        process::exit(1);
    }

    log::info!("Initializing climate service...");
    let store = match db::connect_with_validation(
        settings.database_url.as_deref(),
        settings.query_timeout(),
    ) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Initialization failed: {}", e);
            process::exit(1);
        }
    };
    let queries = settings.query_layer();
    log::info!(
        "Serving {} with cutoff {} and station {}",
        store.backend(),
        queries.cutoff_date(),
        queries.station_id()
    );

    let context = ApiContext::new(store, queries);
    if let Err(e) =
        endpoint::start_endpoint_server(&settings.listen_address(), context, settings.workers)
    {
        log::error!("Endpoint server error: {}", e);
        process::exit(1);
    }
}
