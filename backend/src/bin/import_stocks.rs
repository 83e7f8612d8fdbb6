//! Import Stocks - loads a JSON price file into the database on demand
//!
//! Usage: import_stocks [path]
//!
//! The path defaults to `STOCK_DATA_PATH` (or `stock_market_data.json`).
//! Migrations are applied first, so the command works on a fresh database.
//!
//! Environment variables:
//!   DATABASE_URL    - SQLite database path (default: stocks.db)
//!   STOCK_DATA_PATH - JSON file to import when no path is given

use std::path::PathBuf;
use std::process;

use stock_api::config::AppConfig;
use stock_api::db;
use stock_api::services::importer::ImportService;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_path.clone());

    let pool = match db::init_pool(&config.database_url, 1) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to open database {}: {}", config.database_url, e);
            process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&pool) {
        log::error!("Failed to run database migrations: {}", e);
        process::exit(1);
    }

    match ImportService::new(pool).import_file(&path) {
        Ok(summary) => log::info!(
            "Imported {} rows from {} ({} warnings)",
            summary.imported,
            path.display(),
            summary.warnings.len()
        ),
        Err(e) => {
            log::error!("Import from {} failed: {}", path.display(), e);
            process::exit(1);
        }
    }
}
