use actix_web::HttpServer;

use stock_api::{app, config::AppConfig, db, services::importer::ImportService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();

    // DB Pool initialization
    let pool = db::init_pool(&config.database_url, config.pool_size).map_err(|e| {
        log::error!("Failed to create database pool for {}: {}", config.database_url, e);
        std::io::Error::other(e)
    })?;

    db::run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run database migrations: {}", e);
        std::io::Error::other(e)
    })?;

    if config.import_on_startup {
        match ImportService::new(pool.clone()).import_file(&config.data_path) {
            Ok(summary) => log::info!(
                "Startup import: {} rows from {} ({} warnings)",
                summary.imported,
                config.data_path.display(),
                summary.warnings.len()
            ),
            Err(e) => log::error!("Startup import failed: {}", e),
        }
    }

    log::info!(
        "Starting Stock Market API at http://{}:{}",
        config.bind,
        config.port
    );

    HttpServer::new(move || app::build_app(pool.clone()))
        .bind((config.bind.as_str(), config.port))?
        .run()
        .await
}
