use std::env;
use std::path::PathBuf;

/// Server configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind: String,
    pub port: u16,
    pub pool_size: u32,
    /// JSON file read by the importer.
    pub data_path: PathBuf,
    /// Import `data_path` when the server boots.
    pub import_on_startup: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| "stocks.db".to_string()),
            bind: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|s| s.parse().ok()).unwrap_or(8000),
            pool_size: get("DB_POOL_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(8),
            data_path: get("STOCK_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("stock_market_data.json")),
            import_on_startup: get("IMPORT_ON_STARTUP")
                .map(|s| parse_bool(&s))
                .unwrap_or(false),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
