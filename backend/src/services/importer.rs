//! Bulk import of price records from a JSON file.
//!
//! Dates are strict: one bad date aborts the import before anything is
//! written. Numeric fields are lenient: an unparseable value is stored as
//! 0.0 and reported as a [`CoercionWarning`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    db::DbPool,
    models::NewStock,
    schema::stocks,
    services::coercion,
};
use diesel::prelude::*;
use diesel::r2d2::PoolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rows per INSERT statement; keeps each statement under SQLite's bound
/// parameter limit.
const INSERT_CHUNK: usize = 500;

/// One element of the input array, before coercion.
#[derive(Deserialize, Debug, Clone)]
pub struct RawStockRecord {
    pub date: String,
    #[serde(deserialize_with = "coercion::text")]
    pub trade_code: String,
    pub high: Value,
    pub low: Value,
    pub open: Value,
    pub close: Value,
    pub volume: Value,
}

/// A numeric field that could not be parsed and was stored as 0.0.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CoercionWarning {
    /// Zero-based position in the input array.
    pub record: usize,
    pub field: &'static str,
    pub value: String,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub warnings: Vec<CoercionWarning>,
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidDate { record: usize, value: String },
    Pool(PoolError),
    Database(diesel::result::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read import file: {e}"),
            Self::Json(e) => write!(f, "malformed import file: {e}"),
            Self::InvalidDate { record, value } => write!(
                f,
                "record {record}: invalid date {value:?}, expected YYYY-MM-DD"
            ),
            Self::Pool(e) => write!(f, "database connection error: {e}"),
            Self::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<PoolError> for ImportError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

impl From<diesel::result::Error> for ImportError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Database(e)
    }
}

/// Convert raw records into insertable rows, collecting numeric warnings.
pub fn prepare_rows(
    records: &[RawStockRecord],
) -> Result<(Vec<NewStock>, Vec<CoercionWarning>), ImportError> {
    let mut warnings = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (index, raw) in records.iter().enumerate() {
        let date = coercion::parse_date(&raw.date).map_err(|_| ImportError::InvalidDate {
            record: index,
            value: raw.date.clone(),
        })?;

        let mut number = |field: &'static str, value: &Value| {
            coercion::parse_json_number(value).unwrap_or_else(|_| {
                log::warn!(
                    "record {index} ({}): {field} value {value} is not a number, storing 0.0",
                    raw.trade_code
                );
                warnings.push(CoercionWarning {
                    record: index,
                    field,
                    value: value.to_string(),
                });
                0.0
            })
        };

        rows.push(NewStock {
            date,
            trade_code: raw.trade_code.clone(),
            high: number("high", &raw.high),
            low: number("low", &raw.low),
            open: number("open", &raw.open),
            close: number("close", &raw.close),
            volume: number("volume", &raw.volume),
        });
    }

    Ok((rows, warnings))
}

pub struct ImportService {
    pool: DbPool,
}

impl ImportService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Read a JSON array from `path` and import it. Expects the schema to
    /// exist already (see `db::run_migrations`).
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportSummary, ImportError> {
        let path = path.as_ref();
        log::info!("Importing stock records from {}", path.display());

        let file = File::open(path)?;
        let records: Vec<RawStockRecord> = serde_json::from_reader(BufReader::new(file))?;
        self.import_records(&records)
    }

    /// Insert every record in one transaction. Nothing is written if any
    /// record has a bad date or the insert fails.
    pub fn import_records(&self, records: &[RawStockRecord]) -> Result<ImportSummary, ImportError> {
        let (rows, warnings) = prepare_rows(records)?;

        let mut conn = self.pool.get()?;
        let imported = conn.transaction::<_, ImportError, _>(|conn| {
            let mut inserted = 0;
            for chunk in rows.chunks(INSERT_CHUNK) {
                inserted += diesel::insert_into(stocks::table)
                    .values(chunk)
                    .execute(conn)?;
            }
            Ok(inserted)
        })?;

        log::info!(
            "Imported {} rows ({} numeric values coerced to 0.0)",
            imported,
            warnings.len()
        );

        Ok(ImportSummary { imported, warnings })
    }
}
