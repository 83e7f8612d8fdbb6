use crate::{
    db::DbPool,
    error::AppError,
    models::{NewStock, Stock, StockChangeset},
    schema::stocks,
    services::coercion::{self, LooseNumber},
};
use diesel::prelude::*;
use serde::Deserialize;

/// Full record as submitted by a client. Any `id` in the body is ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct StockInput {
    pub date: String,
    #[serde(deserialize_with = "coercion::text")]
    pub trade_code: String,
    pub high: LooseNumber,
    pub low: LooseNumber,
    pub open: LooseNumber,
    pub close: LooseNumber,
    pub volume: LooseNumber,
}

/// Partial record; absent (or null) fields are left unchanged.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct StockPatch {
    pub date: Option<String>,
    #[serde(default, deserialize_with = "coercion::optional_text")]
    pub trade_code: Option<String>,
    pub high: Option<LooseNumber>,
    pub low: Option<LooseNumber>,
    pub open: Option<LooseNumber>,
    pub close: Option<LooseNumber>,
    pub volume: Option<LooseNumber>,
}

fn number(field: &str, raw: &LooseNumber) -> Result<f64, AppError> {
    coercion::parse_number(raw).map_err(|e| AppError::Validation(format!("{field}: {e}")))
}

fn date(raw: &str) -> Result<chrono::NaiveDate, AppError> {
    coercion::parse_date(raw).map_err(|e| AppError::Validation(format!("date: {e}")))
}

impl StockInput {
    pub fn into_new_stock(self) -> Result<NewStock, AppError> {
        Ok(NewStock {
            date: date(&self.date)?,
            high: number("high", &self.high)?,
            low: number("low", &self.low)?,
            open: number("open", &self.open)?,
            close: number("close", &self.close)?,
            volume: number("volume", &self.volume)?,
            trade_code: self.trade_code,
        })
    }
}

impl StockPatch {
    pub fn into_changeset(self) -> Result<StockChangeset, AppError> {
        let opt = |field: &str, raw: &Option<LooseNumber>| {
            raw.as_ref().map(|v| number(field, v)).transpose()
        };

        Ok(StockChangeset {
            date: self.date.as_deref().map(date).transpose()?,
            high: opt("high", &self.high)?,
            low: opt("low", &self.low)?,
            open: opt("open", &self.open)?,
            close: opt("close", &self.close)?,
            volume: opt("volume", &self.volume)?,
            trade_code: self.trade_code,
        })
    }
}

/// CRUD access to the `stocks` table. Every call checks out its own pooled
/// connection, which goes back to the pool when the call returns.
pub struct StockService {
    pool: DbPool,
}

impl StockService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Records in insertion order, `skip` rows in, at most `limit` rows.
    /// Values past `i64::MAX` saturate, which SQLite treats as unbounded.
    pub fn list(&self, skip: u64, limit: u64) -> Result<Vec<Stock>, AppError> {
        let mut conn = self.pool.get()?;
        let rows = stocks::table
            .order(stocks::id.asc())
            .offset(i64::try_from(skip).unwrap_or(i64::MAX))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(Stock::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    pub fn all(&self) -> Result<Vec<Stock>, AppError> {
        let mut conn = self.pool.get()?;
        let rows = stocks::table
            .order(stocks::id.asc())
            .select(Stock::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    #[cfg(test)]
    pub fn count(&self) -> Result<i64, AppError> {
        let mut conn = self.pool.get()?;
        Ok(stocks::table.count().get_result(&mut conn)?)
    }

    pub fn get(&self, id: i32) -> Result<Stock, AppError> {
        let mut conn = self.pool.get()?;
        stocks::table
            .find(id)
            .select(Stock::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(AppError::NotFound(id))
    }

    pub fn create(&self, input: StockInput) -> Result<Stock, AppError> {
        let new_stock = input.into_new_stock()?;
        let mut conn = self.pool.get()?;

        let stock = conn.transaction::<_, AppError, _>(|conn| {
            Ok(diesel::insert_into(stocks::table)
                .values(&new_stock)
                .returning(Stock::as_returning())
                .get_result(conn)?)
        })?;

        log::debug!("Created stock {} ({} {})", stock.id, stock.trade_code, stock.date);
        Ok(stock)
    }

    pub fn update(&self, id: i32, patch: StockPatch) -> Result<Stock, AppError> {
        let changes = patch.into_changeset()?;
        let mut conn = self.pool.get()?;

        conn.transaction::<_, AppError, _>(|conn| {
            let existing = stocks::table
                .find(id)
                .select(Stock::as_select())
                .first(conn)
                .optional()?
                .ok_or(AppError::NotFound(id))?;

            if changes.is_empty() {
                return Ok(existing);
            }

            Ok(diesel::update(stocks::table.find(id))
                .set(&changes)
                .returning(Stock::as_returning())
                .get_result(conn)?)
        })
    }

    /// Remove a record and hand it back.
    pub fn delete(&self, id: i32) -> Result<Stock, AppError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, AppError, _>(|conn| {
            let existing = stocks::table
                .find(id)
                .select(Stock::as_select())
                .first(conn)
                .optional()?
                .ok_or(AppError::NotFound(id))?;

            diesel::delete(stocks::table.find(id)).execute(conn)?;
            Ok(existing)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::NaiveDate;
    use serde_json::json;

    fn input(trade_code: &str, volume: serde_json::Value) -> StockInput {
        serde_json::from_value(json!({
            "date": "2012-01-05",
            "trade_code": trade_code,
            "high": 10,
            "low": "5",
            "open": 6.0,
            "close": "9",
            "volume": volume,
        }))
        .unwrap()
    }

    #[test]
    fn test_create_coerces_fields_and_assigns_id() {
        let service = StockService::new(test_pool());
        let stock = service.create(input("ABC", json!("123.4"))).unwrap();

        assert!(stock.id > 0);
        assert_eq!(stock.date, NaiveDate::from_ymd_opt(2012, 1, 5).unwrap());
        assert_eq!(stock.high, 10.0);
        assert_eq!(stock.low, 5.0);
        assert_eq!(stock.volume, 123.4);
        assert_eq!(service.get(stock.id).unwrap(), stock);
    }

    #[test]
    fn test_create_rejects_unparseable_number() {
        let service = StockService::new(test_pool());
        let result = service.create(input("ABC", json!("not-a-number")));

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_bad_date() {
        let service = StockService::new(test_pool());
        let mut bad = input("ABC", json!(1));
        bad.date = "05-01-2012".to_string();

        assert!(matches!(service.create(bad), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_list_paginates_in_insertion_order() {
        let service = StockService::new(test_pool());
        for code in ["A", "B", "C", "D", "E"] {
            service.create(input(code, json!(1))).unwrap();
        }

        let codes = |rows: Vec<Stock>| rows.into_iter().map(|s| s.trade_code).collect::<Vec<_>>();
        assert_eq!(codes(service.list(0, 100).unwrap()), ["A", "B", "C", "D", "E"]);
        assert_eq!(codes(service.list(1, 2).unwrap()), ["B", "C"]);
        assert_eq!(codes(service.list(4, 10).unwrap()), ["E"]);
        assert!(service.list(5, 10).unwrap().is_empty());
        assert!(service.list(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let service = StockService::new(test_pool());
        let original = service.create(input("ABC", json!(1000))).unwrap();

        let patch: StockPatch = serde_json::from_value(json!({"close": "9.5", "id": 999})).unwrap();
        let updated = service.update(original.id, patch).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.close, 9.5);
        assert_eq!(Stock { close: 9.5, ..original.clone() }, updated);
        assert_eq!(service.get(original.id).unwrap(), updated);
    }

    #[test]
    fn test_update_rejects_bad_field_without_writing() {
        let service = StockService::new(test_pool());
        let original = service.create(input("ABC", json!(1000))).unwrap();

        let patch: StockPatch =
            serde_json::from_value(json!({"volume": "x", "close": 1})).unwrap();
        assert!(matches!(
            service.update(original.id, patch),
            Err(AppError::Validation(_))
        ));
        assert_eq!(service.get(original.id).unwrap(), original);
    }

    #[test]
    fn test_create_accepts_numeric_trade_code() {
        let service = StockService::new(test_pool());
        let stock = service.create(input("ABC", json!(1))).unwrap();
        assert_eq!(stock.trade_code, "ABC");

        let numeric: StockInput = serde_json::from_value(json!({
            "date": "2012-01-05", "trade_code": 1234, "high": 1, "low": 1,
            "open": 1, "close": 1, "volume": 1
        }))
        .unwrap();
        assert_eq!(service.create(numeric).unwrap().trade_code, "1234");
    }

    #[test]
    fn test_list_with_huge_limit() {
        let service = StockService::new(test_pool());
        service.create(input("ABC", json!(1))).unwrap();
        assert_eq!(service.list(0, u64::MAX).unwrap().len(), 1);
        assert!(service.list(u64::MAX, 1).unwrap().is_empty());
    }

    #[test]
    fn test_update_with_empty_patch_returns_record() {
        let service = StockService::new(test_pool());
        let original = service.create(input("ABC", json!(1))).unwrap();

        let updated = service.update(original.id, StockPatch::default()).unwrap();
        assert_eq!(updated, original);
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let service = StockService::new(test_pool());
        service.create(input("ABC", json!(1))).unwrap();

        let patch = StockPatch {
            trade_code: Some("XYZ".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update(404, patch), Err(AppError::NotFound(404))));
        assert_eq!(service.list(0, 10).unwrap()[0].trade_code, "ABC");
    }

    #[test]
    fn test_delete_returns_removed_record() {
        let service = StockService::new(test_pool());
        let stock = service.create(input("ABC", json!(1))).unwrap();

        assert_eq!(service.delete(stock.id).unwrap(), stock);
        assert!(matches!(service.get(stock.id), Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(stock.id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_all_returns_every_record() {
        let service = StockService::new(test_pool());
        for code in ["A", "B", "C"] {
            service.create(input(code, json!(1))).unwrap();
        }
        assert_eq!(service.all().unwrap().len(), 3);
        assert_eq!(service.count().unwrap(), 3);
    }
}
