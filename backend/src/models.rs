use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::stocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Stock {
    pub id: i32,
    pub date: NaiveDate,
    pub trade_code: String,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::stocks)]
pub struct NewStock {
    pub date: NaiveDate,
    pub trade_code: String,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

/// Partial update of a stock row. `None` fields are left untouched.
#[derive(AsChangeset, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = crate::schema::stocks)]
pub struct StockChangeset {
    pub date: Option<NaiveDate>,
    pub trade_code: Option<String>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl StockChangeset {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.trade_code.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.open.is_none()
            && self.close.is_none()
            && self.volume.is_none()
    }
}
