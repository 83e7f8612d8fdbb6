use crate::{
    db::DbPool,
    error::AppError,
    models::Stock,
    services::stocks::{StockInput, StockPatch, StockService},
};
use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct PaginationQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    100
}

/// Read-only view of a stored record.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StockResponse {
    pub id: i32,
    pub date: NaiveDate,
    pub trade_code: String,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<Stock> for StockResponse {
    fn from(stock: Stock) -> Self {
        Self {
            id: stock.id,
            date: stock.date,
            trade_code: stock.trade_code,
            high: stock.high,
            low: stock.low,
            open: stock.open,
            close: stock.close,
            volume: stock.volume,
        }
    }
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

// ============================================================================
// Endpoints
// ============================================================================

/// List stocks in insertion order (`skip` defaults to 0, `limit` to 100)
#[get("")]
pub async fn list_stocks(
    pool: web::Data<DbPool>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let service = StockService::new(pool.get_ref().clone());
    let stocks: Vec<StockResponse> = service
        .list(query.skip, query.limit)?
        .into_iter()
        .map(StockResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(stocks))
}

#[get("/{stock_id}")]
pub async fn get_stock(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let service = StockService::new(pool.get_ref().clone());
    let stock = service.get(path.into_inner())?;

    Ok(HttpResponse::Ok().json(StockResponse::from(stock)))
}

/// Create a stock from a full record; numeric fields may be strings
#[post("")]
pub async fn create_stock(
    pool: web::Data<DbPool>,
    body: web::Json<StockInput>,
) -> Result<HttpResponse, AppError> {
    let service = StockService::new(pool.get_ref().clone());
    let stock = service.create(body.into_inner())?;

    Ok(HttpResponse::Ok().json(StockResponse::from(stock)))
}

/// Partially update a stock; only fields present in the body change
#[put("/{stock_id}")]
pub async fn update_stock(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<StockPatch>,
) -> Result<HttpResponse, AppError> {
    let service = StockService::new(pool.get_ref().clone());
    let stock = service.update(path.into_inner(), body.into_inner())?;

    Ok(HttpResponse::Ok().json(StockResponse::from(stock)))
}

#[delete("/{stock_id}")]
pub async fn delete_stock(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let service = StockService::new(pool.get_ref().clone());
    let removed = service.delete(path.into_inner())?;
    log::info!("Deleted stock {} ({} {})", removed.id, removed.trade_code, removed.date);

    Ok(HttpResponse::Ok().json(DeleteResponse { ok: true }))
}

// ============================================================================
// Tests
// ============================================================================
