use crate::{
    api::stocks::StockResponse, db::DbPool, error::AppError, services::stocks::StockService,
};
use actix_web::{HttpResponse, get, web};
use serde::Serialize;

#[derive(Serialize)]
pub struct DataResponse {
    pub data: Vec<StockResponse>,
}

/// Every record in insertion order, wrapped as `{"data": [...]}`
#[get("/data")]
pub async fn get_data(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let service = StockService::new(pool.get_ref().clone());
    let data = service.all()?.into_iter().map(StockResponse::from).collect();

    Ok(HttpResponse::Ok().json(DataResponse { data }))
}
