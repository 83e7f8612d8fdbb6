use actix_web::web;

use crate::error;

pub mod data;
pub mod stocks;

pub fn config(cfg: &mut web::ServiceConfig) {
    // Extractor failures answer 422 instead of actix's default 400/404
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler));

    // Stock CRUD routes
    cfg.service(
        web::scope("/stocks")
            .service(stocks::list_stocks)
            .service(stocks::create_stock)
            .service(stocks::get_stock)
            .service(stocks::update_stock)
            .service(stocks::delete_stock),
    );

    // Whole-dataset snapshot for the table/chart frontend
    cfg.service(data::get_data);
}
