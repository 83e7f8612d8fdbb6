use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{App, Error, HttpResponse, Responder, get, web};

use crate::{api, db::DbPool};

#[get("/")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "Stock Market API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The full application: open CORS, request logging, trailing-slash
/// normalisation (`/stocks/` and `/stocks` hit the same route), health check
/// and the stock routes.
pub fn build_app(
    pool: DbPool,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Cors::permissive())
        .wrap(Logger::default())
        .wrap(NormalizePath::trim())
        .app_data(web::Data::new(pool))
        .service(health_check)
        .configure(api::config)
}
