//! Health check endpoint

use actix_web::{get, web, HttpResponse, Responder};
use cas_auth::RestClient;

/// Reports which CAS server and service the gateway authenticates against.
/// The CAS server itself is not contacted.
#[get("/health")]
pub async fn health_check(client: web::Data<RestClient>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "cas_url": client.cas_url().as_str(),
        "service_url": client.service_url().as_str(),
    }))
}
