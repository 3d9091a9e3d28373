//! CAS Gateway Server
//!
//! Serves `/api/*` behind HTTP Basic Authentication checked against a CAS
//! server through the REST protocol. `/health` stays open.

mod config;
mod routes;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;
use cas_auth::{RestAuth, RestClient};
use config::Config;
use std::sync::Arc;
use tracing::info;

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(config.json_logs);

    info!(
        cas_url = %config.cas.cas_url,
        service_url = %config.cas.service_url,
        "Configuration loaded"
    );

    // One client for all workers; it holds no per-request state
    let client = Arc::new(RestClient::from_config(&config.cas)?);
    let realm = config.cas.realm.clone();

    info!("Starting CAS gateway on {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::from(Arc::clone(&client)))
            .service(routes::health::health_check)
            .service(
                web::scope("/api")
                    .wrap(RestAuth::with_shared_client(Arc::clone(&client)).realm(&realm))
                    .service(routes::whoami::whoami),
            )
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    Ok(())
}
