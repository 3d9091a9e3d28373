//! Authenticated principal endpoint
//!
//! GET /api/whoami
//! Echoes the CAS authentication response attached by the middleware.

use actix_web::{get, HttpResponse, Responder};
use cas_auth::AuthenticationResponse;

#[get("/whoami")]
pub async fn whoami(auth: AuthenticationResponse) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "user": &auth.user,
        "attributes": &auth.attributes,
        "authentication_date": auth.authentication_date().map(|date| date.to_rfc3339()),
        "new_login": auth.is_new_login(),
        "remembered_login": auth.is_remembered_login(),
    }))
}
