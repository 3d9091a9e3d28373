//! Integration tests for the RestAuth middleware
//!
//! These tests verify that the middleware:
//! - Challenges requests without usable Basic Authentication
//! - Runs granting ticket → service ticket → validation for every request
//! - Forwards to the wrapped handler only on success, with the principal attached
//! - Answers 401 when any stage fails

use crate::common::*;
use actix_web::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use cas_auth::{AuthenticationResponse, RestAuth};
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn echo(auth: AuthenticationResponse, calls: web::Data<AtomicUsize>) -> HttpResponse {
    calls.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().json(&auth)
}

fn authorized(uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header((AUTHORIZATION, basic_auth("alice", "s3cret")))
}

async fn mount_success_chain(cas: &MockCas, times: u64) {
    cas.grant("alice", "s3cret", "TGT-1", times).await;
    cas.issue("TGT-1", "ST-1", times).await;
    cas.validate(
        "serviceValidate",
        CANONICAL_SERVICE_URL,
        "ST-1",
        200,
        &success_xml("alice", &[("role", "admin"), ("role", "user")]),
        times,
    )
    .await;
}

#[actix_web::test]
async fn test_full_chain_attaches_principal() {
    let cas = MockCas::start().await;
    mount_success_chain(&cas, 1).await;

    let calls = web::Data::new(AtomicUsize::new(0));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    let res = test::call_service(&app, authorized("/reports").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["user"], "alice");
    assert_eq!(body["attributes"]["role"], serde_json::json!(["admin", "user"]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_missing_credentials_never_reach_cas() {
    let cas = MockCas::start().await;

    let calls = web::Data::new(AtomicUsize::new(0));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/reports").to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers().get(WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"CAS Protected Area\""
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(cas.received().await.is_empty());
}

#[actix_web::test]
async fn test_granting_ticket_failure_is_unauthorized() {
    let cas = MockCas::start().await;
    cas.reject_grant(401).await;
    cas.forbid_issue("TGT-1").await;

    let calls = web::Data::new(AtomicUsize::new(0));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    let res = test::call_service(&app, authorized("/reports").to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(WWW_AUTHENTICATE));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_service_ticket_failure_is_unauthorized() {
    let cas = MockCas::start().await;
    cas.grant("alice", "s3cret", "TGT-1", 1).await;
    Mock::given(method("POST"))
        .and(path("/cas/v1/tickets/TGT-1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("service not authorized"))
        .expect(1)
        .mount(&cas.server)
        .await;

    let calls = web::Data::new(AtomicUsize::new(0));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    let res = test::call_service(&app, authorized("/reports").to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_authentication_failure_document_is_unauthorized() {
    let cas = MockCas::start().await;
    cas.grant("alice", "s3cret", "TGT-1", 1).await;
    cas.issue("TGT-1", "ST-1", 1).await;
    cas.validate(
        "serviceValidate",
        CANONICAL_SERVICE_URL,
        "ST-1",
        200,
        &failure_xml("INVALID_TICKET", "Ticket ST-1 not recognized"),
        1,
    )
    .await;

    let calls = web::Data::new(AtomicUsize::new(0));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)).realm("Reports"))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    let res = test::call_service(&app, authorized("/reports").to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers().get(WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"Reports\""
    );
    let body = test::read_body(res).await;
    assert!(body.is_empty(), "failure detail must not reach the client");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_every_request_runs_the_full_chain() {
    let cas = MockCas::start().await;
    mount_success_chain(&cas, 2).await;

    let calls = web::Data::new(AtomicUsize::new(0));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    for _ in 0..2 {
        let res = test::call_service(&app, authorized("/reports").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cas.received().await.len(), 6);
}

#[actix_web::test]
async fn test_principal_does_not_outlive_its_request() {
    let cas = MockCas::start().await;
    mount_success_chain(&cas, 1).await;

    let calls = web::Data::new(AtomicUsize::new(0));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    let first = test::call_service(&app, authorized("/reports").to_request()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second =
        test::call_service(&app, test::TestRequest::get().uri("/reports").to_request()).await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_service_url_rendered_identically_on_issue_and_validate() {
    let cas = MockCas::start().await;
    mount_success_chain(&cas, 1).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AtomicUsize::new(0)))
            .wrap(RestAuth::new(cas.rest_client(SERVICE_URL)))
            .route("/reports", web::get().to(echo)),
    )
    .await;

    let res = test::call_service(&app, authorized("/reports").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let requests = cas.received().await;
    let issued = requests
        .iter()
        .find(|r| r.url.path() == "/cas/v1/tickets/TGT-1")
        .expect("service ticket request");
    let issued_service = url::form_urlencoded::parse(&issued.body)
        .find(|(k, _)| k == "service")
        .map(|(_, v)| v.into_owned());

    let validated = requests
        .iter()
        .find(|r| r.url.path() == "/cas/serviceValidate")
        .expect("validation request");
    let validated_service = validated
        .url
        .query_pairs()
        .find(|(k, _)| k == "service")
        .map(|(_, v)| v.into_owned());

    assert_eq!(issued_service.as_deref(), Some(CANONICAL_SERVICE_URL));
    assert_eq!(issued_service, validated_service);
}
