//! Mock CAS server for integration testing

use cas_auth::{CasConfig, RestClient};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// CAS context path mounted on the mock server
pub const CAS_PATH: &str = "/cas";

/// A wiremock server answering the CAS REST endpoints
pub struct MockCas {
    pub server: MockServer,
}

impl MockCas {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mocked CAS server
    pub fn cas_url(&self) -> Url {
        Url::parse(&format!("{}{}", self.server.uri(), CAS_PATH)).unwrap()
    }

    /// Client for `service_url` talking to this server
    pub fn rest_client(&self, service_url: &str) -> RestClient {
        RestClient::new(
            reqwest::Client::new(),
            self.cas_url(),
            Url::parse(service_url).unwrap(),
        )
    }

    /// Client built from a [`CasConfig`] whose transport deadline is `timeout`
    pub fn configured_client(&self, service_url: &str, timeout: Duration) -> RestClient {
        let mut config = CasConfig::new(self.cas_url(), Url::parse(service_url).unwrap());
        config.timeout = timeout;
        RestClient::from_config(&config).unwrap()
    }

    /// `POST /v1/tickets` answers 201 for `tgt`, but only after `delay`
    pub async fn grant_after(&self, delay: Duration, tgt: &str) {
        let location = format!("{}{}/v1/tickets/{}", self.server.uri(), CAS_PATH, tgt);
        Mock::given(method("POST"))
            .and(path(format!("{}/v1/tickets", CAS_PATH)))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", location.as_str())
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// `POST /v1/tickets` for `username` answers 201 with a location for `tgt`
    pub async fn grant(&self, username: &str, password: &str, tgt: &str, times: u64) {
        let location = format!("{}{}/v1/tickets/{}", self.server.uri(), CAS_PATH, tgt);
        Mock::given(method("POST"))
            .and(path(format!("{}/v1/tickets", CAS_PATH)))
            .and(body_string_contains(format!("username={}", username)))
            .and(body_string_contains(format!("password={}", password)))
            .respond_with(ResponseTemplate::new(201).insert_header("Location", location.as_str()))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// `POST /v1/tickets` answers `status` for every request
    pub async fn reject_grant(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("{}/v1/tickets", CAS_PATH)))
            .respond_with(ResponseTemplate::new(status).set_body_string("error.authentication.credentials.bad"))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// `POST /v1/tickets/{tgt}` answers 200 with `st`
    pub async fn issue(&self, tgt: &str, st: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("{}/v1/tickets/{}", CAS_PATH, tgt)))
            .respond_with(ResponseTemplate::new(200).set_body_string(st))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// `POST /v1/tickets/{tgt}` must never be called
    pub async fn forbid_issue(&self, tgt: &str) {
        Mock::given(method("POST"))
            .and(path(format!("{}/v1/tickets/{}", CAS_PATH, tgt)))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// `GET {endpoint}?service=..&ticket={st}` answers `status` with `body`
    pub async fn validate(&self, endpoint: &str, service: &str, st: &str, status: u16, body: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("{}/{}", CAS_PATH, endpoint)))
            .and(query_param("service", service))
            .and(query_param("ticket", st))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Requests received so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

/// CAS 2 success document for `user` with `(name, value)` attributes
pub fn success_xml(user: &str, attributes: &[(&str, &str)]) -> String {
    let attributes: String = attributes
        .iter()
        .map(|(name, value)| format!("<cas:{0}>{1}</cas:{0}>", name, value))
        .collect();

    format!(
        r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
    <cas:authenticationSuccess>
        <cas:user>{}</cas:user>
        <cas:attributes>{}</cas:attributes>
    </cas:authenticationSuccess>
</cas:serviceResponse>"#,
        user, attributes
    )
}

/// CAS 2 failure document
pub fn failure_xml(code: &str, description: &str) -> String {
    format!(
        r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
    <cas:authenticationFailure code="{}">{}</cas:authenticationFailure>
</cas:serviceResponse>"#,
        code, description
    )
}
