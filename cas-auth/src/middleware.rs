//! HTTP Basic Authentication over the CAS REST protocol
//!
//! [`RestAuth`] is an actix-web middleware. For every request it reads the
//! Basic Authentication credentials, runs them through [`RestClient`] and, on
//! success, stores the [`AuthenticationResponse`] in the request extensions
//! before calling the wrapped service. Every failure ends in the same 401
//! challenge; the wrapped service is not called.
//!
//! Log events carry the method, path and error only. Neither credential
//! field is ever recorded.
//!
//! ```ignore
//! App::new().service(
//!     web::scope("/api")
//!         .wrap(RestAuth::new(client))
//!         .route("/whoami", web::get().to(whoami)),
//! )
//! ```

use crate::client::RestClient;
use crate::config::{CasConfig, DEFAULT_REALM};
use crate::credentials::Credentials;
use crate::response::{Attributes, AuthenticationResponse};
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ErrorUnauthorized;
use actix_web::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{info, warn};

/// Middleware factory authenticating requests against CAS
#[derive(Clone)]
pub struct RestAuth {
    client: Arc<RestClient>,
    realm: Arc<str>,
}

impl RestAuth {
    /// Wrap services with CAS authentication using `client`
    pub fn new(client: RestClient) -> Self {
        Self::with_shared_client(Arc::new(client))
    }

    /// Use an already shared client
    pub fn with_shared_client(client: Arc<RestClient>) -> Self {
        Self {
            client,
            realm: Arc::from(DEFAULT_REALM),
        }
    }

    /// Build the client and realm from configuration
    pub fn from_config(config: &CasConfig) -> crate::error::Result<Self> {
        Ok(Self::new(RestClient::from_config(config)?).realm(&config.realm))
    }

    /// Advertise a different realm in the challenge
    pub fn realm(mut self, realm: impl AsRef<str>) -> Self {
        self.realm = Arc::from(realm.as_ref());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RestAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RestAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RestAuthMiddleware {
            service: Rc::new(service),
            client: Arc::clone(&self.client),
            realm: Arc::clone(&self.realm),
        }))
    }
}

/// Service produced by [`RestAuth`]
pub struct RestAuthMiddleware<S> {
    service: Rc<S>,
    client: Arc<RestClient>,
    realm: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for RestAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let client = Arc::clone(&self.client);
        let realm = Arc::clone(&self.realm);

        Box::pin(async move {
            info!(method = %req.method(), path = %req.path(), "cas: handling request");

            let Some(credentials) = basic_credentials(&req) else {
                info!(path = %req.path(), "cas: no basic authentication credentials");
                return Ok(req.into_response(challenge(&realm)).map_into_right_body());
            };

            match client.authenticate(&credentials).await {
                Ok(response) => {
                    req.extensions_mut().insert(response);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    warn!(
                        method = %req.method(),
                        path = %req.path(),
                        kind = ?e.kind(),
                        retryable = e.is_retryable(),
                        mapped_status = e.status_code(),
                        error = %e,
                        "cas: rest authentication failed"
                    );
                    Ok(req.into_response(challenge(&realm)).map_into_right_body())
                }
            }
        })
    }
}

fn basic_credentials(req: &ServiceRequest) -> Option<Credentials> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(Credentials::from_basic_authorization)
}

/// 401 response carrying the Basic Authentication challenge
pub fn challenge(realm: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", realm)))
        .finish()
}

/// Authentication response attached to `req` by [`RestAuth`]
pub fn authentication_response(req: &HttpRequest) -> Option<AuthenticationResponse> {
    req.extensions().get::<AuthenticationResponse>().cloned()
}

/// Authenticated user name, if [`RestAuth`] accepted the request
pub fn username(req: &HttpRequest) -> Option<String> {
    req.extensions()
        .get::<AuthenticationResponse>()
        .map(|response| response.user.clone())
}

/// Attributes of the authenticated user, if [`RestAuth`] accepted the request
pub fn attributes(req: &HttpRequest) -> Option<Attributes> {
    req.extensions()
        .get::<AuthenticationResponse>()
        .map(|response| response.attributes.clone())
}

impl FromRequest for AuthenticationResponse {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authentication_response(req).ok_or_else(|| ErrorUnauthorized("not authenticated")))
    }
}
