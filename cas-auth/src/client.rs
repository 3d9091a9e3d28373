//! CAS REST client
//!
//! Bundles the three protocol steps for one configured service:
//! credentials → granting ticket → service ticket → validated principal.

use crate::config::CasConfig;
use crate::credentials::{Credentials, GrantingTicket, ServiceTicket};
use crate::error::{CasError, Result};
use crate::granting::GrantingTicketRequester;
use crate::response::{AuthenticationResponse, ValidationOutcome};
use crate::service_ticket::ServiceTicketRequester;
use crate::validator::ServiceTicketValidator;
use tracing::info;
use url::Url;

/// Client for the CAS REST protocol, bound to one service URL
///
/// Holds only configuration fixed at construction, so one instance can serve
/// any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct RestClient {
    cas_url: Url,
    service_url: Url,
    granting: GrantingTicketRequester,
    service_tickets: ServiceTicketRequester,
    validator: ServiceTicketValidator,
}

impl RestClient {
    /// Create a client from an HTTP client, the CAS base URL and the service URL
    pub fn new(client: reqwest::Client, cas_url: Url, service_url: Url) -> Self {
        Self {
            cas_url: cas_url.clone(),
            service_url,
            granting: GrantingTicketRequester::new(client.clone(), cas_url.clone()),
            service_tickets: ServiceTicketRequester::new(client.clone(), cas_url.clone()),
            validator: ServiceTicketValidator::new(client, cas_url),
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &CasConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.http_client()?,
            config.cas_url.clone(),
            config.service_url.clone(),
        ))
    }

    /// Base URL of the CAS server
    pub fn cas_url(&self) -> &Url {
        &self.cas_url
    }

    /// Service URL tickets are requested for
    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    /// Exchange credentials for a granting ticket
    pub async fn request_granting_ticket(&self, credentials: &Credentials) -> Result<GrantingTicket> {
        self.granting.request_granting_ticket(credentials).await
    }

    /// Exchange a granting ticket for a service ticket for the configured service
    pub async fn request_service_ticket(&self, tgt: &GrantingTicket) -> Result<ServiceTicket> {
        self.service_tickets
            .request_service_ticket(tgt, &self.service_url)
            .await
    }

    /// Validate a service ticket for the configured service
    pub async fn validate_service_ticket(&self, ticket: &ServiceTicket) -> Result<ValidationOutcome> {
        self.validator
            .validate_ticket(&self.service_url, ticket)
            .await
    }

    /// CAS 2+ validation URL for `ticket`
    pub fn service_validate_url(&self, ticket: &ServiceTicket) -> Result<Url> {
        self.validator.service_validate_url(&self.service_url, ticket)
    }

    /// CAS 1 validation URL for `ticket`
    pub fn validate_url(&self, ticket: &ServiceTicket) -> Result<Url> {
        self.validator.validate_url(&self.service_url, ticket)
    }

    /// Run the full ticket chain for one set of credentials.
    ///
    /// A CAS 1 "no" is reported as [`CasError::NotAuthenticated`].
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticationResponse> {
        let tgt = self.request_granting_ticket(credentials).await?;
        let ticket = self.request_service_ticket(&tgt).await?;

        match self.validate_service_ticket(&ticket).await? {
            ValidationOutcome::Authenticated(response) => {
                info!(user = %response.user, "cas: rest authentication succeeded");
                Ok(response)
            }
            ValidationOutcome::NotAuthenticated => Err(CasError::NotAuthenticated),
        }
    }
}
