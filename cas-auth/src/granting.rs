//! Granting ticket issuance
//!
//! `POST {cas}/v1/tickets` with `username` and `password` form fields. CAS
//! answers `201 Created` and a `Location` header pointing at the new ticket
//! resource.

use crate::credentials::{Credentials, GrantingTicket};
use crate::error::{CasError, Result, Stage};
use crate::service_url::endpoint;
use reqwest::{header::LOCATION, StatusCode};
use tracing::{debug, info};
use url::Url;

/// Exchanges user credentials for a granting ticket
#[derive(Debug, Clone)]
pub struct GrantingTicketRequester {
    client: reqwest::Client,
    cas_url: Url,
}

impl GrantingTicketRequester {
    /// Create a requester for the CAS server rooted at `cas_url`
    pub fn new(client: reqwest::Client, cas_url: Url) -> Self {
        Self { client, cas_url }
    }

    /// Request a new granting ticket. One HTTP call, no retry.
    pub async fn request_granting_ticket(&self, credentials: &Credentials) -> Result<GrantingTicket> {
        let url = endpoint(&self.cas_url, &["v1", "tickets"])?;
        info!(url = %url, "cas: requesting granting ticket");

        let response = self
            .client
            .post(url.clone())
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!(url = %url, status = %status, "cas: request returned");

        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(CasError::Protocol {
                stage: Stage::GrantingTicket,
                status: status.as_u16(),
                body,
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| CasError::InvalidLocation(String::new()))?;

        let ticket = ticket_from_location(&self.cas_url, location)?;
        info!("cas: granting ticket issued");
        Ok(ticket)
    }
}

/// Take the final non-empty path segment of a ticket location.
///
/// Relative locations are resolved against the CAS base URL.
fn ticket_from_location(cas_url: &Url, location: &str) -> Result<GrantingTicket> {
    let invalid = || CasError::InvalidLocation(location.to_string());

    let resolved = cas_url.join(location.trim()).map_err(|_| invalid())?;
    resolved
        .path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
        .map(GrantingTicket::new)
        .ok_or_else(invalid)
}
