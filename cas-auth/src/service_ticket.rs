//! Service ticket issuance
//!
//! `POST {cas}/v1/tickets/{tgt}` with a `service` form field. The body of a
//! `200 OK` answer is the service ticket.

use crate::credentials::{GrantingTicket, ServiceTicket};
use crate::error::{CasError, Result, Stage};
use crate::service_url::{endpoint, sanitised_url_string, SERVICE_PARAM};
use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

/// Exchanges a granting ticket for a service ticket
#[derive(Debug, Clone)]
pub struct ServiceTicketRequester {
    client: reqwest::Client,
    cas_url: Url,
}

impl ServiceTicketRequester {
    /// Create a requester for the CAS server rooted at `cas_url`
    pub fn new(client: reqwest::Client, cas_url: Url) -> Self {
        Self { client, cas_url }
    }

    /// Request a service ticket for `service`.
    ///
    /// Exactly one request is issued; whether CAS lets the granting ticket be
    /// used again afterwards is up to the server.
    pub async fn request_service_ticket(
        &self,
        tgt: &GrantingTicket,
        service: &Url,
    ) -> Result<ServiceTicket> {
        let url = endpoint(&self.cas_url, &["v1", "tickets", tgt.as_str()])?;
        let service = sanitised_url_string(service);
        info!(service = %service, "cas: requesting service ticket");

        let response = self
            .client
            .post(url)
            .form(&[(SERVICE_PARAM, service.as_str())])
            .send()
            .await?;

        let status = response.status();
        debug!(service = %service, status = %status, "cas: request returned");

        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CasError::Protocol {
                stage: Stage::ServiceTicket,
                status: status.as_u16(),
                body,
            });
        }

        info!(service = %service, "cas: service ticket issued");
        Ok(ServiceTicket::new(body))
    }
}
