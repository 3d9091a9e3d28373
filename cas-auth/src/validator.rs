//! Service ticket validation
//!
//! Validation first tries the CAS 2+ `serviceValidate` endpoint. If the
//! server does not have it (`404 Not Found`) the same ticket is sent once to
//! the CAS 1 `validate` endpoint, which answers in plain text:
//!
//! ```text
//! yes\n<username>\n      ticket accepted
//! no\n\n                 ticket rejected
//! ```

use crate::credentials::ServiceTicket;
use crate::error::{CasError, Result, Stage};
use crate::parser::parse_service_response;
use crate::response::{AuthenticationResponse, ValidationOutcome};
use crate::service_url::validation_url;
use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

/// CAS 2+ validation path
pub const SERVICE_VALIDATE_PATH: &str = "serviceValidate";

/// CAS 1 validation path
pub const VALIDATE_PATH: &str = "validate";

/// CAS 1 body for a rejected ticket
const CAS1_NEGATIVE: &str = "no\n\n";

/// CAS 1 prefix for an accepted ticket
const CAS1_POSITIVE_PREFIX: &str = "yes\n";

/// Validates service tickets against a CAS server
#[derive(Debug, Clone)]
pub struct ServiceTicketValidator {
    client: reqwest::Client,
    cas_url: Url,
}

impl ServiceTicketValidator {
    /// Create a validator for the CAS server rooted at `cas_url`
    pub fn new(client: reqwest::Client, cas_url: Url) -> Self {
        Self { client, cas_url }
    }

    /// Validate `ticket` for `service`.
    ///
    /// Falls back to the CAS 1 endpoint only when `serviceValidate` answers
    /// 404. Every other non-200 status is a protocol error.
    pub async fn validate_ticket(
        &self,
        service: &Url,
        ticket: &ServiceTicket,
    ) -> Result<ValidationOutcome> {
        info!(service = %service, "cas: validating ticket");

        let url = self.service_validate_url(service, ticket)?;
        let (status, body) = self.get(&url, Stage::ServiceValidate).await?;

        if status == StatusCode::NOT_FOUND {
            info!(
                service = %service,
                "cas: serviceValidate not available, falling back to CAS 1 validate"
            );
            return self.validate_ticket_cas1(service, ticket).await;
        }

        if status != StatusCode::OK {
            return Err(protocol_error(Stage::ServiceValidate, status, body));
        }

        let response = parse_service_response(&body)?;

        info!(service = %service, user = %response.user, "cas: ticket validated");
        Ok(ValidationOutcome::Authenticated(response))
    }

    /// URL of the CAS 2+ validation request for `ticket`
    pub fn service_validate_url(&self, service: &Url, ticket: &ServiceTicket) -> Result<Url> {
        validation_url(&self.cas_url, SERVICE_VALIDATE_PATH, service, ticket.as_str())
    }

    /// URL of the CAS 1 validation request for `ticket`
    pub fn validate_url(&self, service: &Url, ticket: &ServiceTicket) -> Result<Url> {
        validation_url(&self.cas_url, VALIDATE_PATH, service, ticket.as_str())
    }

    async fn validate_ticket_cas1(
        &self,
        service: &Url,
        ticket: &ServiceTicket,
    ) -> Result<ValidationOutcome> {
        let url = self.validate_url(service, ticket)?;
        let (status, body) = self.get(&url, Stage::Validate).await?;

        if status != StatusCode::OK {
            return Err(protocol_error(Stage::Validate, status, body));
        }

        let outcome = parse_validate_body(&body)?;
        match &outcome {
            ValidationOutcome::Authenticated(response) => {
                info!(service = %service, user = %response.user, "cas: ticket validated");
            }
            ValidationOutcome::NotAuthenticated => {
                info!(service = %service, "cas: ticket rejected");
            }
        }
        Ok(outcome)
    }

    async fn get(&self, url: &Url, stage: Stage) -> Result<(StatusCode, String)> {
        debug!(stage = %stage, "cas: attempting ticket validation");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!(stage = %stage, status = %status, "cas: request returned");

        let body = response.text().await?;
        Ok((status, body))
    }
}

fn protocol_error(stage: Stage, status: StatusCode, body: String) -> CasError {
    CasError::Protocol {
        stage,
        status: status.as_u16(),
        body,
    }
}

/// Interpret a CAS 1 `validate` body.
///
/// Only the exact two-line framings are accepted; the user name is what lies
/// between the 4-byte `yes\n` prefix and the final newline.
pub fn parse_validate_body(body: &str) -> Result<ValidationOutcome> {
    if body == CAS1_NEGATIVE {
        return Ok(ValidationOutcome::NotAuthenticated);
    }

    body.strip_prefix(CAS1_POSITIVE_PREFIX)
        .and_then(|rest| rest.strip_suffix('\n'))
        .filter(|user| !user.is_empty() && !user.contains('\n'))
        .map(|user| ValidationOutcome::Authenticated(AuthenticationResponse::new(user)))
        .ok_or_else(|| CasError::Parse(format!("unrecognised validate response: {:?}", body)))
}
