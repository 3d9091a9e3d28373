//! Error types for the CAS client

use std::fmt;

/// Result type for CAS operations
pub type Result<T> = std::result::Result<T, CasError>;

/// Protocol stage an HTTP exchange belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `POST /v1/tickets`
    GrantingTicket,
    /// `POST /v1/tickets/{tgt}`
    ServiceTicket,
    /// `GET /serviceValidate` (CAS 2 and later)
    ServiceValidate,
    /// `GET /validate` (CAS 1)
    Validate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::GrantingTicket => "granting ticket request",
            Stage::ServiceTicket => "service ticket request",
            Stage::ServiceValidate => "service validate",
            Stage::Validate => "validate",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`CasError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection failure or timeout
    Transport,
    /// Unexpected status code, location or body framing
    Protocol,
    /// CAS rejected the ticket with a failure code
    AuthenticationFailure,
    /// CAS 1 answered "no"
    NotAuthenticated,
    /// Malformed or unrecognised response document
    Parse,
    /// Invalid URLs or settings
    Configuration,
}

/// CAS client errors
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// HTTP request failed before a response was read
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// CAS answered with an unexpected status
    #[error("Unexpected status {status} during {stage}: {body}")]
    Protocol {
        /// Stage that failed
        stage: Stage,
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },

    /// The granting ticket location could not be turned into a ticket
    #[error("Invalid granting ticket location: {0:?}")]
    InvalidLocation(String),

    /// CAS returned an `authenticationFailure` document
    #[error("Authentication failure {code}: {description}")]
    AuthenticationFailure {
        /// Failure code such as `INVALID_TICKET`
        code: String,
        /// Human readable description from the server
        description: String,
    },

    /// CAS explicitly denied the ticket
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// URL could not be parsed or used as a base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CasError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CasError::Transport(_) => ErrorKind::Transport,
            CasError::Protocol { .. } | CasError::InvalidLocation(_) => ErrorKind::Protocol,
            CasError::AuthenticationFailure { .. } => ErrorKind::AuthenticationFailure,
            CasError::NotAuthenticated => ErrorKind::NotAuthenticated,
            CasError::Parse(_) => ErrorKind::Parse,
            CasError::InvalidUrl(_) | CasError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Check if a later, fresh attempt could succeed
    ///
    /// Nothing in this crate retries; this is for callers deciding what to
    /// report.
    pub fn is_retryable(&self) -> bool {
        match self {
            CasError::Transport(_) => true,
            CasError::Protocol { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get HTTP status code this error maps to when surfaced directly
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Transport => 502,
            ErrorKind::Protocol | ErrorKind::Parse => 502,
            ErrorKind::AuthenticationFailure | ErrorKind::NotAuthenticated => 401,
            ErrorKind::Configuration => 500,
        }
    }
}

impl From<url::ParseError> for CasError {
    fn from(err: url::ParseError) -> Self {
        CasError::InvalidUrl(err.to_string())
    }
}

impl From<quick_xml::Error> for CasError {
    fn from(err: quick_xml::Error) -> Self {
        CasError::Parse(format!("XML error: {}", err))
    }
}

impl From<toml::de::Error> for CasError {
    fn from(err: toml::de::Error) -> Self {
        CasError::Config(err.to_string())
    }
}
