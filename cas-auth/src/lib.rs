//! # cas-auth: CAS REST protocol client for actix-web
//!
//! Authenticates HTTP Basic Authentication credentials against a Central
//! Authentication Service using its ticket-based REST API.
//!
//! ## Features
//!
//! - **Granting tickets**: `POST /v1/tickets` with username and password
//! - **Service tickets**: `POST /v1/tickets/{tgt}` scoped to one service URL
//! - **Validation**: CAS 2+ `serviceValidate` (XML) with a one-shot fallback to
//!   CAS 1 `validate` (plain text) when the former is not found
//! - **Middleware**: [`RestAuth`] turns Basic Authentication into an
//!   [`AuthenticationResponse`] attached to the request
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  Basic auth   ┌────────────────────────────┐
//! │ HTTP client  │ ────────────▶ │ RestAuth middleware        │
//! └──────────────┘               └────────────────────────────┘
//!                                     │ username + password
//!                                     ▼
//!                  ┌───────────────────────────────────────┐
//!                  │ CAS server                            │
//!                  │  1. POST /v1/tickets        → TGT     │
//!                  │  2. POST /v1/tickets/{TGT}  → ST      │
//!                  │  3. GET  /serviceValidate   → XML     │
//!                  │     (404 → GET /validate    → text)   │
//!                  └───────────────────────────────────────┘
//!                                     │ AuthenticationResponse
//!                                     ▼
//!                          ┌─────────────────────┐
//!                          │ wrapped handler     │
//!                          └─────────────────────┘
//! ```
//!
//! Every request runs the full chain; nothing is cached between requests.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod granting;
pub mod middleware;
pub mod parser;
pub mod response;
pub mod service_ticket;
pub mod service_url;
pub mod validator;

// Re-exports for convenience
pub use client::RestClient;
pub use config::CasConfig;
pub use credentials::{Credentials, GrantingTicket, ServiceTicket};
pub use error::{CasError, ErrorKind, Result, Stage};
pub use granting::GrantingTicketRequester;
pub use middleware::{RestAuth, RestAuthMiddleware};
pub use parser::parse_service_response;
pub use response::{Attributes, AuthenticationResponse, ValidationOutcome};
pub use service_ticket::ServiceTicketRequester;
pub use validator::ServiceTicketValidator;
