//! User credentials and ticket values
//!
//! Tickets are opaque strings issued by the CAS server. They are wrapped in
//! newtypes so a granting ticket cannot be passed where a service ticket is
//! expected.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

/// Username and password presented by an end user
///
/// Neither field is logged; `Debug` redacts both.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name
    pub username: String,

    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse an `Authorization` header value of the `Basic` scheme.
    ///
    /// Returns `None` for any other scheme, invalid base64, non UTF-8 content
    /// or a payload without a `:` separator.
    pub fn from_basic_authorization(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self::new(username, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Granting ticket (TGT) identifying an authenticated CAS session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantingTicket(String);

impl GrantingTicket {
    /// Wrap a raw ticket value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw ticket value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GrantingTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use service ticket (ST) scoped to one service URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTicket(String);

impl ServiceTicket {
    /// Wrap a raw ticket value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw ticket value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
