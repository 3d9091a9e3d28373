//! Authentication results
//!
//! What a successful ticket validation yields, regardless of which protocol
//! generation produced it.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Attribute carrying the time CAS authenticated the user
pub const AUTHENTICATION_DATE: &str = "authenticationDate";

/// Attribute set when the ticket came from a fresh login
pub const IS_FROM_NEW_LOGIN: &str = "isFromNewLogin";

/// Attribute set when the login was a "remember me" login
pub const LONG_TERM_AUTHENTICATION: &str = "longTermAuthenticationRequestTokenUsed";

/// Attribute listing group memberships
pub const MEMBER_OF: &str = "memberOf";

/// Multi-valued user attributes
///
/// CAS may repeat an attribute name; values are kept in the order received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Vec<String>>);

impl Attributes {
    /// Create an empty attribute map
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the named attribute
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// All values of the named attribute
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// First value of the named attribute
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Check whether the named attribute is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of distinct attribute names
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no attributes are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over attribute names and their values
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Successful validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    /// Principal identifier returned by CAS
    pub user: String,

    /// User attributes (always empty for CAS 1)
    #[serde(default)]
    pub attributes: Attributes,
}

impl AuthenticationResponse {
    /// Create a response for `user` without attributes
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            attributes: Attributes::new(),
        }
    }

    /// Attach attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Time the user authenticated at CAS, when reported and well formed
    pub fn authentication_date(&self) -> Option<DateTime<FixedOffset>> {
        self.attributes
            .get_first(AUTHENTICATION_DATE)
            .and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
    }

    /// Whether the ticket came from a fresh login rather than an existing session
    pub fn is_new_login(&self) -> bool {
        self.flag(IS_FROM_NEW_LOGIN)
    }

    /// Whether the session was created by a long-term ("remember me") login
    pub fn is_remembered_login(&self) -> bool {
        self.flag(LONG_TERM_AUTHENTICATION)
    }

    /// Group memberships
    pub fn member_of(&self) -> &[String] {
        self.attributes.get(MEMBER_OF).unwrap_or(&[])
    }

    fn flag(&self, name: &str) -> bool {
        self.attributes
            .get_first(name)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Outcome of a service ticket validation that did not fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// CAS accepted the ticket
    Authenticated(AuthenticationResponse),

    /// CAS 1 answered "no" without a protocol fault
    NotAuthenticated,
}

impl ValidationOutcome {
    /// Get the authentication response, if any
    pub fn into_response(self) -> Option<AuthenticationResponse> {
        match self {
            ValidationOutcome::Authenticated(response) => Some(response),
            ValidationOutcome::NotAuthenticated => None,
        }
    }
}
