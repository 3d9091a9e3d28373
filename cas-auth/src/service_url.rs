//! Service URL handling
//!
//! CAS compares the `service` value of a validation request byte-for-byte with
//! the one used when the service ticket was issued, so every request renders
//! the service URL through [`sanitised_url_string`].

use crate::error::{CasError, Result};
use url::Url;

/// Query parameter CAS appends when redirecting back to a service
pub const TICKET_PARAM: &str = "ticket";

/// Query parameter naming the service on CAS requests
pub const SERVICE_PARAM: &str = "service";

/// Return a copy of `url` without any `ticket` parameter.
///
/// Remaining parameters are re-encoded sorted by key; values sharing a key
/// keep their relative order. An empty query is removed entirely.
pub fn sanitised_url(url: &Url) -> Url {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != TICKET_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut sanitised = url.clone();
    if pairs.is_empty() {
        sanitised.set_query(None);
    } else {
        sanitised.query_pairs_mut().clear().extend_pairs(pairs);
    }
    sanitised
}

/// Canonical string form of a service URL
pub fn sanitised_url_string(url: &Url) -> String {
    sanitised_url(url).to_string()
}

/// Append path segments to a CAS base URL.
///
/// A trailing slash on the base is ignored, so `https://cas/cas/` and
/// `https://cas/cas` both give `https://cas/cas/serviceValidate`. Existing
/// query parameters on the base are kept.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CasError::InvalidUrl(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build a validation URL for `ticket` against `service`.
///
/// `service` and `ticket` are appended after whatever parameters the CAS
/// base already carries.
pub fn validation_url(base: &Url, path: &str, service: &Url, ticket: &str) -> Result<Url> {
    let mut url = endpoint(base, &[path])?;
    url.query_pairs_mut()
        .append_pair(SERVICE_PARAM, &sanitised_url_string(service))
        .append_pair(TICKET_PARAM, ticket);
    Ok(url)
}
