//! Mapping of HTTP-level failures onto the Polarion error taxonomy.

pub use polarion_core::error::{PolarionError, PolarionResult};

/// Upstream bodies longer than this are cut when reported.
const MAX_REPORTED_BODY: usize = 2048;

/// Map a `reqwest` failure: anything before a response arrives is a
/// connectivity problem, a body that cannot be decoded is a protocol one.
pub(crate) fn from_reqwest(err: reqwest::Error) -> PolarionError {
    if err.is_timeout() {
        PolarionError::Connectivity(format!("request timed out: {}", err))
    } else if err.is_decode() {
        PolarionError::Protocol(err.to_string())
    } else if err.is_builder() {
        PolarionError::Config(err.to_string())
    } else {
        PolarionError::Connectivity(err.to_string())
    }
}

/// Create an error from a non-2xx status code and response body.
pub fn from_response(status: u16, body: &str) -> PolarionError {
    let body = truncate_body(body);
    match status {
        401 | 403 => PolarionError::Auth { status, body },
        _ => PolarionError::Api { status, body },
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_REPORTED_BODY {
        return body.to_string();
    }
    let mut end = MAX_REPORTED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
