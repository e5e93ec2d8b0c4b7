//! Session-expiry classification for HTTP responses.
//!
//! The site signals a timed-out session by bouncing the client back to the
//! login page. That surfaces either as a redirect status or as an HTML body
//! where the caller expected file bytes. The heuristic lives behind
//! [`ExpiryPolicy`] so it can be swapped for a stronger signal (an explicit
//! API status, for instance) without touching any caller.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;

/// What the caller expected the response body to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedPayload {
    /// A file download; HTML here means we were served a login page.
    Binary,
    /// A regular page fetch; HTML is the normal case.
    Html,
}

/// Classifies whether a response indicates the session has expired.
pub trait ExpiryPolicy {
    /// Returns true when the response should be treated as a session timeout.
    fn is_expired(
        &self,
        status: StatusCode,
        content_type: Option<&str>,
        expected: ExpectedPayload,
    ) -> bool;
}

/// Default classifier: a 302 redirect, or an HTML content type where a
/// binary payload was expected.
///
/// This mirrors the site's observed behavior and is deliberately weak; it is
/// a heuristic, not a contract guarantee.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedirectOrHtmlPolicy;

impl ExpiryPolicy for RedirectOrHtmlPolicy {
    fn is_expired(
        &self,
        status: StatusCode,
        content_type: Option<&str>,
        expected: ExpectedPayload,
    ) -> bool {
        if status == StatusCode::FOUND {
            return true;
        }
        if expected == ExpectedPayload::Binary {
            if let Some(content_type) = content_type {
                if content_type.trim_start().starts_with("text/html") {
                    return true;
                }
            }
        }
        false
    }
}

/// Applies an [`ExpiryPolicy`] to a live response, extracting the status and
/// Content-Type header for it.
pub fn response_expired(
    policy: &dyn ExpiryPolicy,
    response: &reqwest::Response,
    expected: ExpectedPayload,
) -> bool {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    policy.is_expired(response.status(), content_type, expected)
}
