//! Error types for session and login operations.

use thiserror::Error;

/// Errors that can occur while establishing or refreshing a session.
///
/// A rejected email/password pair is NOT an error: `Session::login` returns
/// `Ok(false)` for that case so the interactive layer can offer a retry.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The hidden `_token` input was absent from the login page.
    ///
    /// This signals markup drift on the site rather than a user mistake.
    #[error("login token not found in login page markup (site layout may have changed)")]
    TokenNotFound,

    /// Network-level error while talking to the login endpoint.
    #[error("network error during login via {url}: {source}")]
    Network {
        /// The URL the request was sent to.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// A URL built from the base origin was malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },

    /// The interactive credential prompt failed (closed terminal, EOF).
    #[error("credential prompt failed: {message}")]
    Prompt {
        /// Human-readable description of the prompt failure.
        message: String,
    },
}

impl AuthError {
    /// Creates a network error with its originating URL.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a prompt failure error.
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }
}
