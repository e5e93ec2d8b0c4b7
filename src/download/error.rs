//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a file download.
///
/// All variants are terminal for the attempt; retrying is the caller's
/// decision (the interactive loop retries once after re-authentication).
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The response carried no usable Content-Length, so the transfer size
    /// is unknown and an unbounded transfer is refused.
    #[error("no usable Content-Length for {url}; refusing unsized transfer")]
    SizeUnknown {
        /// The URL whose response lacked a size.
        url: String,
    },

    /// No destination filename could be resolved from the explicit argument
    /// or the Content-Disposition header.
    #[error("no usable destination filename for {url}")]
    NoDestination {
        /// The URL whose download had nowhere to go.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an unknown-size error.
    pub fn size_unknown(url: impl Into<String>) -> Self {
        Self::SizeUnknown { url: url.into() }
    }

    /// Creates an unresolved-destination error.
    pub fn no_destination(url: impl Into<String>) -> Self {
        Self::NoDestination { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let msg = DownloadError::timeout("https://example.test/file.mp3").to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("file.mp3"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_http_status_display() {
        let msg = DownloadError::http_status("https://example.test/f", 404).to_string();
        assert!(msg.contains("404"), "Expected status in: {msg}");
    }

    #[test]
    fn test_size_unknown_display() {
        let msg = DownloadError::size_unknown("https://example.test/f").to_string();
        assert!(
            msg.contains("Content-Length"),
            "Expected header name in: {msg}"
        );
    }

    #[test]
    fn test_no_destination_display() {
        let msg = DownloadError::no_destination("https://example.test/f").to_string();
        assert!(
            msg.contains("destination"),
            "Expected 'destination' in: {msg}"
        );
    }

    #[test]
    fn test_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let msg = DownloadError::io(PathBuf::from("/tmp/test.mp3"), io_error).to_string();
        assert!(msg.contains("/tmp/test.mp3"), "Expected path in: {msg}");
    }
}
