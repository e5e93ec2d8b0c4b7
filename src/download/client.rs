//! Streaming downloader with pre-flight verification and progress reporting.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::DownloadError;
use super::filename::resolve_destination;
use super::progress::{ProgressFn, ProgressReporter};
use crate::format::human_bytes;
use crate::session::Session;

/// Pre-flight hook run on the raw response before any body bytes are
/// consumed.
///
/// Returning `false` aborts the download with no side effects. The
/// interactive layer installs a verifier that detects an expired session so
/// no bandwidth is wasted streaming a login page to disk.
pub trait HeadVerifier {
    /// Returns whether the download should proceed.
    fn verify(&self, response: &reqwest::Response) -> bool;
}

/// Parameters for a single download.
pub struct DownloadRequest<'a> {
    /// Source URL.
    pub url: &'a str,
    /// Explicit destination: a file path, or a directory to join with the
    /// server-provided filename. `None` resolves entirely from headers.
    pub destination: Option<&'a Path>,
    /// Optional per-chunk percentage callback.
    pub progress: Option<&'a ProgressFn<'a>>,
    /// Whether to render a terminal progress bar.
    pub show_progress_bar: bool,
    /// Optional pre-flight verifier.
    pub head_verifier: Option<&'a dyn HeadVerifier>,
}

impl std::fmt::Debug for DownloadRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("url", &self.url)
            .field("destination", &self.destination)
            .field("show_progress_bar", &self.show_progress_bar)
            .finish_non_exhaustive()
    }
}

impl<'a> DownloadRequest<'a> {
    /// Creates a request with only the URL set; everything else defaults off.
    #[must_use]
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            destination: None,
            progress: None,
            show_progress_bar: false,
            head_verifier: None,
        }
    }
}

/// How a download attempt ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The full transfer completed and was flushed to disk.
    Completed {
        /// Final output path.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// The head verifier rejected the response; nothing was written.
    Aborted,
}

/// Streams resources from the authenticated session to disk.
///
/// Stateless; every call borrows the shared [`Session`] for its HTTP client
/// so downloads carry the login cookies.
#[derive(Debug, Default, Clone, Copy)]
pub struct Downloader;

impl Downloader {
    /// Creates a downloader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Downloads a resource according to the request.
    ///
    /// The body is streamed to the destination in chunks; after each chunk
    /// the cumulative percentage (two decimal places) is reported through
    /// the request's callback and/or progress bar. The destination file is
    /// closed on every exit path, and a partially written file is deleted
    /// when the transfer fails.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::SizeUnknown`] when Content-Length is absent/zero.
    /// - [`DownloadError::NoDestination`] when no usable filename resolves.
    /// - [`DownloadError::HttpStatus`] / [`DownloadError::Network`] /
    ///   [`DownloadError::Timeout`] / [`DownloadError::Io`] as usual.
    #[instrument(skip(self, session, request), fields(url = %request.url))]
    pub async fn download(
        &self,
        session: &Session,
        request: DownloadRequest<'_>,
    ) -> Result<DownloadOutcome, DownloadError> {
        let url =
            Url::parse(request.url).map_err(|_| DownloadError::invalid_url(request.url))?;

        debug!("starting download");
        let response = session.http().get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(request.url)
            } else {
                DownloadError::network(request.url, e)
            }
        })?;

        // Pre-flight: give the verifier the raw response before any body
        // bytes are consumed.
        if let Some(verifier) = request.head_verifier {
            if !verifier.verify(&response) {
                info!("download aborted by pre-flight verifier");
                return Ok(DownloadOutcome::Aborted);
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(request.url, status.as_u16()));
        }

        let total_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        if total_bytes == 0 {
            return Err(DownloadError::size_unknown(request.url));
        }
        info!(size = %human_bytes(total_bytes), "download size");

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);

        let destination = resolve_destination(request.destination, content_disposition.as_deref())
            .ok_or_else(|| DownloadError::no_destination(request.url))?;
        debug!(path = %destination.display(), "resolved destination");

        let mut file = File::create(&destination)
            .await
            .map_err(|e| DownloadError::io(destination.clone(), e))?;

        let mut reporter =
            ProgressReporter::new(total_bytes, request.progress, request.show_progress_bar);
        let stream_result =
            stream_to_file(&mut file, response, request.url, &destination, &mut reporter).await;

        match stream_result {
            Ok(bytes) => {
                reporter.finish();
                info!(path = %destination.display(), bytes, "download complete");
                Ok(DownloadOutcome::Completed {
                    path: destination,
                    bytes,
                })
            }
            Err(error) => {
                reporter.abandon();
                // Never leave a half-written file behind.
                drop(file);
                debug!(path = %destination.display(), "cleaning up partial file after error");
                if let Err(remove_error) = tokio::fs::remove_file(&destination).await {
                    warn!(
                        path = %destination.display(),
                        error = %remove_error,
                        "failed to remove partial file"
                    );
                }
                Err(error)
            }
        }
    }
}

/// Streams the response body to the file, advancing the reporter per chunk.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
    reporter: &mut ProgressReporter<'_>,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;
        bytes_written += chunk.len() as u64;
        reporter.advance(chunk.len() as u64);
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

    Ok(bytes_written)
}
