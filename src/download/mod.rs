//! Streaming file downloads with progress reporting.
//!
//! This module provides the [`Downloader`], which streams a catalog
//! resource to disk in chunks through the shared authenticated session.
//!
//! # Features
//!
//! - Streaming transfers (memory-efficient for large files)
//! - Pre-flight [`HeadVerifier`] hook for session-expiry detection before
//!   any bandwidth is spent
//! - Destination resolution from Content-Disposition headers
//! - Per-chunk progress percentages to a callback and/or indicatif bar
//! - Partial files are deleted on failure
//!
//! # Example
//!
//! ```no_run
//! use url::Url;
//! use vaultfetch_core::download::{DownloadRequest, Downloader};
//! use vaultfetch_core::session::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new(Url::parse("https://audiovault.net/")?);
//! let downloader = Downloader::new();
//! let outcome = downloader
//!     .download(&session, DownloadRequest::new("https://audiovault.net/download/17"))
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod filename;
mod progress;

pub use client::{DownloadOutcome, DownloadRequest, Downloader, HeadVerifier};
pub use error::DownloadError;
pub use progress::ProgressFn;
