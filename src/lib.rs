//! Vaultfetch Core Library
//!
//! This library provides the core functionality for the vaultfetch tool, an
//! interactive client for the AudioVault media catalog: authenticated
//! sessions, catalog search with multi-page aggregation, and streaming
//! downloads with progress reporting.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`session`] - Login lifecycle, cookies, and expiry detection
//! - [`catalog`] - Listing parsing, pagination, search and recents
//! - [`download`] - Streaming downloads with destination resolution
//! - [`exports`] - Discovery of previously saved dated CSV exports
//! - [`format`] - Human-readable byte formatting

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;
pub mod exports;
pub mod format;
pub mod session;

// Re-export commonly used types
pub use catalog::{
    CatalogClient, CatalogError, CourtesyDelay, Kind, ListingRow, NoDelay, PageWalker,
    RandomizedDelay, WalkOutcome,
};
pub use download::{
    DownloadError, DownloadOutcome, DownloadRequest, Downloader, HeadVerifier, ProgressFn,
};
pub use exports::{LatestExports, find_latest_csvs};
pub use format::human_bytes;
pub use session::{
    AuthError, CredentialPrompt, Credentials, ExpectedPayload, ExpiryPolicy, RedirectOrHtmlPolicy,
    Session, response_expired,
};
