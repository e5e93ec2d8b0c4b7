//! Catalog search and recent-listing access.
//!
//! The [`CatalogClient`] builds search and recent-listing requests against
//! the session's base origin and hands the returned markup to the page
//! parser and pagination walker.
//!
//! # Example
//!
//! ```no_run
//! use url::Url;
//! use vaultfetch_core::catalog::{CatalogClient, Kind, PageWalker};
//! use vaultfetch_core::session::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new(Url::parse("https://audiovault.net/")?);
//! let catalog = CatalogClient::new(PageWalker::default());
//! let outcome = catalog.search(&session, "dune", Kind::Movies).await?;
//! println!("{} rows, {} failed pages", outcome.rows.len(), outcome.failed_pages.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod pager;
mod parser;
pub mod rate_limit;

pub use error::CatalogError;
pub use pager::{PageWalker, WalkOutcome};
pub use parser::{ListingRow, parse_page, parse_page_checked};
pub use rate_limit::{CourtesyDelay, NoDelay, RandomizedDelay};

use scraper::Html;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::session::Session;

use parser::{parse_table, selector};

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The movie catalog.
    Movies,
    /// The TV show catalog.
    Shows,
}

impl Kind {
    /// URL path segment of this catalog's listing endpoint.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Shows => "shows",
        }
    }

    /// Capitalized name as it appears in the "Recent ..." headings.
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Movies => "Movies",
            Self::Shows => "Shows",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Client for catalog search and recent listings.
#[derive(Debug, Default)]
pub struct CatalogClient {
    walker: PageWalker,
}

impl CatalogClient {
    /// Creates a catalog client around the given pagination walker.
    #[must_use]
    pub fn new(walker: PageWalker) -> Self {
        Self { walker }
    }

    /// Searches the given catalog and aggregates every result page.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::HttpStatus`] when the initial search fetch is
    /// not 2xx, or [`CatalogError::Network`] on transport failure. Failures
    /// on subsequent pages are accumulated in the outcome instead.
    #[instrument(skip(self, session), fields(kind = %kind))]
    pub async fn search(
        &self,
        session: &Session,
        query: &str,
        kind: Kind,
    ) -> Result<WalkOutcome, CatalogError> {
        let url = session
            .base()
            .join(kind.path())
            .map_err(|_| CatalogError::invalid_url(format!("{}{}", session.base(), kind.path())))?;

        debug!(url = %url, "issuing search");
        let response = session
            .http()
            .get(url.clone())
            .query(&[("search", query)])
            .send()
            .await
            .map_err(|e| CatalogError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::network(url.as_str(), e))?;
        self.walker.walk(session, &body).await
    }

    /// Fetches the site root and parses the "Recent <Kind>" table.
    ///
    /// A missing heading or table is reported with a warning and yields an
    /// empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::HttpStatus`] when the root fetch is not 2xx,
    /// or [`CatalogError::Network`] on transport failure.
    #[instrument(skip(self, session), fields(kind = %kind))]
    pub async fn recents(
        &self,
        session: &Session,
        kind: Kind,
    ) -> Result<Vec<ListingRow>, CatalogError> {
        let url = session.base().clone();
        let response = session
            .http()
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::network(url.as_str(), e))?;

        match extract_recent_rows(&body, kind, session.base()) {
            Some(rows) => Ok(rows),
            None => {
                warn!(kind = %kind, "could not locate a recent section for this kind");
                Ok(Vec::new())
            }
        }
    }
}

/// Finds the heading matching "Recent <Kind>" and parses the next table
/// body in document order. Sync so the parsed document never crosses an
/// await point.
fn extract_recent_rows(html: &str, kind: Kind, base: &Url) -> Option<Vec<ListingRow>> {
    let document = Html::parse_document(html);
    // Compound selector keeps headings and table bodies in tree order, which
    // is what "the next following tbody" needs.
    let headings_and_tables = selector("h5, tbody");

    let mut in_section = false;
    for element in document.select(&headings_and_tables) {
        if element.value().name() == "h5" {
            let text = element.text().collect::<String>();
            let text = text.trim();
            in_section = text.starts_with("Recent") && text.contains(kind.heading());
        } else if in_section {
            return Some(parse_table(element, base));
        }
    }
    None
}
