//! Pagination walker: multi-page result aggregation.
//!
//! A listing page carries Bootstrap-style pagination controls: an anchor
//! with `rel="next"` and numbered `a.page-link` anchors. The walker reads
//! the highest page number from the last page link preceding the "next"
//! control, then fetches every page in order, substituting the numeric page
//! query parameter per iteration and pausing a courtesy delay between
//! fetches.
//!
//! Failed pages do not abort the walk: their indices are recorded in
//! [`WalkOutcome::failed_pages`] and the rows gathered so far are kept, so
//! a transient failure on page 7 of 20 no longer discards the other 19.

use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::CatalogError;
use super::parser::{ListingRow, parse_page, parse_page_checked, selector};
use super::rate_limit::{CourtesyDelay, RandomizedDelay};
use crate::session::Session;

/// Attempts per page before it is recorded as failed (initial + retries).
const PAGE_FETCH_ATTEMPTS: u32 = 3;

/// Aggregated result of a pagination walk.
///
/// Rows are in page-ascending, then in-page document order. No dedup is
/// performed; callers relying on uniqueness must dedupe by `id`.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// All rows gathered, in page order.
    pub rows: Vec<ListingRow>,
    /// 1-based indices of pages that could not be fetched or parsed.
    pub failed_pages: Vec<u32>,
}

impl WalkOutcome {
    /// Returns true when the walk produced no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sequentially fetches and parses every page of a listing.
pub struct PageWalker {
    delay: Box<dyn CourtesyDelay>,
}

impl std::fmt::Debug for PageWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageWalker").finish_non_exhaustive()
    }
}

impl Default for PageWalker {
    fn default() -> Self {
        Self::new(Box::new(RandomizedDelay::default()))
    }
}

impl PageWalker {
    /// Creates a walker with the given courtesy-delay strategy.
    #[must_use]
    pub fn new(delay: Box<dyn CourtesyDelay>) -> Self {
        Self { delay }
    }

    /// Walks every page reachable from the given first-page markup.
    ///
    /// When the markup carries no "next page" control, the input is the only
    /// page and is parsed directly. Otherwise pages `1..=N` are fetched via
    /// the last-page URL with the page parameter substituted.
    ///
    /// # Errors
    ///
    /// Only setup-level failures (a body that cannot be read mid-walk is
    /// recorded as a failed page, not raised).
    #[instrument(skip(self, session, first_page))]
    pub async fn walk(
        &self,
        session: &Session,
        first_page: &str,
    ) -> Result<WalkOutcome, CatalogError> {
        let Some(bound) = discover_walk_bound(first_page, session.base()) else {
            debug!("no pagination controls; parsing single page");
            return Ok(WalkOutcome {
                rows: parse_page(first_page, session.base()),
                failed_pages: Vec::new(),
            });
        };

        info!(
            last_page = bound.last_page,
            template = %bound.template,
            "walking paginated listing"
        );

        let mut rows = Vec::new();
        let mut failed_pages = Vec::new();
        for page in 1..=bound.last_page {
            tokio::time::sleep(self.delay.wait(page)).await;
            let url = bound.url_for(page);
            match self.fetch_page(session, &url).await {
                Ok(Some(mut page_rows)) => {
                    debug!(page, rows = page_rows.len(), "parsed page");
                    rows.append(&mut page_rows);
                }
                Ok(None) => {
                    warn!(page, url = %url, "page had no listing table");
                    failed_pages.push(page);
                }
                Err(error) => {
                    warn!(page, url = %url, error = %error, "page fetch failed");
                    failed_pages.push(page);
                }
            }
        }

        if !failed_pages.is_empty() {
            warn!(
                failed = failed_pages.len(),
                total = bound.last_page,
                "walk finished with failed pages"
            );
        }
        Ok(WalkOutcome { rows, failed_pages })
    }

    /// Fetches one page, retrying transient failures (5xx, transport errors)
    /// with the courtesy delay. 4xx is terminal for the page.
    async fn fetch_page(
        &self,
        session: &Session,
        url: &Url,
    ) -> Result<Option<Vec<ListingRow>>, CatalogError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match session.http().get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response
                            .text()
                            .await
                            .map_err(|e| CatalogError::network(url.as_str(), e))?;
                        return Ok(parse_page_checked(&body, session.base()));
                    }
                    if status.is_server_error() && attempt < PAGE_FETCH_ATTEMPTS {
                        debug!(attempt, status = status.as_u16(), "retrying page fetch");
                        tokio::time::sleep(self.delay.wait(attempt)).await;
                        continue;
                    }
                    return Err(CatalogError::http_status(url.as_str(), status.as_u16()));
                }
                Err(error) if attempt < PAGE_FETCH_ATTEMPTS => {
                    debug!(attempt, error = %error, "retrying page fetch after transport error");
                    tokio::time::sleep(self.delay.wait(attempt)).await;
                }
                Err(error) => return Err(CatalogError::network(url.as_str(), error)),
            }
        }
    }
}

/// Pagination discovered from a listing page's navigation controls.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WalkBound {
    /// Href of the last-page control, resolved against the base.
    template: Url,
    /// Query key carrying the page number in `template`.
    page_param: String,
    /// Highest page number; the walk bound.
    last_page: u32,
}

impl WalkBound {
    /// Returns the template URL with the page parameter set to `page`.
    fn url_for(&self, page: u32) -> Url {
        let pairs: Vec<(String, String)> = self
            .template
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let mut url = self.template.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (key, value) in pairs {
                if key == self.page_param {
                    query.append_pair(&key, &page.to_string());
                } else {
                    query.append_pair(&key, &value);
                }
            }
        }
        url
    }
}

/// Locates the walk bound in a listing page's markup.
///
/// Returns `None` when there is no `rel="next"` control (single page), or
/// when the controls are present but unusable (no preceding page link, no
/// numeric page parameter) — in which case the caller falls back to parsing
/// the input as a single page.
fn discover_walk_bound(html: &str, base: &Url) -> Option<WalkBound> {
    let document = Html::parse_document(html);
    let anchors = selector("a");

    let mut last_page_href: Option<String> = None;
    for anchor in document.select(&anchors) {
        if anchor.value().attr("rel") == Some("next") {
            let Some(href) = last_page_href else {
                warn!("found a next-page control but no page link before it");
                return None;
            };
            return build_bound(&href, base);
        }
        if anchor.value().classes().any(|class| class == "page-link") {
            if let Some(href) = anchor.value().attr("href") {
                last_page_href = Some(href.to_string());
            }
        }
    }
    None
}

fn build_bound(href: &str, base: &Url) -> Option<WalkBound> {
    let template = match base.join(href) {
        Ok(url) => url,
        Err(_) => {
            warn!(href, "last-page link is not a valid URL");
            return None;
        }
    };

    // Prefer an explicit `page` key; otherwise take the last numeric query
    // parameter, which is what the site's pagination links carry.
    let mut page_pair: Option<(String, u32)> = None;
    for (key, value) in template.query_pairs() {
        if let Ok(number) = value.parse::<u32>() {
            let is_page_key = key == "page";
            page_pair = Some((key.into_owned(), number));
            if is_page_key {
                break;
            }
        }
    }

    let Some((page_param, last_page)) = page_pair else {
        warn!(url = %template, "last-page link carries no numeric page parameter");
        return None;
    };
    Some(WalkBound {
        template,
        page_param,
        last_page,
    })
}
