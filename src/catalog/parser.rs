//! Listing-table parsing: markup in, typed rows out.
//!
//! Listing pages carry a table whose rows hold an identifier, a display
//! name, and a download anchor in their first three cells. Parsing is a pure
//! function over the markup; no network access happens here.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

/// One entry of a catalog listing.
///
/// Rows missing the expected cell structure are null-filled (empty strings,
/// `None` link) rather than aborting the page; callers must tolerate rows
/// without a usable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Catalog identifier from the first cell.
    pub id: String,
    /// Display name from the second cell.
    pub name: String,
    /// Download link from the third cell's anchor, resolved against the base
    /// origin. `None` when absent or resolving outside that origin.
    pub download_link: Option<Url>,
}

#[allow(clippy::expect_used)]
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Parses the first listing table found in a page's markup.
///
/// Missing table structure yields an empty list; see
/// [`parse_page_checked`] for the variant that distinguishes that case.
#[must_use]
pub fn parse_page(html: &str, base: &Url) -> Vec<ListingRow> {
    parse_page_checked(html, base).unwrap_or_default()
}

/// Like [`parse_page`], but returns `None` when the page has no `tbody` at
/// all, so the pagination walker can record the page as failed instead of
/// silently contributing zero rows.
#[must_use]
pub fn parse_page_checked(html: &str, base: &Url) -> Option<Vec<ListingRow>> {
    let document = Html::parse_document(html);
    let table = document.select(&selector("tbody")).next()?;
    Some(parse_table(table, base))
}

/// Extracts rows from one `tbody` element.
pub(crate) fn parse_table(table: ElementRef<'_>, base: &Url) -> Vec<ListingRow> {
    let row_selector = selector("tr");
    let cell_selector = selector("td");
    let anchor_selector = selector("a");

    let mut rows = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
        let id = cells.first().map(cell_text).unwrap_or_default();
        let name = cells.get(1).map(cell_text).unwrap_or_default();
        let download_link = cells
            .get(2)
            .and_then(|cell| cell.select(&anchor_selector).next())
            .and_then(|anchor| anchor.value().attr("href"))
            .and_then(|href| resolve_link(href, base));
        rows.push(ListingRow {
            id,
            name,
            download_link,
        });
    }
    rows
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Resolves an anchor href against the base origin.
///
/// Links resolving to a different origin are dropped: every download link
/// must live under the site the session is authenticated against.
fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let resolved = match base.join(href) {
        Ok(url) => url,
        Err(_) => {
            warn!(href, "dropping unparseable download link");
            return None;
        }
    };
    let same_origin = resolved.scheme() == base.scheme()
        && resolved.host_str() == base.host_str()
        && resolved.port_or_known_default() == base.port_or_known_default();
    if same_origin {
        Some(resolved)
    } else {
        warn!(href, "dropping download link outside the base origin");
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.test/").unwrap()
    }

    fn table(rows: &str) -> String {
        format!("<html><body><table><tbody>{rows}</tbody></table></body></html>")
    }

    #[test]
    fn test_parse_page_well_formed_rows() {
        let html = table(
            r#"<tr><td> 17 </td><td> The Movie </td><td><a href="/download/17">get</a></td></tr>
               <tr><td>18</td><td>Another One</td><td><a href="https://example.test/download/18">get</a></td></tr>"#,
        );
        let rows = parse_page(&html, &base());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "17");
        assert_eq!(rows[0].name, "The Movie");
        assert_eq!(
            rows[0].download_link.as_ref().unwrap().as_str(),
            "https://example.test/download/17"
        );
        assert_eq!(rows[1].id, "18");
    }

    #[test]
    fn test_parse_page_trims_whitespace() {
        let html = table("<tr><td>\n  42\t</td><td>  Spaced Out  </td><td><a href=\"/d/42\">x</a></td></tr>");
        let rows = parse_page(&html, &base());
        assert_eq!(rows[0].id, "42");
        assert_eq!(rows[0].name, "Spaced Out");
    }

    #[test]
    fn test_parse_page_null_fills_partial_rows() {
        let html = table("<tr><td>7</td></tr>");
        let rows = parse_page(&html, &base());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "7");
        assert_eq!(rows[0].name, "");
        assert!(rows[0].download_link.is_none());
    }

    #[test]
    fn test_parse_page_missing_anchor_yields_no_link() {
        let html = table("<tr><td>7</td><td>No Anchor</td><td>plain text</td></tr>");
        let rows = parse_page(&html, &base());
        assert!(rows[0].download_link.is_none());
    }

    #[test]
    fn test_parse_page_drops_foreign_origin_links() {
        let html = table(r#"<tr><td>9</td><td>Elsewhere</td><td><a href="https://other.test/d/9">x</a></td></tr>"#);
        let rows = parse_page(&html, &base());
        assert!(rows[0].download_link.is_none());
    }

    #[test]
    fn test_parse_page_preserves_document_order() {
        let html = table(
            "<tr><td>a</td><td>A</td><td><a href=\"/1\">x</a></td></tr>\
             <tr><td>b</td><td>B</td><td><a href=\"/2\">x</a></td></tr>\
             <tr><td>c</td><td>C</td><td><a href=\"/3\">x</a></td></tr>",
        );
        let ids: Vec<_> = parse_page(&html, &base())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_parse_page_without_table_is_empty() {
        assert!(parse_page("<html><body><p>no table</p></body></html>", &base()).is_empty());
        assert!(parse_page_checked("<html><body></body></html>", &base()).is_none());
    }
}
