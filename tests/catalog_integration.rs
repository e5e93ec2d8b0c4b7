//! Integration tests for catalog search, recents, and pagination.
//!
//! These tests verify the full listing flow with mock HTTP servers.

use url::Url;
use vaultfetch_core::catalog::{CatalogClient, Kind, NoDelay, PageWalker};
use vaultfetch_core::session::Session;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> Session {
    Session::new(Url::parse(&server.uri()).expect("mock server uri"))
}

fn client() -> CatalogClient {
    CatalogClient::new(PageWalker::new(Box::new(NoDelay)))
}

fn listing(rows: &str) -> String {
    format!("<html><body><table><tbody>{rows}</tbody></table></body></html>")
}

fn paginated_listing(rows: &str, last_page: u32) -> String {
    format!(
        r#"<html><body>
        <table><tbody>{rows}</tbody></table>
        <ul class="pagination">
            <li><a class="page-link" href="/movies?search=dune&page={last_page}">{last_page}</a></li>
            <li><a class="page-link" rel="next" href="/movies?search=dune&page=2">&raquo;</a></li>
        </ul>
        </body></html>"#
    )
}

fn row(id: u32, name: &str) -> String {
    format!(r#"<tr><td>{id}</td><td>{name}</td><td><a href="/download/{id}">get</a></td></tr>"#)
}

#[tokio::test]
async fn test_search_single_page_makes_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(query_param("search", "dune"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing(&(row(1, "Dune") + &row(2, "Dune Two")))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let outcome = client()
        .search(&session, "dune", Kind::Movies)
        .await
        .expect("search");

    assert_eq!(outcome.rows.len(), 2);
    assert!(outcome.failed_pages.is_empty());
    assert_eq!(outcome.rows[0].id, "1");
    assert_eq!(outcome.rows[1].name, "Dune Two");
    let link = outcome.rows[0].download_link.as_ref().expect("link");
    assert_eq!(link.path(), "/download/1");
}

#[tokio::test]
async fn test_search_walks_every_page_in_order() {
    let server = MockServer::start().await;

    // Initial search response (no page parameter) advertises 3 pages.
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(query_param("search", "dune"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(paginated_listing(&row(99, "ignored cover page"), 3)),
        )
        .mount(&server)
        .await;

    for page in 1..=3u32 {
        let id = page * 10;
        Mock::given(method("GET"))
            .and(path("/movies"))
            .and(query_param("search", "dune"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(listing(&row(id, &format!("Result {page}")))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let session = session_for(&server);
    let outcome = client()
        .search(&session, "dune", Kind::Movies)
        .await
        .expect("search");

    assert!(outcome.failed_pages.is_empty());
    let ids: Vec<_> = outcome.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["10", "20", "30"], "rows must be in page order");
}

#[tokio::test]
async fn test_search_keeps_partial_results_when_a_page_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(query_param("search", "dune"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(paginated_listing(&row(99, "cover"), 3)),
        )
        .mount(&server)
        .await;

    for page in [1u32, 3] {
        Mock::given(method("GET"))
            .and(path("/movies"))
            .and(query_param("search", "dune"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(listing(&row(page, &format!("Page {page}")))),
            )
            .mount(&server)
            .await;
    }

    // Page 2 keeps failing; it is retried and then recorded, not fatal.
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(query_param("search", "dune"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let outcome = client()
        .search(&session, "dune", Kind::Movies)
        .await
        .expect("search");

    assert_eq!(outcome.failed_pages, vec![2]);
    let ids: Vec<_> = outcome.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"], "surviving pages keep their order");
}

#[tokio::test]
async fn test_search_error_status_on_initial_fetch_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shows"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = client().search(&session, "dune", Kind::Shows).await;
    assert!(result.is_err(), "initial fetch failure must be an error");
}

#[tokio::test]
async fn test_recents_parses_the_matching_section_only() {
    let server = MockServer::start().await;

    let front_page = format!(
        r#"<html><body>
        <h5>Recent Movies</h5>
        <table><tbody>{}{}</tbody></table>
        <h5>Recent Shows</h5>
        <table><tbody>{}</tbody></table>
        </body></html>"#,
        row(1, "Movie One"),
        row(2, "Movie Two"),
        row(3, "Show One"),
    );

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(front_page))
        .mount(&server)
        .await;

    let session = session_for(&server);

    let movies = client()
        .recents(&session, Kind::Movies)
        .await
        .expect("recents");
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].name, "Movie One");

    let shows = client()
        .recents(&session, Kind::Shows)
        .await
        .expect("recents");
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].id, "3");
}

#[tokio::test]
async fn test_browsing_requires_no_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&row(1, "Anon Hit"))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<html><body><h5>Recent Shows</h5><table><tbody>{}</tbody></table></body></html>",
            row(2, "Anon Show")
        )))
        .mount(&server)
        .await;

    // A session that never logged in can still search and list recents.
    let session = session_for(&server);
    assert!(!session.is_authenticated());

    let outcome = client()
        .search(&session, "anon", Kind::Movies)
        .await
        .expect("search");
    assert_eq!(outcome.rows.len(), 1);

    let shows = client()
        .recents(&session, Kind::Shows)
        .await
        .expect("recents");
    assert_eq!(shows.len(), 1);
    assert!(!session.is_authenticated(), "browsing must not authenticate");
}

#[tokio::test]
async fn test_recents_missing_section_yields_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h5>Maintenance</h5></body></html>"),
        )
        .mount(&server)
        .await;

    let session = session_for(&server);
    let rows = client()
        .recents(&session, Kind::Movies)
        .await
        .expect("recents");
    assert!(rows.is_empty());
}
