use super::*;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

#[test]
fn url_joins_host_and_path() {
    assert_eq!(page_url("example.com", "/a/b"), "http://example.com/a/b");
    assert_eq!(page_url("127.0.0.1:3000", "a"), "http://127.0.0.1:3000/a");
}

#[tokio::test]
async fn fetches_body_of_successful_response() {
    let host = serve(Router::new().route("/blog/x", get(|| async { "<title>X</title>" }))).await;
    let html = HttpFetcher::new(None)
        .unwrap()
        .fetch_html(&host, "/blog/x")
        .await
        .unwrap();
    assert_eq!(html, "<title>X</title>");
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let host = serve(Router::new().route(
        "/gone",
        get(|| async { (StatusCode::NOT_FOUND, "nope") }),
    ))
    .await;
    let err = HttpFetcher::new(None)
        .unwrap()
        .fetch_html(&host, "/gone")
        .await
        .unwrap_err();
    assert!(err.is_fetch());
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn unreachable_host_is_a_fetch_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = HttpFetcher::new(Some(Duration::from_secs(2)))
        .unwrap()
        .fetch_html(&host, "/")
        .await
        .unwrap_err();
    assert!(err.is_fetch());
}
