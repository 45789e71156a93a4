use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;

#[derive(Default)]
struct CountingFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl PageFetcher for CountingFetcher {
    async fn fetch_html(&self, _host: &str, _path: &str) -> CardResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("<title>T</title>".to_string())
    }
}

fn service(dir: &std::path::Path) -> (CardService, Arc<CountingFetcher>) {
    let fetcher = Arc::new(CountingFetcher::default());
    let config = CardConfig {
        cache_dir: dir.join("og"),
        ..CardConfig::default()
    };
    let svc = CardService::new(config, &RendererRegistry::with_builtins(), fetcher.clone()).unwrap();
    (svc, fetcher)
}

#[test]
fn card_route_detection() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _) = service(tmp.path());
    assert!(svc.is_card_route("/__og_image__"));
    assert!(svc.is_card_route("/__og_image__/"));
    assert!(svc.is_card_route("/__og_image__?path=/x"));
    assert!(svc.is_card_route("/__og_image__/nested"));
    assert!(!svc.is_card_route("/__og_image__x"));
    assert!(!svc.is_card_route("/blog/__og_image__"));
    assert!(!svc.is_card_route("/"));
}

#[tokio::test]
async fn recursive_and_empty_paths_are_rejected_without_fetching() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, fetcher) = service(tmp.path());

    let err = svc
        .card_for_path("/__og_image__?path=/a", DEFAULT_HOST)
        .await
        .unwrap_err();
    assert!(matches!(err, CardError::Validation(_)));
    assert!(matches!(
        svc.card_for_path("", DEFAULT_HOST).await,
        Err(CardError::Validation(_))
    ));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn init_runs_once() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _) = service(tmp.path());

    let first = svc.init().await.clone();
    std::fs::write(tmp.path().join("og/marker.jpg"), b"x").unwrap();
    let second = svc.init().await;

    assert!(first.cache.created);
    assert_eq!(first.fonts, 0);
    assert_eq!(second.cache, first.cache);
    // A second init must not purge again.
    assert!(tmp.path().join("og/marker.jpg").exists());
}

#[test]
fn unknown_renderer_fails_construction() {
    let config = CardConfig {
        renderer: "nope".to_string(),
        ..CardConfig::default()
    };
    let res = CardService::new(
        config,
        &RendererRegistry::with_builtins(),
        Arc::new(CountingFetcher::default()),
    );
    assert!(matches!(res, Err(CardError::Validation(_))));
}

#[test]
fn prepared_page_feeds_the_renderer_context() {
    let config = CardConfig {
        fixed_text: "example.com".to_string(),
        ..CardConfig::default()
    };
    let page = PreparedPage::from_html(
        r#"<title>Hello World</title><meta name="description" content="A post">"#,
        &config,
    );
    assert_eq!(page.meta.clean_title.as_deref(), Some("Hello World"));
    assert!(page.background.is_none());

    let fonts = FontBook::default();
    let ctx = page.context(&config, Canvas::CARD, &fonts);
    assert_eq!(ctx.fixed_text, "example.com");
    assert_eq!(ctx.jpeg_quality, config.jpeg_quality);
}
