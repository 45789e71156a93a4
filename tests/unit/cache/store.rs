use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

#[test]
fn keys_flatten_separators() {
    assert_eq!(cache_key("/blog/hello-world"), "__blog__hello-world.jpg");
    assert_eq!(cache_key("/"), "__.jpg");
    assert_eq!(cache_key("a\\b"), "a__b.jpg");
    assert_eq!(cache_key("/../etc"), "__..__etc.jpg");
}

fn counting(
    calls: &Arc<AtomicUsize>,
    bytes: &'static [u8],
) -> impl FnOnce() -> std::future::Ready<CardResult<Vec<u8>>> {
    let calls = calls.clone();
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(bytes.to_vec()))
    }
}

#[tokio::test]
async fn second_lookup_is_a_hit_without_compute() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = CardCache::new(tmp.path().join("og"), false);
    let calls = Arc::new(AtomicUsize::new(0));

    let first = cache.get_or_create("__a.jpg", counting(&calls, b"one")).await.unwrap();
    let second = cache.get_or_create("__a.jpg", counting(&calls, b"two")).await.unwrap();

    assert_eq!(first.status, CacheStatus::Miss);
    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(second.bytes, b"one");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(std::fs::read(tmp.path().join("og/__a.jpg")).unwrap(), b"one");
}

#[tokio::test]
async fn force_regenerate_always_recomputes() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = CardCache::new(tmp.path(), true);
    let calls = Arc::new(AtomicUsize::new(0));

    cache.get_or_create("k.jpg", counting(&calls, b"one")).await.unwrap();
    let second = cache.get_or_create("k.jpg", counting(&calls, b"two")).await.unwrap();

    assert_eq!(second.status, CacheStatus::Miss);
    assert_eq!(second.bytes, b"two");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(std::fs::read(tmp.path().join("k.jpg")).unwrap(), b"two");
}

#[tokio::test]
async fn failed_compute_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = CardCache::new(tmp.path(), false);

    let err = cache
        .get_or_create("k.jpg", || async { Err(CardError::fetch("down")) })
        .await
        .unwrap_err();

    assert!(err.is_fetch());
    assert!(!tmp.path().join("k.jpg").exists());
}

#[tokio::test]
async fn write_failure_is_a_cache_error() {
    let tmp = tempfile::tempdir().unwrap();
    // A regular file where the cache directory should be.
    let blocker = tmp.path().join("og");
    std::fs::write(&blocker, b"x").unwrap();
    let cache = CardCache::new(&blocker, true);

    let err = cache
        .get_or_create("k.jpg", || async { Ok(vec![1]) })
        .await
        .unwrap_err();
    assert!(matches!(err, CardError::Cache { .. }));
}

#[tokio::test]
async fn bootstrap_purges_previous_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("og");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("stale.jpg"), b"old").unwrap();

    let report = CardCache::new(&dir, false).bootstrap().await;

    assert!(report.purged && report.created);
    assert_eq!(report.error, None);
    assert!(dir.is_dir());
    assert!(!dir.join("stale.jpg").exists());
}

#[tokio::test]
async fn bootstrap_creates_missing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("nested/og");

    let report = CardCache::new(&dir, false).bootstrap().await;

    assert!(!report.purged);
    assert!(report.created);
    assert!(dir.is_dir());
}

#[tokio::test]
async fn bootstrap_failure_is_reported_not_raised() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();

    let report = CardCache::new(blocker.join("og"), false).bootstrap().await;

    assert!(!report.created);
    assert!(report.error.is_some());
}
