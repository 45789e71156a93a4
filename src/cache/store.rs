//! On-disk card cache keyed by request path.
//!
//! Entries are plain files under one directory. There is no locking: two requests for the same
//! missing key both compute and both write, and the last writer wins.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::foundation::error::{CardError, CardResult};

/// Filesystem-safe file name for a request path: separators become `__`, `.jpg` is appended.
pub fn cache_key(path: &str) -> String {
    let mut key = String::with_capacity(path.len() + 8);
    for ch in path.chars() {
        match ch {
            '/' | '\\' => key.push_str("__"),
            c => key.push(c),
        }
    }
    key.push_str(".jpg");
    key
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

#[derive(Clone, Debug)]
pub struct CacheOutcome {
    pub bytes: Vec<u8>,
    pub status: CacheStatus,
    pub path: PathBuf,
}

/// What [`CardCache::bootstrap`] did to the cache directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub purged: bool,
    pub created: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CardCache {
    dir: PathBuf,
    force_regenerate: bool,
}

impl CardCache {
    pub fn new(dir: impl Into<PathBuf>, force_regenerate: bool) -> Self {
        Self {
            dir: dir.into(),
            force_regenerate,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Return the cached bytes for `key`, or run `compute` and store its result.
    ///
    /// With force-regenerate on, existing entries are ignored and overwritten.
    pub async fn get_or_create<F, Fut>(&self, key: &str, compute: F) -> CardResult<CacheOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CardResult<Vec<u8>>>,
    {
        let path = self.path_for(key);

        if !self.force_regenerate {
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    tracing::debug!(path = %path.display(), "card cache hit");
                    return Ok(CacheOutcome {
                        bytes,
                        status: CacheStatus::Hit,
                        path,
                    });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CardError::cache(path, e)),
            }
        }

        tracing::debug!(path = %path.display(), force = self.force_regenerate, "card cache miss");
        let bytes = compute().await?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CardError::cache(&self.dir, e))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CardError::cache(&path, e))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "card written");

        Ok(CacheOutcome {
            bytes,
            status: CacheStatus::Miss,
            path,
        })
    }

    /// Purge and recreate the cache directory. Failures are logged and reported, never returned.
    pub async fn bootstrap(&self) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => report.purged = true,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "failed to purge card cache");
                report.error = Some(e.to_string());
            }
        }

        match tokio::fs::create_dir_all(&self.dir).await {
            Ok(()) => report.created = true,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "failed to create card cache");
                report.error.get_or_insert_with(|| e.to_string());
            }
        }

        tracing::debug!(dir = %self.dir.display(), ?report, "card cache bootstrapped");
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
