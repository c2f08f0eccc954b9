//! Per-feed snapshot of the last-seen feed document.
//!
//! One file per feed, `<dir>/<feed>.cache`, holding the canonical serialized
//! feed. A feed has news when its current serialization differs from the file.

use crate::error::CacheError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Directory of per-feed snapshots.
///
/// # Examples
///
/// ```ignore
/// let cache = FeedCache::new("cache");
/// if cache.has_changed("guardian", &serialized).await {
///     cache.save("guardian", &serialized).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FeedCache {
    dir: PathBuf,
}

impl FeedCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, feed: &str) -> PathBuf {
        self.dir.join(format!("{}.cache", feed))
    }

    /// True when no entry exists for `feed` or the stored payload differs.
    ///
    /// A missing entry is a first run. Any other read failure is logged and
    /// also counts as changed.
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn has_changed(&self, feed: &str, payload: &str) -> bool {
        let path = self.entry_path(feed);
        match fs::read(&path).await {
            Ok(stored) => stored != payload.as_bytes(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(%feed, "No existing cache");
                true
            }
            Err(source) => {
                let err = CacheError {
                    feed: feed.to_string(),
                    path: path.display().to_string(),
                    source,
                };
                error!(error = %err, "Cache unreadable; assuming new content");
                true
            }
        }
    }

    /// Store `payload` as the new baseline for `feed`.
    ///
    /// # Arguments
    ///
    /// * `feed` - Feed name, used as the file stem
    /// * `payload` - Canonical serialized feed
    ///
    /// # Errors
    ///
    /// A [`CacheError`] when the directory cannot be created or the file
    /// cannot be written. Callers log it and carry on.
    #[instrument(level = "debug", skip(self, payload), fields(bytes = payload.len()))]
    pub async fn save(&self, feed: &str, payload: &str) -> Result<(), CacheError> {
        let path = self.entry_path(feed);
        let wrap = |source| CacheError {
            feed: feed.to_string(),
            path: path.display().to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).await.map_err(wrap)?;
        fs::write(&path, payload).await.map_err(wrap)?;
        info!(%feed, "Saved cache");
        Ok(())
    }

    /// Drop every entry so the next run treats all feeds as new.
    #[instrument(level = "info", skip(self), fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> Result<(), std::io::Error> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        fs::create_dir_all(&self.dir).await?;
        info!("Cleared cache");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn scratch_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("watchman-{}-{}", tag, rand::random::<u64>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_entry_counts_as_changed() {
        let cache = FeedCache::new(scratch_dir("cache"));
        assert!(cache.has_changed("alpha", "<rss/>").await);
    }

    #[tokio::test]
    async fn test_identical_payload_is_unchanged() {
        let dir = scratch_dir("cache");
        let cache = FeedCache::new(&dir);
        cache.save("alpha", "<rss/>").await.unwrap();
        assert!(!cache.has_changed("alpha", "<rss/>").await);
        assert!(cache.has_changed("alpha", "<rss></rss>").await);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_entry() {
        let dir = scratch_dir("cache");
        let cache = FeedCache::new(&dir);
        cache.save("alpha", "first").await.unwrap();
        cache.save("alpha", "second").await.unwrap();
        let stored = std::fs::read_to_string(dir.join("alpha.cache")).unwrap();
        assert_eq!(stored, "second");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_entries_are_per_feed() {
        let dir = scratch_dir("cache");
        let cache = FeedCache::new(&dir);
        cache.save("alpha", "same").await.unwrap();
        assert!(cache.has_changed("beta", "same").await);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_unreadable_entry_counts_as_changed() {
        let dir = scratch_dir("cache");
        // A directory where the entry file should be makes the read fail
        // with something other than NotFound.
        std::fs::create_dir_all(dir.join("alpha.cache")).unwrap();
        let cache = FeedCache::new(&dir);
        assert!(cache.has_changed("alpha", "anything").await);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_clear_removes_entries() {
        let dir = scratch_dir("cache");
        let cache = FeedCache::new(&dir);
        cache.save("alpha", "payload").await.unwrap();
        cache.clear().await.unwrap();
        assert!(dir.is_dir());
        assert!(cache.has_changed("alpha", "payload").await);
        std::fs::remove_dir_all(&dir).ok();
    }
}
