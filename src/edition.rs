//! File-backed edition counter.
//!
//! The file holds a plain integer: the number of the next edition. Each run
//! stamps that number on its masthead and writes back the number plus one,
//! before any feed is fetched.

use crate::error::CounterError;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct EditionCounter {
    path: PathBuf,
}

impl EditionCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the current edition number and persist its successor.
    ///
    /// A missing file starts the count at 1.
    #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    pub async fn advance(&self) -> Result<u64, CounterError> {
        let io = |source| CounterError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let current = match fs::read_to_string(&self.path).await {
            Ok(content) => content
                .trim()
                .parse::<u64>()
                .map_err(|_| CounterError::NotANumber {
                    path: self.path.display().to_string(),
                    content: content.clone(),
                })?,
            Err(e) if e.kind() == ErrorKind::NotFound => 1,
            Err(e) => return Err(io(e)),
        };

        fs::write(&self.path, (current + 1).to_string())
            .await
            .map_err(io)?;
        info!(edition = current, "Edition counter advanced");
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::scratch_dir;

    #[tokio::test]
    async fn test_advance_increments_by_one_per_run() {
        let dir = scratch_dir("edition");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("edition.txt");
        std::fs::write(&path, "41\n").unwrap();

        let counter = EditionCounter::new(&path);
        assert_eq!(counter.advance().await.unwrap(), 41);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "42");
        assert_eq!(counter.advance().await.unwrap(), 42);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "43");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_counter_starts_at_one() {
        let dir = scratch_dir("edition");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("edition.txt");

        let counter = EditionCounter::new(&path);
        assert_eq!(counter.advance().await.unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_garbage_counter_is_an_error() {
        let dir = scratch_dir("edition");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("edition.txt");
        std::fs::write(&path, "twelve").unwrap();

        let counter = EditionCounter::new(&path);
        assert!(matches!(
            counter.advance().await,
            Err(CounterError::NotANumber { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "twelve");
        std::fs::remove_dir_all(&dir).ok();
    }
}
