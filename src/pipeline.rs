//! The edition pipeline: every configured feed, in order, one at a time.

use crate::cache::FeedCache;
use crate::config::FeedConfig;
use crate::fetch::FetchAsync;
use crate::models::Article;
use crate::scrapers;
use tracing::{error, info, instrument};

/// What happened to one feed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    New,
    Unchanged,
    /// Extraction failed; carries [`crate::error::ExtractError::kind`].
    Failed(&'static str),
}

/// Articles for the composer plus per-feed outcomes, both in config order.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub articles: Vec<Article>,
    pub outcomes: Vec<(String, FeedOutcome)>,
}

impl PipelineReport {
    pub fn count(&self, outcome: &FeedOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| o == outcome).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, FeedOutcome::Failed(_)))
            .count()
    }
}

/// Run the extractor over every feed sequentially.
///
/// A failing feed is logged and skipped; it never stops later feeds.
#[instrument(level = "info", skip_all, fields(feeds = config.feeds.len()))]
pub async fn run<F: FetchAsync>(fetcher: &F, cache: &FeedCache, config: &FeedConfig) -> PipelineReport {
    let mut report = PipelineReport::default();

    for feed in &config.feeds {
        let outcome = match scrapers::extract(fetcher, cache, &feed.name, &feed.rules).await {
            Ok(Some(article)) => {
                report.articles.push(article);
                FeedOutcome::New
            }
            Ok(None) => {
                info!(feed = %feed.name, "No new content");
                FeedOutcome::Unchanged
            }
            Err(e) => {
                error!(feed = %feed.name, kind = e.kind(), error = %e, "Extraction failed; skipping feed");
                FeedOutcome::Failed(e.kind())
            }
        };
        report.outcomes.push((feed.name.clone(), outcome));
    }

    info!(
        new = report.count(&FeedOutcome::New),
        unchanged = report.count(&FeedOutcome::Unchanged),
        failed = report.failed(),
        "Pipeline finished"
    );
    report
}
