//! Article extraction from a configured feed.
//!
//! Every feed goes through the same steps, driven by its [`RuleSet`]:
//!
//! 1. **Change detection**: fetch and parse the feed, compare its canonical
//!    serialization with the cached one; stop if nothing changed
//! 2. **Extraction**: pick the latest article node and read title, author,
//!    date and body from it (following a link for the body when the feed
//!    does not carry full text)
//!
//! The cache is overwritten as soon as a change is seen, before any later
//! step can fail. A feed whose new content fails to extract is therefore not
//! retried on the next run.

pub mod dates;
pub mod page;

use crate::cache::FeedCache;
use crate::config::{AuthorSource, BodySource, RuleSet};
use crate::error::ExtractError;
use crate::fetch::FetchAsync;
use crate::markup::{Document, Element};
use crate::models::Article;
use crate::utils::{normalize_whitespace, truncate_for_log};
use tracing::{debug, error, info, instrument};
use url::Url;

fn required<'a>(scope: &'a Element, selector: &str, what: &str) -> Result<&'a Element, ExtractError> {
    scope.find(selector).ok_or_else(|| {
        ExtractError::Parse(format!("no <{}> for {} in <{}>", selector, what, scope.name))
    })
}

/// Produce the feed's latest article if the feed changed since the last run.
///
/// # Arguments
///
/// * `fetcher` - Source for the feed and, in linked mode, the article page
/// * `cache` - Per-feed snapshots used for change detection
/// * `feed` - Feed name; also the cache entry name
/// * `rules` - How to find each field of the article in the feed
///
/// # Returns
///
/// * `Ok(Some(article))` - the feed changed and its first article was read
/// * `Ok(None)` - the canonical feed matches its cached snapshot
/// * `Err(_)` - network, parse or date failure; the cache may already hold
///   the new snapshot
///
/// # Examples
///
/// ```ignore
/// let cache = FeedCache::new("cache");
/// if let Some(article) = extract(&fetcher, &cache, "guardian", &rules).await? {
///     println!("{} ({})", article.title, article.details);
/// }
/// ```
#[instrument(level = "info", skip(fetcher, cache, rules), fields(url = %rules.url))]
pub async fn extract<F: FetchAsync>(
    fetcher: &F,
    cache: &FeedCache,
    feed: &str,
    rules: &RuleSet,
) -> Result<Option<Article>, ExtractError> {
    let raw = fetcher.fetch(&rules.url).await?;
    let document = Document::parse(&raw).map_err(ExtractError::Parse)?;
    let serialized = document.serialize();

    if !cache.has_changed(feed, &serialized).await {
        return Ok(None);
    }
    info!(%feed, "Saving cache");
    if let Err(e) = cache.save(feed, &serialized).await {
        error!(error = %e, "Could not save cache; continuing with extraction");
    }

    let article = document.find(&rules.article).ok_or_else(|| {
        ExtractError::Parse(format!("no <{}> article node in feed", rules.article))
    })?;

    let title = normalize_whitespace(&required(article, &rules.title, "title")?.text());
    if title.is_empty() {
        return Err(ExtractError::Parse("article title is empty".into()));
    }

    let author = match &rules.author {
        AuthorSource::Field(selector) => {
            normalize_whitespace(&required(article, selector, "author")?.text())
        }
        AuthorSource::Fixed(name) => name.clone(),
    };

    let body = match &rules.body {
        BodySource::Inline { content } => {
            page::html_to_text(&required(article, content, "content")?.text())
        }
        BodySource::Linked { content, tag, id } => {
            let link = linked_url(&rules.url, required(article, content, "link")?)?;
            debug!(%link, "Following article link");
            let html = fetcher.fetch(&link).await?;
            page::block_text(&page::decode_page(&html), tag, id)?
        }
    };

    let raw_date = required(article, &rules.publish_date, "publish date")?.text();
    let date = dates::reformat(&raw_date, &rules.date_format)?;

    info!(
        %title,
        %author,
        %date,
        body_preview = %truncate_for_log(&body, 80),
        "Extracted article"
    );
    Ok(Some(Article::new(title, &author, &date, body)))
}

/// Absolute URL of the linked article page.
///
/// RSS `<link>` carries the URL as text, Atom `<link>` in its `href`.
/// Relative links resolve against the feed URL.
fn linked_url(feed_url: &str, node: &Element) -> Result<String, ExtractError> {
    let text = node.text();
    let target = match text.trim() {
        "" => node
            .attr("href")
            .ok_or_else(|| ExtractError::Parse(format!("<{}> holds no link", node.name)))?,
        t => t,
    };
    let base = Url::parse(feed_url).map_err(|e| ExtractError::Parse(e.to_string()))?;
    base.join(target)
        .map(|u| u.to_string())
        .map_err(|e| ExtractError::Parse(format!("bad link {:?}: {}", target, e)))
}
