//! Feed configuration: the YAML rule sets and the mail settings.
//!
//! The YAML file maps a feed name to its extraction recipe:
//!
//! ```yaml
//! guardian:
//!   url: https://www.theguardian.com/world/rss
//!   article: item
//!   title: title
//!   author: dc:creator
//!   authorIncluded: true
//!   publishDate: pubDate
//!   dateFormat: "%a, %d %b %Y %H:%M:%S %Z"
//!   fulltext: false
//!   content: link
//!   tag: div
//!   id: maincontent
//! ```
//!
//! Each entry is deserialized into a loose [`RawRuleSet`] and then validated
//! into a [`RuleSet`], so a feed missing `tag`/`id` in linked mode is rejected
//! when the file is loaded rather than halfway through a run.

use crate::error::ConfigError;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;

/// One feed entry as written in the YAML file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRuleSet {
    url: String,
    article: String,
    title: String,
    author: String,
    #[serde(default = "default_true")]
    author_included: bool,
    publish_date: String,
    date_format: String,
    fulltext: bool,
    content: String,
    tag: Option<String>,
    id: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Where the byline author comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorSource {
    /// Selector for a per-item author node.
    Field(String),
    /// Fixed feed-level name for feeds without per-item authors.
    Fixed(String),
}

/// Where the body text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    /// `content` selects a node holding the body markup.
    Inline { content: String },
    /// `content` selects a node holding a link; the body is the `tag`
    /// element with the given `id` on the linked page.
    Linked {
        content: String,
        tag: String,
        id: String,
    },
}

/// Validated extraction recipe for one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub url: String,
    pub article: String,
    pub title: String,
    pub author: AuthorSource,
    pub publish_date: String,
    pub date_format: String,
    pub body: BodySource,
}

/// A named feed and its rules.
#[derive(Debug, Clone)]
pub struct Feed {
    pub name: String,
    pub rules: RuleSet,
}

/// All configured feeds, in file order.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub feeds: Vec<Feed>,
}

impl FeedConfig {
    /// Read and validate the YAML file at `path`.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml(&text).map_err(|e| match e {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: path.to_string(),
                source,
            },
            other => other,
        })?;
        info!(feeds = config.feeds.len(), "Loaded feed configuration");
        Ok(config)
    }

    /// Parse YAML text, keeping feeds in the order they are written.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let yaml_err = |source| ConfigError::Yaml {
            path: String::new(),
            source,
        };
        let mapping = match serde_yaml::from_str::<serde_yaml::Value>(text).map_err(yaml_err)? {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => serde_yaml::Mapping::new(),
            other => {
                return Err(ConfigError::Invalid {
                    feed: String::new(),
                    reason: format!("expected a mapping of feed names, found {:?}", other),
                });
            }
        };

        let mut feeds = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = key
                .as_str()
                .ok_or_else(|| ConfigError::Invalid {
                    feed: format!("{:?}", key),
                    reason: "feed names must be strings".into(),
                })?
                .to_string();
            let raw: RawRuleSet =
                serde_yaml::from_value(value).map_err(|e| ConfigError::Invalid {
                    feed: name.clone(),
                    reason: e.to_string(),
                })?;
            let rules = validate(&name, raw)?;
            feeds.push(Feed { name, rules });
        }

        if feeds.is_empty() {
            warn!("No feeds configured; the edition will carry only the placeholder");
        }
        Ok(Self { feeds })
    }
}

fn validate(name: &str, raw: RawRuleSet) -> Result<RuleSet, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        feed: name.to_string(),
        reason: reason.to_string(),
    };

    // The name doubles as the cache file stem.
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(invalid("name must be a plain file stem"));
    }
    Url::parse(&raw.url).map_err(|e| invalid(&format!("url {:?}: {}", raw.url, e)))?;

    for (field, value) in [
        ("article", &raw.article),
        ("title", &raw.title),
        ("author", &raw.author),
        ("publishDate", &raw.publish_date),
        ("dateFormat", &raw.date_format),
        ("content", &raw.content),
    ] {
        if value.trim().is_empty() {
            return Err(invalid(&format!("{} must not be empty", field)));
        }
    }

    let author = if raw.author_included {
        AuthorSource::Field(raw.author)
    } else {
        AuthorSource::Fixed(raw.author)
    };

    let body = if raw.fulltext {
        BodySource::Inline {
            content: raw.content,
        }
    } else {
        match (raw.tag, raw.id) {
            (Some(tag), Some(id)) if !tag.trim().is_empty() && !id.trim().is_empty() => {
                BodySource::Linked {
                    content: raw.content,
                    tag,
                    id,
                }
            }
            _ => return Err(invalid("tag and id are required when fulltext is false")),
        }
    };

    Ok(RuleSet {
        url: raw.url,
        article: raw.article,
        title: raw.title,
        author,
        publish_date: raw.publish_date,
        date_format: raw.date_format,
        body,
    })
}

/// Mail account and recipient, taken from the process environment.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub account: String,
    pub password: String,
    pub recipient: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl MailSettings {
    /// Build settings from optional values, naming the first one missing.
    pub fn from_parts(
        account: Option<String>,
        password: Option<String>,
        recipient: Option<String>,
        smtp_host: String,
        smtp_port: u16,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            account: account.ok_or(ConfigError::MissingMailSetting("GMAIL"))?,
            password: password.ok_or(ConfigError::MissingMailSetting("GMAIL_PASSWORD"))?,
            recipient: recipient.ok_or(ConfigError::MissingMailSetting("KINDLE"))?,
            smtp_host,
            smtp_port,
        })
    }
}
