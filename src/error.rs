//! Error kinds for every stage of an edition run.
//!
//! Per-feed failures ([`ExtractError`]) are caught at the feed boundary by the
//! pipeline and never end the run. The remaining kinds are run-fatal and are
//! folded into [`RunError`] for `main`.

use thiserror::Error;

/// A fetch that did not yield a usable response body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Why a single feed contributed no article.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Network(#[from] FetchError),
    #[error("parse failure: {0}")]
    Parse(String),
    #[error("date {raw:?} does not match format {format:?}")]
    DateFormat { raw: String, format: String },
}

impl ExtractError {
    /// Short stable label used in logs and run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Network(_) => "network",
            ExtractError::Parse(_) => "parse",
            ExtractError::DateFormat { .. } => "date_format",
        }
    }
}

#[derive(Debug, Error)]
#[error("cache entry for {feed} at {path}: {source}")]
pub struct CacheError {
    pub feed: String,
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config {path} is not valid YAML: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("feed {feed:?}: {reason}")]
    Invalid { feed: String, reason: String },
    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("missing mail setting {0} (set it in the environment or .env)")]
    MissingMailSetting(&'static str),
}

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("edition counter {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("edition counter {path} holds {content:?}, not an integer")]
    NotANumber { path: String, content: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("output directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("pdf writer: {0}")]
    Pdf(String),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("cannot read attachment {path}: {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bad address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("cannot build message: {0}")]
    Message(String),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Failures that end the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Counter(#[from] CounterError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
