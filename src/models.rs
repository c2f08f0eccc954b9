//! Data models shared by the pipeline and the composer.
//!
//! - [`Article`]: one normalized article extracted from a feed
//! - [`Edition`]: the number and date stamped on the masthead

use chrono::NaiveDate;

/// A normalized article ready for layout.
///
/// Only built when a feed's payload differs from its cached baseline; a feed
/// without news yields no `Article` at all, never an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Headline, never empty.
    pub title: String,
    /// Byline in the form `"{author}, {D/M/YY}"`.
    pub details: String,
    /// Plain body text with markup stripped.
    pub body: String,
}

impl Article {
    pub fn new(title: String, author: &str, date: &str, body: String) -> Self {
        Self {
            title,
            details: format!("{}, {}", author, date),
            body,
        }
    }
}

/// Identity of one run's output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edition {
    /// Counter value printed as "Edition N".
    pub number: u64,
    /// Calendar date the edition is published for.
    pub date: NaiveDate,
}
