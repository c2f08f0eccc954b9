//! HTTP fetching behind a small trait.
//!
//! The pipeline only needs "give me the bytes at this URL". [`FetchAsync`] is
//! that seam: [`HttpFetcher`] implements it with `reqwest`, tests implement it
//! with canned responses.

use crate::error::FetchError;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument};

/// Fetch the body at a URL.
#[allow(async_fn_in_trait)]
pub trait FetchAsync {
    /// Return the response body, or an error for transport failures and
    /// non-success statuses.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// `reqwest`-backed fetcher. One attempt per URL, no retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("watchman/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let start = Instant::now();
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(transport)?;
        debug!(
            bytes = body.len(),
            millis = start.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned responses keyed by URL; unknown URLs answer 404.
    #[derive(Default)]
    pub struct StubFetcher {
        responses: HashMap<String, Result<Vec<u8>, u16>>,
        pub requests: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), Ok(body.as_bytes().to_vec()));
            self
        }

        pub fn with_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
            self.responses.insert(url.to_string(), Ok(body));
            self
        }

        pub fn failing(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(url.to_string(), Err(status));
            self
        }
    }

    impl FetchAsync for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }
}
