use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

use crate::config::JourneyConfig;
use crate::error::FetchError;
use crate::resolve::ResolvedUrl;

/// Anything that can GET a URL and hand back its body as text.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    authorization: Option<String>,
}

impl HttpSource {
    pub fn new(config: &JourneyConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build journey http client")?;

        Ok(Self {
            client,
            authorization: config.credentials.as_ref().map(|c| c.header_value()),
        })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, "learning-journeys/0.1")
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            );
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request.send().await.map_err(|err| FetchError::Network {
            url: url.to_owned(),
            message: if err.is_timeout() {
                format!("timed out: {err}")
            } else {
                err.to_string()
            },
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| FetchError::Network {
            url: url.to_owned(),
            message: format!("read body: {err}"),
        })?;
        require_body(url, body)
    }
}

pub(crate) fn require_body(url: &str, body: String) -> Result<String, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody {
            url: url.to_owned(),
        });
    }
    Ok(body)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Candidate that answered.
    pub url: String,
    pub body: String,
}

/// Tries every candidate of a [`ResolvedUrl`] in order; the first non-empty
/// success wins.
#[derive(Clone)]
pub struct ContentFetcher {
    source: Arc<dyn DocumentSource>,
}

impl ContentFetcher {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, resolved: &ResolvedUrl) -> Option<FetchedDocument> {
        for candidate in resolved.candidates() {
            let result = self
                .source
                .get_text(candidate)
                .await
                .and_then(|body| require_body(candidate, body));
            match result {
                Ok(body) => {
                    tracing::debug!(url = candidate, bytes = body.len(), "fetched journey page");
                    return Some(FetchedDocument {
                        url: candidate.to_owned(),
                        body,
                    });
                }
                Err(err) => {
                    tracing::debug!(url = candidate, %err, "candidate failed; trying next");
                }
            }
        }

        tracing::warn!(
            primary = %resolved.primary,
            attempts = resolved.candidates().count(),
            "every candidate url failed"
        );
        None
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory source that records every URL it is asked for.
    #[derive(Default)]
    pub struct MapSource {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MapSource {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_owned(), body.to_owned());
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentSource for MapSource {
        async fn get_text(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_owned());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::HttpStatus {
                    url: url.to_owned(),
                    status: 404,
                })
        }
    }
}
