use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;
use url::Url;

pub const DEFAULT_DOCS_HOST: &str = "https://grafana.com";
pub const DEFAULT_CONTENT_PATH_PREFIX: &str = "/docs/";
pub const DEFAULT_JOURNEY_PATH_PREFIX: &str = "/docs/learning-journeys/";
pub const DEFAULT_CONTENT_SUFFIX: &str = "unstyled.html";
pub const DEFAULT_INDEX_FILE: &str = "index.json";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONTENT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct JourneyConfig {
    pub docs_host: Url,
    pub content_path_prefix: String,
    pub journey_path_prefix: String,
    pub content_suffix: String,
    pub intro_suffixes: Vec<String>,
    pub index_file: String,
    pub request_timeout: Duration,
    pub content_ttl: Duration,
    pub credentials: Option<Credentials>,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            docs_host: Url::parse(DEFAULT_DOCS_HOST).expect("default docs host is a valid url"),
            content_path_prefix: DEFAULT_CONTENT_PATH_PREFIX.to_owned(),
            journey_path_prefix: DEFAULT_JOURNEY_PATH_PREFIX.to_owned(),
            content_suffix: DEFAULT_CONTENT_SUFFIX.to_owned(),
            intro_suffixes: vec!["introduction/".to_owned(), "overview/".to_owned()],
            index_file: DEFAULT_INDEX_FILE.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            content_ttl: DEFAULT_CONTENT_TTL,
            credentials: None,
        }
    }
}

impl JourneyConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(host) = env_value("JOURNEYS_DOCS_HOST") {
            config
                .set_docs_host(&host)
                .with_context(|| format!("invalid JOURNEYS_DOCS_HOST={host:?}"))?;
        }
        if let Some(prefix) = env_value("JOURNEYS_CONTENT_PREFIX") {
            config.content_path_prefix = normalize_prefix(&prefix);
        }
        if let Some(prefix) = env_value("JOURNEYS_JOURNEY_PREFIX") {
            config.journey_path_prefix = normalize_prefix(&prefix);
        }
        if let Some(raw) = env_value("JOURNEYS_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("invalid JOURNEYS_TIMEOUT_SECS={raw:?}"))?;
            config.set_timeout_secs(secs)?;
        }

        config.credentials = env_value("JOURNEYS_USERNAME").map(|username| Credentials {
            username,
            password: std::env::var("JOURNEYS_PASSWORD").unwrap_or_default(),
        });

        Ok(config)
    }

    pub fn set_docs_host(&mut self, raw: &str) -> anyhow::Result<()> {
        let host = Url::parse(raw.trim()).context("parse docs host")?;
        if host.scheme() != "http" && host.scheme() != "https" {
            anyhow::bail!("docs host must be http/https: {host}");
        }
        if host.host_str().is_none() {
            anyhow::bail!("docs host must have a host: {host}");
        }
        self.docs_host = host;
        Ok(())
    }

    pub fn set_timeout_secs(&mut self, secs: u64) -> anyhow::Result<()> {
        if secs == 0 {
            anyhow::bail!("request timeout must be at least 1 second");
        }
        self.request_timeout = Duration::from_secs(secs);
        Ok(())
    }
}

/// Path prefixes always start and end with `/`.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return "/".to_owned();
    }
    format!("/{trimmed}/")
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
