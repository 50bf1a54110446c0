//! The open-a-page pipeline and the per-view state machine around it.

use std::sync::Arc;

use url::Url;

use crate::cache::{Clock, JourneyCache, SystemClock};
use crate::config::JourneyConfig;
use crate::error::JourneyError;
use crate::fetch::{ContentFetcher, DocumentSource, HttpSource};
use crate::formats::{JourneyContent, Milestone};
use crate::index::MilestoneIndexFetcher;
use crate::navigate;
use crate::position::resolve_position;
use crate::resolve::UrlResolver;
use crate::transform::{TransformContext, Transformer};

/// Cache, resolver, fetchers and transformer wired together. Cheap to share
/// behind an `Arc` between views.
pub struct JourneyService {
    resolver: UrlResolver,
    fetcher: ContentFetcher,
    index: MilestoneIndexFetcher,
    transformer: Transformer,
    cache: Arc<JourneyCache>,
}

impl JourneyService {
    pub fn new(
        config: &JourneyConfig,
        source: Arc<dyn DocumentSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(JourneyCache::new(clock, config.content_ttl));
        Self {
            resolver: UrlResolver::new(config),
            fetcher: ContentFetcher::new(source.clone()),
            index: MilestoneIndexFetcher::new(source, cache.clone(), config),
            transformer: Transformer::new(config),
            cache,
        }
    }

    /// Service backed by the real network and wall clock.
    pub fn from_config(config: &JourneyConfig) -> anyhow::Result<Self> {
        let source = Arc::new(HttpSource::new(config)?);
        Ok(Self::new(config, source, Arc::new(SystemClock)))
    }

    pub fn cache(&self) -> &JourneyCache {
        &self.cache
    }

    pub fn resolver(&self) -> &UrlResolver {
        &self.resolver
    }

    pub async fn load_index(&self, base_url: &str) -> Result<Vec<Milestone>, JourneyError> {
        Ok(self.index.load_index(base_url).await?)
    }

    /// Fetches, positions and transforms the page at `url`, or serves it from
    /// the content cache while it is fresh.
    pub async fn open(
        &self,
        url: &str,
        title: Option<&str>,
    ) -> Result<JourneyContent, JourneyError> {
        if let Some(cached) = self.cache.get_content(url) {
            tracing::debug!(url, "content cache hit");
            return Ok(cached);
        }
        tracing::debug!(url, "content cache miss");

        let resolved = self.resolver.resolve(url);
        let Some(document) = self.fetcher.fetch(&resolved).await else {
            return Err(JourneyError::Exhausted {
                url: url.to_owned(),
                attempts: resolved.candidates().count(),
            });
        };

        let base_url = self.resolver.base_url_of(url);
        let mut milestones = self.index.load_index(&base_url).await?;
        let current_ordinal = resolve_position(url, &base_url, &mut milestones);

        // Relative references follow the requested page's directory, whichever
        // candidate ended up answering.
        let page_url = Url::parse(&resolved.primary).ok();
        let transformed = self.transformer.transform(
            &document.body,
            TransformContext {
                page_url: page_url.as_ref(),
                is_cover_page: current_ordinal == 0,
                current_ordinal,
                milestones: &milestones,
            },
        );

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .or_else(|| {
                milestones
                    .iter()
                    .find(|m| m.is_active)
                    .map(|m| m.title.clone())
            })
            .or_else(|| transformed.body.first_heading_text())
            .unwrap_or_else(|| url.to_owned());

        let content = JourneyContent {
            title,
            body: transformed.body,
            source_url: document.url,
            current_ordinal,
            total_milestones: milestones.len(),
            milestones,
            fetched_at: self.cache.now(),
            summary: transformed.summary,
            anchor_fragment: resolved.fragment,
        };

        tracing::info!(
            url,
            ordinal = content.current_ordinal,
            total = content.total_milestones,
            "opened journey page"
        );
        self.cache.put_content(url, content.clone());
        Ok(content)
    }

    pub fn next_url<'a>(&self, content: &'a JourneyContent) -> Option<&'a str> {
        navigate::next_url(content.current_ordinal, &content.milestones)
    }

    pub fn previous_url<'a>(&self, content: &'a JourneyContent) -> Option<&'a str> {
        navigate::previous_url(content.current_ordinal, &content.milestones)
    }

    /// Called when the host closes a journey's tab.
    pub fn clear_journey(&self, url: &str) {
        let base_url = self.resolver.base_url_of(url);
        self.cache.clear_journey(&base_url);
    }

    pub fn clear_all(&self) {
        self.cache.clear_all();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Loaded(JourneyContent),
    Errored(String),
}

impl ViewState {
    fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Loaded(_) => "loaded",
            ViewState::Errored(_) => "errored",
        }
    }
}

/// One open journey tab.
pub struct JourneyView {
    service: Arc<JourneyService>,
    state: ViewState,
    /// Last requested URL and title, kept for `reload` and `close`.
    request: Option<(String, Option<String>)>,
}

impl JourneyView {
    pub fn new(service: Arc<JourneyService>) -> Self {
        Self {
            service,
            state: ViewState::Idle,
            request: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn content(&self) -> Option<&JourneyContent> {
        match &self.state {
            ViewState::Loaded(content) => Some(content),
            _ => None,
        }
    }

    pub async fn open(&mut self, url: &str, title: Option<&str>) -> &ViewState {
        self.request = Some((url.to_owned(), title.map(str::to_owned)));
        self.transition(ViewState::Loading);
        let next = match self.service.open(url, title).await {
            Ok(content) => ViewState::Loaded(content),
            Err(err) => {
                tracing::warn!(url, %err, "journey page failed to load");
                ViewState::Errored(err.to_string())
            }
        };
        self.transition(next);
        &self.state
    }

    /// Moves to the following milestone. `None` when there is nothing to move
    /// to; the state is left untouched in that case.
    pub async fn next(&mut self) -> Option<&ViewState> {
        let url = self
            .content()
            .and_then(|c| self.service.next_url(c))?
            .to_owned();
        Some(self.open(&url, None).await)
    }

    pub async fn previous(&mut self) -> Option<&ViewState> {
        let url = self
            .content()
            .and_then(|c| self.service.previous_url(c))?
            .to_owned();
        Some(self.open(&url, None).await)
    }

    /// Opens the last requested page again. Fresh cache entries are reused.
    pub async fn reload(&mut self) -> Option<&ViewState> {
        let (url, title) = self.request.clone()?;
        Some(self.open(&url, title.as_deref()).await)
    }

    pub fn close(&mut self) {
        if let Some((url, _)) = self.request.take() {
            self.service.clear_journey(&url);
        }
        self.transition(ViewState::Idle);
    }

    fn transition(&mut self, next: ViewState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "journey view state");
        self.state = next;
    }
}
