use std::cmp::Ordering;
use std::sync::Arc;

use url::Url;

use crate::cache::JourneyCache;
use crate::config::JourneyConfig;
use crate::error::IndexError;
use crate::fetch::{DocumentSource, require_body};
use crate::formats::{ImageRef, IndexEntry, IndexLinkGroup, LinkGroup, LinkItem, Milestone};
use crate::resolve::{absolutize, split_fragment};

pub const DEFAULT_ESTIMATED_DURATION: &str = "1-2 min";
const DEFAULT_SIDE_JOURNEYS_HEADING: &str = "More to explore";
const DEFAULT_RELATED_JOURNEYS_HEADING: &str = "Related journeys";

/// Loads a journey's page index once per session and keeps it in the
/// milestone tier of the [`JourneyCache`].
#[derive(Clone)]
pub struct MilestoneIndexFetcher {
    source: Arc<dyn DocumentSource>,
    cache: Arc<JourneyCache>,
    docs_host: Url,
    index_file: String,
}

impl MilestoneIndexFetcher {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        cache: Arc<JourneyCache>,
        config: &JourneyConfig,
    ) -> Self {
        Self {
            source,
            cache,
            docs_host: config.docs_host.clone(),
            index_file: config.index_file.clone(),
        }
    }

    pub async fn load_index(&self, base_url: &str) -> Result<Vec<Milestone>, IndexError> {
        if let Some(cached) = self.cache.milestones(base_url) {
            tracing::debug!(base_url, milestones = cached.len(), "milestone index cache hit");
            return Ok(cached);
        }

        let index_url = index_url(base_url, &self.index_file);
        let body = self
            .source
            .get_text(&index_url)
            .await
            .and_then(|body| require_body(&index_url, body))?;
        let milestones = parse_index(&body, &index_url, &self.docs_host)?;

        tracing::info!(base_url, milestones = milestones.len(), "loaded milestone index");
        self.cache.put_milestones(base_url, milestones.clone());
        Ok(milestones)
    }
}

pub fn index_url(base_url: &str, index_file: &str) -> String {
    let (base, _) = split_fragment(base_url);
    let base = base.split('?').next().unwrap_or(base);
    format!("{}/{index_file}", base.trim_end_matches('/'))
}

/// Turns the raw `index.json` array into milestones numbered `1..=N`.
///
/// Only entries with a step number or a conclusion marker are kept. They are
/// ordered by step, conclusions last; the declared step numbers only decide
/// the order and never leak into the ordinals.
pub fn parse_index(
    json: &str,
    index_url: &str,
    docs_host: &Url,
) -> Result<Vec<Milestone>, IndexError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|err| IndexError::Parse {
            url: index_url.to_owned(),
            message: err.to_string(),
        })?;
    let serde_json::Value::Array(items) = value else {
        return Err(IndexError::Parse {
            url: index_url.to_owned(),
            message: "expected a JSON array of pages".to_owned(),
        });
    };

    let mut entries = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<IndexEntry>(item) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                tracing::debug!(index_url, position, %err, "skipping malformed index entry");
            }
        }
    }

    entries.retain(|e| e.params.step.is_some() || e.params.is_conclusion());
    entries.sort_by(compare_entries);

    if entries.is_empty() {
        return Err(IndexError::Empty {
            url: index_url.to_owned(),
        });
    }

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| to_milestone(i as u32 + 1, entry, docs_host))
        .collect())
}

fn compare_entries(a: &IndexEntry, b: &IndexEntry) -> Ordering {
    let step = |e: &IndexEntry| e.params.step.unwrap_or(f64::INFINITY);
    a.params
        .is_conclusion()
        .cmp(&b.params.is_conclusion())
        .then_with(|| step(a).total_cmp(&step(b)))
}

fn to_milestone(ordinal: u32, entry: IndexEntry, docs_host: &Url) -> Milestone {
    let params = entry.params;
    let title = [params.menutitle.as_deref(), params.title.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Step {ordinal}"));

    let estimated_duration = params
        .duration
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_ESTIMATED_DURATION)
        .to_owned();

    let conclusion_image = params
        .cta
        .and_then(|cta| cta.image)
        .filter(|image| !image.src.trim().is_empty())
        .map(|image| ImageRef {
            src: absolutize(&image.src, docs_host),
            width: image.width.and_then(to_dimension),
            height: image.height.and_then(to_dimension),
        });

    Milestone {
        ordinal,
        title,
        estimated_duration,
        url: absolutize(&entry.permalink, docs_host),
        is_active: false,
        side_journeys: params
            .side_journeys
            .and_then(|g| to_link_group(g, DEFAULT_SIDE_JOURNEYS_HEADING, docs_host)),
        related_journeys: params
            .related_journeys
            .and_then(|g| to_link_group(g, DEFAULT_RELATED_JOURNEYS_HEADING, docs_host)),
        conclusion_image,
    }
}

fn to_link_group(group: IndexLinkGroup, default_heading: &str, docs_host: &Url) -> Option<LinkGroup> {
    let items = group
        .items
        .into_iter()
        .filter(|item| !item.link.trim().is_empty())
        .map(|item| {
            let url = absolutize(&item.link, docs_host);
            let title = item
                .title
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| url.clone());
            LinkItem { url, title }
        })
        .collect::<Vec<_>>();
    if items.is_empty() {
        return None;
    }

    let heading = group
        .heading
        .map(|h| h.trim().to_owned())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| default_heading.to_owned());
    Some(LinkGroup { heading, items })
}

fn to_dimension(value: f64) -> Option<u32> {
    (value >= 1.0 && value <= f64::from(u32::MAX)).then(|| value.round() as u32)
}
