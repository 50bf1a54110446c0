use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::transform::StructuredDocument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGroup {
    pub heading: String,
    pub items: Vec<LinkItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// 1-based position within the journey.
    pub ordinal: u32,
    pub title: String,
    pub estimated_duration: String,
    pub url: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_journeys: Option<LinkGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_journeys: Option<LinkGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion_image: Option<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyContent {
    pub title: String,
    pub body: StructuredDocument,
    pub source_url: String,
    /// 0 is the cover page.
    pub current_ordinal: u32,
    pub total_milestones: usize,
    pub milestones: Vec<Milestone>,
    pub fetched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_fragment: Option<String>,
}

impl JourneyContent {
    pub fn is_cover_page(&self) -> bool {
        self.current_ordinal == 0
    }

    pub fn active_milestone(&self) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.is_active)
    }
}

/// One page descriptor from a journey's `index.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    pub permalink: String,
    #[serde(default)]
    pub params: IndexParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexParams {
    #[serde(default, deserialize_with = "lenient_number")]
    pub step: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub menutitle: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub cta: Option<IndexCta>,
    #[serde(default)]
    pub side_journeys: Option<IndexLinkGroup>,
    #[serde(default)]
    pub related_journeys: Option<IndexLinkGroup>,
}

impl IndexParams {
    pub fn is_conclusion(&self) -> bool {
        self.cta
            .as_ref()
            .and_then(|cta| cta.kind.as_deref())
            .is_some_and(|kind| kind.eq_ignore_ascii_case("conclusion"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexCta {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub image: Option<IndexImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexImage {
    pub src: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexLinkGroup {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub items: Vec<IndexLinkItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexLinkItem {
    pub link: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Accepts a JSON number or a numeric string; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}
