//! Raw page markup to an embeddable [`StructuredDocument`].
//!
//! The pipeline is parse, then independent passes over the typed tree:
//! resource rewriting, link classification, structural normalization and
//! affordance synthesis. Each pass can be exercised on a hand-built tree.

pub mod affordances;
pub mod node;
pub mod parse;
pub mod passes;
mod render;

use url::Url;

use crate::config::JourneyConfig;
use crate::formats::Milestone;

pub use affordances::{AffordanceContext, START_JOURNEY_LABEL, append_affordances};
pub use node::{LinkKind, Node, StructuredDocument};
pub use parse::parse_document;
pub use passes::{
    LinkClassifier, UrlContext, classify_links, normalize_structure, rewrite_resources,
};

/// Paragraphs must be longer than this to count toward a cover-page summary.
pub const SUMMARY_MIN_PARAGRAPH_CHARS: usize = 20;
pub const SUMMARY_MAX_PARAGRAPHS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Canonical document URL of the requested page; relative references
    /// resolve against it.
    pub page_url: Option<&'a Url>,
    pub is_cover_page: bool,
    pub current_ordinal: u32,
    pub milestones: &'a [Milestone],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub body: StructuredDocument,
    pub summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Transformer {
    docs_host: Url,
    content_path_prefix: String,
}

impl Transformer {
    pub fn new(config: &JourneyConfig) -> Self {
        Self {
            docs_host: config.docs_host.clone(),
            content_path_prefix: crate::config::normalize_prefix(&config.content_path_prefix),
        }
    }

    pub fn transform(&self, raw: &str, ctx: TransformContext<'_>) -> Transformed {
        let urls = UrlContext {
            docs_host: self.docs_host.clone(),
            page_url: ctx.page_url.cloned(),
        };
        let classifier = LinkClassifier::new(urls.clone(), &self.content_path_prefix);

        let mut nodes = parse_document(raw);
        rewrite_resources(&mut nodes, &urls);
        classify_links(&mut nodes, &classifier);
        let mut nodes = normalize_structure(nodes);

        let summary = if ctx.is_cover_page {
            extract_summary(&nodes)
        } else {
            None
        };

        append_affordances(
            &mut nodes,
            AffordanceContext {
                is_cover_page: ctx.is_cover_page,
                current_ordinal: ctx.current_ordinal,
                milestones: ctx.milestones,
            },
            &classifier,
        );

        tracing::debug!(
            nodes = nodes.len(),
            cover = ctx.is_cover_page,
            ordinal = ctx.current_ordinal,
            "transformed document"
        );
        Transformed {
            body: StructuredDocument::new(nodes),
            summary,
        }
    }
}

/// First few substantial paragraphs, whitespace-collapsed and joined.
pub fn extract_summary(nodes: &[Node]) -> Option<String> {
    let mut paragraphs = Vec::new();
    node::visit(nodes, &mut |n| {
        if paragraphs.len() < SUMMARY_MAX_PARAGRAPHS
            && let Node::Paragraph(children) = n
        {
            let text = node::collapse_whitespace(&node::text_of(children));
            if text.chars().count() > SUMMARY_MIN_PARAGRAPH_CHARS {
                paragraphs.push(text);
            }
        }
    });
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join(" "))
    }
}
