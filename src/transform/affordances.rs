use super::node::{Collapsible, Link, List, Node, Pagination, StartJourney};
use super::passes::LinkClassifier;
use crate::formats::{LinkGroup, Milestone};
use crate::navigate::{next_url, previous_url};

pub const START_JOURNEY_LABEL: &str = "Start journey";

#[derive(Debug, Clone, Copy)]
pub struct AffordanceContext<'a> {
    pub is_cover_page: bool,
    pub current_ordinal: u32,
    pub milestones: &'a [Milestone],
}

/// Appends the journey controls a page needs: a start button on the cover
/// page; conclusion banner, link sections and pagination on milestone pages.
pub fn append_affordances(
    nodes: &mut Vec<Node>,
    ctx: AffordanceContext<'_>,
    classifier: &LinkClassifier,
) {
    if ctx.is_cover_page {
        nodes.push(Node::StartJourney(StartJourney {
            label: START_JOURNEY_LABEL.to_owned(),
            url: next_url(0, ctx.milestones).map(str::to_owned),
        }));
        return;
    }

    let active = ctx
        .milestones
        .iter()
        .find(|m| m.ordinal == ctx.current_ordinal);

    if let Some(active) = active {
        if let Some(image) = &active.conclusion_image {
            nodes.push(Node::ConclusionImage(image.clone()));
        }
        if let Some(group) = &active.side_journeys {
            nodes.push(link_section(group, classifier));
        }
        if let Some(group) = &active.related_journeys {
            nodes.push(link_section(group, classifier));
        }
    }

    nodes.push(Node::Pagination(Pagination {
        current: ctx.current_ordinal,
        total: ctx.milestones.len(),
        previous_url: previous_url(ctx.current_ordinal, ctx.milestones).map(str::to_owned),
        next_url: next_url(ctx.current_ordinal, ctx.milestones).map(str::to_owned),
    }));
}

fn link_section(group: &LinkGroup, classifier: &LinkClassifier) -> Node {
    let items = group
        .items
        .iter()
        .map(|item| {
            let mut link = Link::new(&item.url, vec![Node::text(&item.title)]);
            classifier.classify(&mut link);
            vec![Node::Link(link)]
        })
        .collect();

    Node::Collapsible(Collapsible {
        trigger: vec![Node::text(&group.heading)],
        content: vec![Node::List(List {
            ordered: false,
            items,
        })],
        collapsed: true,
    })
}
