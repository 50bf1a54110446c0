use serde::Serialize;

use crate::formats::ImageRef;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredDocument {
    pub nodes: Vec<Node>,
}

impl StructuredDocument {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn first_heading_text(&self) -> Option<String> {
        let mut found = None;
        visit(&self.nodes, &mut |node| {
            if found.is_none()
                && let Node::Heading(heading) = node
            {
                let text = collapse_whitespace(&text_of(&heading.children));
                if !text.is_empty() {
                    found = Some(text);
                }
            }
        });
        found
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
    Text(String),
    Heading(Heading),
    Paragraph(Vec<Node>),
    List(List),
    Image(Image),
    Frame(Frame),
    Link(Link),
    InlineCode(String),
    CodeBlock(CodeBlock),
    Table(Table),
    Collapsible(Collapsible),
    /// Any other element, kept with its tag so it can be rendered back.
    Element(Element),
    StartJourney(StartJourney),
    ConclusionImage(ImageRef),
    Pagination(Pagination),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub id: Option<String>,
    pub class: Option<String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<Vec<Node>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    pub src: Option<String>,
    /// Real source of a lazily loaded image (`data-src`).
    pub lazy_src: Option<String>,
    pub lazy_loading: bool,
    pub alt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub src: Option<String>,
    pub lazy_src: Option<String>,
    pub lazy_loading: bool,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    #[default]
    Unclassified,
    /// Under the documentation content path; the host reroutes these.
    Internal,
    External,
    /// Fragment-only link into the same page.
    Anchor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub href: String,
    pub kind: LinkKind,
    pub open_in_new_context: bool,
    pub children: Vec<Node>,
}

impl Link {
    pub fn new(href: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            href: href.into(),
            kind: LinkKind::Unclassified,
            open_in_new_context: false,
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
    /// Wrapped in a horizontally scrolling container when rendered.
    pub scroll_wrapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub header: bool,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collapsible {
    pub trigger: Vec<Node>,
    pub content: Vec<Node>,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartJourney {
    pub label: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: u32,
    pub total: usize,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    pub fn previous_enabled(&self) -> bool {
        self.previous_url.is_some()
    }

    pub fn next_enabled(&self) -> bool {
        self.next_url.is_some()
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn child_lists(&self) -> Vec<&Vec<Node>> {
        match self {
            Node::Heading(h) => vec![&h.children],
            Node::Paragraph(children) => vec![children],
            Node::List(list) => list.items.iter().collect(),
            Node::Link(link) => vec![&link.children],
            Node::Table(table) => table
                .rows
                .iter()
                .flat_map(|row| row.cells.iter().map(|cell| &cell.children))
                .collect(),
            Node::Collapsible(c) => vec![&c.trigger, &c.content],
            Node::Element(e) => vec![&e.children],
            Node::Text(_)
            | Node::Image(_)
            | Node::Frame(_)
            | Node::InlineCode(_)
            | Node::CodeBlock(_)
            | Node::StartJourney(_)
            | Node::ConclusionImage(_)
            | Node::Pagination(_) => Vec::new(),
        }
    }

    pub fn child_lists_mut(&mut self) -> Vec<&mut Vec<Node>> {
        match self {
            Node::Heading(h) => vec![&mut h.children],
            Node::Paragraph(children) => vec![children],
            Node::List(list) => list.items.iter_mut().collect(),
            Node::Link(link) => vec![&mut link.children],
            Node::Table(table) => table
                .rows
                .iter_mut()
                .flat_map(|row| row.cells.iter_mut().map(|cell| &mut cell.children))
                .collect(),
            Node::Collapsible(c) => vec![&mut c.trigger, &mut c.content],
            Node::Element(e) => vec![&mut e.children],
            Node::Text(_)
            | Node::Image(_)
            | Node::Frame(_)
            | Node::InlineCode(_)
            | Node::CodeBlock(_)
            | Node::StartJourney(_)
            | Node::ConclusionImage(_)
            | Node::Pagination(_) => Vec::new(),
        }
    }
}

/// Pre-order traversal.
pub fn visit<'a>(nodes: &'a [Node], f: &mut dyn FnMut(&'a Node)) {
    for node in nodes {
        f(node);
        for children in node.child_lists() {
            visit(children, f);
        }
    }
}

/// Pre-order traversal with mutable access.
pub fn visit_mut(nodes: &mut [Node], f: &mut dyn FnMut(&mut Node)) {
    for node in nodes {
        f(node);
        for children in node.child_lists_mut() {
            visit_mut(children, f);
        }
    }
}

/// Concatenated text of a subtree, code included.
pub fn text_of(nodes: &[Node]) -> String {
    let mut out = String::new();
    visit(nodes, &mut |node| match node {
        Node::Text(text) | Node::InlineCode(text) => out.push_str(text),
        Node::CodeBlock(block) => out.push_str(&block.code),
        _ => {}
    });
    out
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
