//! Independent rewriting passes over a parsed node tree.

use url::Url;

use super::node::{CodeBlock, Collapsible, Element, Link, LinkKind, Node, visit_mut};
use crate::resolve::absolutize;

/// Inline code at least this long, standing alone in its block, becomes a
/// code block.
pub const LONG_CODE_SPAN_CHARS: usize = 60;

const COLLAPSE_CLASS: &str = "collapse";
const COLLAPSE_TRIGGER_CLASS: &str = "collapse-trigger";
const COLLAPSE_CONTENT_CLASS: &str = "collapse-content";

/// Resolves references the way the documentation host does: root-relative and
/// scheme-relative against the host, document-relative against the page.
#[derive(Debug, Clone)]
pub struct UrlContext {
    pub docs_host: Url,
    pub page_url: Option<Url>,
}

impl UrlContext {
    pub fn absolutize(&self, reference: &str) -> String {
        let reference = reference.trim();
        let base = match &self.page_url {
            Some(page) if !reference.starts_with('/') => page,
            _ => &self.docs_host,
        };
        absolutize(reference, base)
    }
}

pub fn rewrite_resources(nodes: &mut [Node], urls: &UrlContext) {
    visit_mut(nodes, &mut |node| match node {
        Node::Image(image) => {
            resolve_source(&mut image.src, &mut image.lazy_src, &mut image.lazy_loading, urls)
        }
        Node::Frame(frame) => {
            resolve_source(&mut frame.src, &mut frame.lazy_src, &mut frame.lazy_loading, urls)
        }
        _ => {}
    });
}

fn resolve_source(
    src: &mut Option<String>,
    lazy_src: &mut Option<String>,
    lazy_loading: &mut bool,
    urls: &UrlContext,
) {
    if let Some(real) = lazy_src.take() {
        *src = Some(urls.absolutize(&real));
    } else if let Some(current) = src.as_deref() {
        *src = Some(urls.absolutize(current));
    }
    if src.is_some() {
        *lazy_loading = false;
    }
}

#[derive(Debug, Clone)]
pub struct LinkClassifier {
    urls: UrlContext,
    content_path_prefix: String,
}

impl LinkClassifier {
    pub fn new(urls: UrlContext, content_path_prefix: &str) -> Self {
        Self {
            urls,
            content_path_prefix: content_path_prefix.to_owned(),
        }
    }

    pub fn classify(&self, link: &mut Link) {
        let href = link.href.trim();
        if href.is_empty() {
            return;
        }
        if href.starts_with('#') {
            link.kind = LinkKind::Anchor;
            link.open_in_new_context = false;
            return;
        }

        let resolved = self.urls.absolutize(href);
        let internal = Url::parse(&resolved).is_ok_and(|target| self.is_internal(&target));
        link.href = resolved;
        if internal {
            link.kind = LinkKind::Internal;
            link.open_in_new_context = false;
        } else {
            link.kind = LinkKind::External;
            link.open_in_new_context = true;
        }
    }

    fn is_internal(&self, target: &Url) -> bool {
        let host = &self.urls.docs_host;
        target.host_str() == host.host_str()
            && target.port_or_known_default() == host.port_or_known_default()
            && target.path().starts_with(&self.content_path_prefix)
    }
}

pub fn classify_links(nodes: &mut [Node], classifier: &LinkClassifier) {
    visit_mut(nodes, &mut |node| {
        if let Node::Link(link) = node {
            classifier.classify(link);
        }
    });
}

/// Heading tags, code promotion, scrolling tables and collapsible sections.
pub fn normalize_structure(nodes: Vec<Node>) -> Vec<Node> {
    promote_standalone_code(nodes.into_iter().map(normalize_node).collect())
}

fn normalize_node(node: Node) -> Node {
    match node {
        Node::Heading(mut heading) => {
            heading.level = heading.level.clamp(1, 6);
            heading.class = Some(format!(
                "journey-heading journey-heading-h{}",
                heading.level
            ));
            heading.children = heading.children.into_iter().map(normalize_node).collect();
            Node::Heading(heading)
        }
        Node::Paragraph(children) => {
            let children = children.into_iter().map(normalize_node).collect::<Vec<_>>();
            match standalone_long_code(&children) {
                Some(code) => Node::CodeBlock(CodeBlock {
                    language: None,
                    code: code.to_owned(),
                }),
                None => Node::Paragraph(children),
            }
        }
        Node::Table(mut table) => {
            table.scroll_wrapped = true;
            for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
                cell.children = normalize_structure(std::mem::take(&mut cell.children));
            }
            Node::Table(table)
        }
        Node::Element(element) if is_collapsible(&element) => {
            Node::Collapsible(into_collapsible(element))
        }
        Node::Element(mut element) => {
            element.children = normalize_structure(element.children);
            Node::Element(element)
        }
        Node::List(mut list) => {
            list.items = list.items.into_iter().map(normalize_structure).collect();
            Node::List(list)
        }
        Node::Collapsible(mut c) => {
            c.trigger = c.trigger.into_iter().map(normalize_node).collect();
            c.content = normalize_structure(c.content);
            Node::Collapsible(c)
        }
        Node::Link(mut link) => {
            link.children = link.children.into_iter().map(normalize_node).collect();
            Node::Link(link)
        }
        other => other,
    }
}

/// A block whose only content is one long inline code span becomes that code.
fn promote_standalone_code(nodes: Vec<Node>) -> Vec<Node> {
    match standalone_long_code(&nodes) {
        Some(code) => vec![Node::CodeBlock(CodeBlock {
            language: None,
            code: code.to_owned(),
        })],
        None => nodes,
    }
}

fn standalone_long_code(children: &[Node]) -> Option<&str> {
    let mut meaningful = children.iter().filter(|n| match n {
        Node::Text(text) => !text.trim().is_empty(),
        _ => true,
    });
    let only = meaningful.next()?;
    if meaningful.next().is_some() {
        return None;
    }
    match only {
        Node::InlineCode(code)
            if code.contains('\n') || code.chars().count() >= LONG_CODE_SPAN_CHARS =>
        {
            Some(code)
        }
        _ => None,
    }
}

fn is_collapsible(element: &Element) -> bool {
    element.tag == "details" || element.has_class(COLLAPSE_CLASS)
}

fn into_collapsible(element: Element) -> Collapsible {
    let mut trigger = None;
    let mut content = None;
    let mut rest = Vec::new();

    for child in element.children {
        match child {
            Node::Element(e)
                if trigger.is_none()
                    && (e.has_class(COLLAPSE_TRIGGER_CLASS)
                        || e.tag == "summary"
                        || e.tag == "button") =>
            {
                trigger = Some(e.children);
            }
            Node::Element(e) if content.is_none() && e.has_class(COLLAPSE_CONTENT_CLASS) => {
                content = Some(e.children);
            }
            Node::Text(text) if text.trim().is_empty() => {}
            other => rest.push(other),
        }
    }

    let content = match content {
        Some(mut content) => {
            content.extend(rest);
            content
        }
        None => rest,
    };

    Collapsible {
        trigger: trigger
            .unwrap_or_default()
            .into_iter()
            .map(normalize_node)
            .collect(),
        content: normalize_structure(content),
        collapsed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::node::{Frame, Heading, Image, Table, TableCell, TableRow};
    use crate::transform::parse::parse_document;

    fn urls() -> UrlContext {
        UrlContext {
            docs_host: Url::parse("https://grafana.com/").unwrap(),
            page_url: Some(
                Url::parse("https://grafana.com/docs/learning-journeys/logs/step-1/").unwrap(),
            ),
        }
    }

    fn classifier() -> LinkClassifier {
        LinkClassifier::new(urls(), "/docs/")
    }

    fn link(href: &str) -> Link {
        Link::new(href, vec![Node::text("x")])
    }

    #[test]
    fn lazy_images_get_real_absolute_source() {
        let mut nodes = vec![Node::Image(Image {
            src: Some("data:image/gif;base64,R0lGOD".to_owned()),
            lazy_src: Some("/media/docs/a.png".to_owned()),
            lazy_loading: true,
            ..Image::default()
        })];
        rewrite_resources(&mut nodes, &urls());

        let Node::Image(image) = &nodes[0] else {
            panic!("expected image");
        };
        assert_eq!(image.src.as_deref(), Some("https://grafana.com/media/docs/a.png"));
        assert_eq!(image.lazy_src, None);
        assert!(!image.lazy_loading);
    }

    #[test]
    fn relative_sources_resolve_against_page_and_host() {
        let mut nodes = vec![Node::Paragraph(vec![
            Node::Image(Image {
                src: Some("img/chart.svg".to_owned()),
                ..Image::default()
            }),
            Node::Frame(Frame {
                src: Some("//www.youtube.com/embed/abc".to_owned()),
                ..Frame::default()
            }),
        ])];
        rewrite_resources(&mut nodes, &urls());

        let Node::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert!(matches!(&children[0], Node::Image(i)
            if i.src.as_deref() == Some("https://grafana.com/docs/learning-journeys/logs/step-1/img/chart.svg")));
        assert!(matches!(&children[1], Node::Frame(f)
            if f.src.as_deref() == Some("https://www.youtube.com/embed/abc")));
    }

    #[test]
    fn docs_links_are_internal() {
        let mut l = link("/docs/grafana/latest/explore/");
        classifier().classify(&mut l);
        assert_eq!(l.kind, LinkKind::Internal);
        assert!(!l.open_in_new_context);
        assert_eq!(l.href, "https://grafana.com/docs/grafana/latest/explore/");
    }

    #[test]
    fn other_links_are_external_and_open_elsewhere() {
        for href in [
            "https://github.com/grafana/loki",
            "/blog/2024/01/01/post/",
            "mailto:team@example.com",
        ] {
            let mut l = link(href);
            classifier().classify(&mut l);
            assert_eq!(l.kind, LinkKind::External, "{href}");
            assert!(l.open_in_new_context, "{href}");
        }
    }

    #[test]
    fn fragment_links_stay_in_page() {
        let mut l = link("#configure");
        classifier().classify(&mut l);
        assert_eq!(l.kind, LinkKind::Anchor);
        assert_eq!(l.href, "#configure");
    }

    #[test]
    fn classify_links_reaches_nested_links() {
        let mut nodes = parse_document(r#"<ul><li><p><a href="/docs/x/">x</a></p></li></ul>"#);
        classify_links(&mut nodes, &classifier());
        let mut kinds = Vec::new();
        crate::transform::node::visit(&nodes, &mut |n| {
            if let Node::Link(l) = n {
                kinds.push(l.kind);
            }
        });
        assert_eq!(kinds, vec![LinkKind::Internal]);
    }

    #[test]
    fn headings_are_tagged_with_level() {
        let nodes = normalize_structure(vec![Node::Heading(Heading {
            level: 3,
            id: None,
            class: None,
            children: vec![Node::text("Query")],
        })]);
        let Node::Heading(h) = &nodes[0] else {
            panic!("expected heading");
        };
        assert_eq!(h.class.as_deref(), Some("journey-heading journey-heading-h3"));
    }

    #[test]
    fn long_standalone_code_span_becomes_block() {
        let long = "sum by (job) (rate(http_requests_total{status=~\"5..\"}[5m])) > 0 or vector(0)";
        let nodes = normalize_structure(vec![
            Node::Paragraph(vec![Node::text("  "), Node::InlineCode(long.to_owned())]),
            Node::Paragraph(vec![
                Node::text("Run "),
                Node::InlineCode(long.to_owned()),
            ]),
            Node::Paragraph(vec![Node::InlineCode("short".to_owned())]),
        ]);
        assert!(matches!(&nodes[0], Node::CodeBlock(b) if b.code == long));
        assert!(matches!(&nodes[1], Node::Paragraph(_)));
        assert!(matches!(&nodes[2], Node::Paragraph(_)));
    }

    #[test]
    fn tables_are_scroll_wrapped() {
        let nodes = normalize_structure(vec![Node::Table(Table {
            rows: vec![TableRow {
                cells: vec![TableCell {
                    header: false,
                    children: vec![Node::text("a")],
                }],
            }],
            scroll_wrapped: false,
        })]);
        assert!(matches!(&nodes[0], Node::Table(t) if t.scroll_wrapped));
    }

    #[test]
    fn host_collapse_markup_becomes_collapsed_section() {
        let nodes = normalize_structure(parse_document(
            r#"<div class="collapse">
  <button class="collapse-trigger" aria-expanded="true"><h4>Details</h4></button>
  <div class="collapse-content"><p>Hidden body</p></div>
</div>"#,
        ));

        let Node::Collapsible(c) = &nodes[0] else {
            panic!("expected collapsible, got {:?}", nodes[0]);
        };
        assert!(c.collapsed);
        assert!(matches!(&c.trigger[0], Node::Heading(h) if h.class.is_some()));
        assert_eq!(c.content, vec![Node::Paragraph(vec![Node::text("Hidden body")])]);
    }

    #[test]
    fn details_element_becomes_collapsed_section() {
        let nodes = normalize_structure(parse_document(
            "<details open><summary>More</summary><p>Body</p></details>",
        ));
        let Node::Collapsible(c) = &nodes[0] else {
            panic!("expected collapsible");
        };
        assert_eq!(c.trigger, vec![Node::text("More")]);
        assert_eq!(c.content, vec![Node::Paragraph(vec![Node::text("Body")])]);
        assert!(c.collapsed);
    }
}
