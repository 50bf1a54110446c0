use scraper::{ElementRef, Html};

use super::node::{
    CodeBlock, Element, Frame, Heading, Image, Link, List, Node, Table, TableCell, TableRow,
};

const LAZY_CLASSES: [&str; 2] = ["lazyload", "lazy"];

/// Parses raw page markup into a node tree of the page body.
pub fn parse_document(raw: &str) -> Vec<Node> {
    let html = Html::parse_document(raw);
    let root = html.root_element();
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body");

    match body {
        Some(body) => convert_children(body),
        None => convert_children(root),
    }
}

fn convert_children(element: ElementRef<'_>) -> Vec<Node> {
    let mut out = Vec::new();
    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                let text: &str = text;
                if text.trim().is_empty() && text.contains('\n') {
                    continue;
                }
                out.push(Node::text(text));
            }
            scraper::Node::Element(_) => {
                if let Some(node) = ElementRef::wrap(child).and_then(convert_element) {
                    out.push(node);
                }
            }
            _ => {}
        }
    }
    out
}

fn convert_element(element: ElementRef<'_>) -> Option<Node> {
    let value = element.value();
    let name = value.name();
    let attr = |key: &str| {
        value
            .attr(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };
    let lazy_class = value.classes().any(|c| LAZY_CLASSES.contains(&c));

    let node = match name {
        "script" | "style" | "noscript" | "template" => return None,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Node::Heading(Heading {
            level: name[1..].parse().unwrap_or(1),
            id: attr("id"),
            class: None,
            children: convert_children(element),
        }),
        "p" => Node::Paragraph(convert_children(element)),
        "ul" | "ol" => Node::List(List {
            ordered: name == "ol",
            items: list_items(element),
        }),
        "img" => Node::Image(Image {
            src: attr("src"),
            lazy_src: attr("data-src").or_else(|| attr("data-lazy-src")),
            lazy_loading: lazy_class || attr("loading").as_deref() == Some("lazy"),
            alt: value.attr("alt").map(str::to_owned),
            width: attr("width"),
            height: attr("height"),
        }),
        "iframe" => Node::Frame(Frame {
            src: attr("src"),
            lazy_src: attr("data-src"),
            lazy_loading: lazy_class || attr("loading").as_deref() == Some("lazy"),
            title: attr("title"),
        }),
        "a" => match value.attr("href") {
            Some(href) => Node::Link(Link::new(href.trim(), convert_children(element))),
            None => generic(element),
        },
        "pre" => Node::CodeBlock(CodeBlock {
            language: code_language(element),
            code: element.text().collect(),
        }),
        "code" => Node::InlineCode(element.text().collect()),
        "table" => Node::Table(Table {
            rows: table_rows(element),
            scroll_wrapped: false,
        }),
        _ => generic(element),
    };
    Some(node)
}

fn generic(element: ElementRef<'_>) -> Node {
    let value = element.value();
    Node::Element(Element {
        tag: value.name().to_owned(),
        id: value.attr("id").map(str::to_owned),
        classes: value.classes().map(str::to_owned).collect(),
        children: convert_children(element),
    })
}

fn list_items(list: ElementRef<'_>) -> Vec<Vec<Node>> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|child| {
            if child.value().name() == "li" {
                Some(convert_children(child))
            } else {
                convert_element(child).map(|node| vec![node])
            }
        })
        .collect()
}

fn table_rows(table: ElementRef<'_>) -> Vec<TableRow> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" | "tbody" | "tfoot" => {
                for row in child.children().filter_map(ElementRef::wrap) {
                    if row.value().name() == "tr" {
                        rows.push(table_row(row));
                    }
                }
            }
            "tr" => rows.push(table_row(child)),
            _ => {}
        }
    }
    rows
}

fn table_row(row: ElementRef<'_>) -> TableRow {
    TableRow {
        cells: row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "td" | "th"))
            .map(|cell| TableCell {
                header: cell.value().name() == "th",
                children: convert_children(cell),
            })
            .collect(),
    }
}

/// `language-xxx` class on the `<pre>` or its `<code>` child.
fn code_language(pre: ElementRef<'_>) -> Option<String> {
    let from = |e: ElementRef<'_>| {
        e.value()
            .classes()
            .find_map(|c| c.strip_prefix("language-"))
            .map(str::to_owned)
    };
    from(pre).or_else(|| {
        pre.children()
            .filter_map(ElementRef::wrap)
            .find(|c| c.value().name() == "code")
            .and_then(from)
    })
}
