use super::node::{LinkKind, Node, StructuredDocument};

impl StructuredDocument {
    /// Markup for hosts that embed the page as HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        render_nodes(&mut out, &self.nodes);
        out
    }
}

fn render_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        render_node(out, node);
    }
}

fn render_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Heading(h) => {
            out.push_str(&format!("<h{}", h.level));
            push_attr(out, "id", h.id.as_deref());
            push_attr(out, "class", h.class.as_deref());
            out.push('>');
            render_nodes(out, &h.children);
            out.push_str(&format!("</h{}>", h.level));
        }
        Node::Paragraph(children) => wrap(out, "<p>", children, "</p>"),
        Node::List(list) => {
            let tag = if list.ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>"));
            for item in &list.items {
                wrap(out, "<li>", item, "</li>");
            }
            out.push_str(&format!("</{tag}>"));
        }
        Node::Image(image) => {
            out.push_str("<img");
            push_attr(out, "src", image.src.as_deref());
            push_attr(out, "data-src", image.lazy_src.as_deref());
            if image.lazy_loading {
                push_attr(out, "loading", Some("lazy"));
            }
            push_attr(out, "alt", image.alt.as_deref());
            push_attr(out, "width", image.width.as_deref());
            push_attr(out, "height", image.height.as_deref());
            out.push('>');
        }
        Node::Frame(frame) => {
            out.push_str("<iframe");
            push_attr(out, "src", frame.src.as_deref());
            push_attr(out, "data-src", frame.lazy_src.as_deref());
            if frame.lazy_loading {
                push_attr(out, "loading", Some("lazy"));
            }
            push_attr(out, "title", frame.title.as_deref());
            out.push_str("></iframe>");
        }
        Node::Link(link) => {
            out.push_str("<a");
            push_attr(out, "href", Some(&link.href));
            let kind = match link.kind {
                LinkKind::Unclassified => None,
                LinkKind::Internal => Some("internal"),
                LinkKind::External => Some("external"),
                LinkKind::Anchor => Some("anchor"),
            };
            push_attr(out, "data-journey-link", kind);
            if link.open_in_new_context {
                push_attr(out, "target", Some("_blank"));
                push_attr(out, "rel", Some("noopener noreferrer"));
            }
            out.push('>');
            render_nodes(out, &link.children);
            out.push_str("</a>");
        }
        Node::InlineCode(code) => {
            out.push_str(&format!("<code>{}</code>", escape_text(code)));
        }
        Node::CodeBlock(block) => {
            out.push_str("<pre><code");
            let class = block.language.as_ref().map(|l| format!("language-{l}"));
            push_attr(out, "class", class.as_deref());
            out.push_str(&format!(">{}</code></pre>", escape_text(&block.code)));
        }
        Node::Table(table) => {
            if table.scroll_wrapped {
                out.push_str(r#"<div class="journey-table-wrapper">"#);
            }
            out.push_str("<table>");
            for row in &table.rows {
                out.push_str("<tr>");
                for cell in &row.cells {
                    let tag = if cell.header { "th" } else { "td" };
                    out.push_str(&format!("<{tag}>"));
                    render_nodes(out, &cell.children);
                    out.push_str(&format!("</{tag}>"));
                }
                out.push_str("</tr>");
            }
            out.push_str("</table>");
            if table.scroll_wrapped {
                out.push_str("</div>");
            }
        }
        Node::Collapsible(c) => {
            let state = if c.collapsed { "false" } else { "true" };
            out.push_str(&format!(
                r#"<div class="journey-collapse"><button class="journey-collapse-trigger" aria-expanded="{state}">"#
            ));
            render_nodes(out, &c.trigger);
            out.push_str(r#"</button><div class="journey-collapse-content""#);
            if c.collapsed {
                out.push_str(" hidden");
            }
            out.push('>');
            render_nodes(out, &c.content);
            out.push_str("</div></div>");
        }
        Node::Element(e) => {
            out.push_str(&format!("<{}", e.tag));
            push_attr(out, "id", e.id.as_deref());
            if !e.classes.is_empty() {
                push_attr(out, "class", Some(&e.classes.join(" ")));
            }
            out.push('>');
            if !is_void(&e.tag) {
                render_nodes(out, &e.children);
                out.push_str(&format!("</{}>", e.tag));
            }
        }
        Node::StartJourney(start) => {
            out.push_str(r#"<div class="journey-start"><button class="journey-start-button""#);
            push_attr(out, "data-journey-url", start.url.as_deref());
            if start.url.is_none() {
                out.push_str(" disabled");
            }
            out.push_str(&format!(">{}</button></div>", escape_text(&start.label)));
        }
        Node::ConclusionImage(image) => {
            out.push_str(r#"<div class="journey-conclusion-image"><img"#);
            push_attr(out, "src", Some(&image.src));
            let width = image.width.map(|w| w.to_string());
            let height = image.height.map(|h| h.to_string());
            push_attr(out, "width", width.as_deref());
            push_attr(out, "height", height.as_deref());
            out.push_str("></div>");
        }
        Node::Pagination(p) => {
            out.push_str(r#"<nav class="journey-pagination">"#);
            push_nav_button(out, "previous", "Previous", p.previous_url.as_deref());
            out.push_str(&format!(
                r#"<span class="journey-pagination-position">{} of {}</span>"#,
                p.current, p.total
            ));
            push_nav_button(out, "next", "Next", p.next_url.as_deref());
            out.push_str("</nav>");
        }
    }
}

fn push_nav_button(out: &mut String, direction: &str, label: &str, url: Option<&str>) {
    out.push_str(&format!(r#"<button class="journey-pagination-{direction}""#));
    push_attr(out, "data-journey-url", url);
    if url.is_none() {
        out.push_str(" disabled");
    }
    out.push_str(&format!(">{label}</button>"));
}

fn wrap(out: &mut String, open: &str, children: &[Node], close: &str) {
    out.push_str(open);
    render_nodes(out, children);
    out.push_str(close);
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!(r#" {name}="{}""#, escape_attr(value)));
    }
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "br" | "hr" | "wbr" | "input" | "source" | "track" | "col" | "area" | "embed"
    )
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
