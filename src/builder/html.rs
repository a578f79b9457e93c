/*!
 * HTML writer.
 *
 * Built-in node kinds have fixed markup. Custom kinds use the visit/depart
 * pair registered with the builder; without one, only their children are
 * rendered.
 */

use crate::doctree::{Document, NodeId, NodeKind};

use super::Builder;

/// Accumulates HTML fragments while walking a document
pub struct HtmlTranslator<'a> {
    builder: &'a Builder,
    /// Emitted fragments, in order
    pub body: Vec<String>,
}

impl<'a> HtmlTranslator<'a> {
    pub fn new(builder: &'a Builder) -> Self {
        Self {
            builder,
            body: Vec::new(),
        }
    }

    pub fn translate(mut self, document: &Document) -> String {
        self.walk(document, document.root());
        self.body.concat()
    }

    fn walk(&mut self, document: &Document, id: NodeId) {
        self.visit(document, id);
        for &child in document.children(id) {
            self.walk(document, child);
        }
        self.depart(document, id);
    }

    /// Opening tag carrying the node's first id and its classes
    pub fn starttag(&self, document: &Document, id: NodeId, tag: &str) -> String {
        let attributes = document.attributes(id);
        let mut out = format!("<{tag}");
        if let Some(first) = attributes.ids.first() {
            out.push_str(&format!(" id=\"{}\"", escape_html(first)));
        }
        if !attributes.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape_html(&attributes.classes.join(" "))));
        }
        out.push('>');
        out
    }

    fn visit(&mut self, document: &Document, id: NodeId) {
        match document.kind(id) {
            NodeKind::Document => {}
            NodeKind::Section => {
                let tag = self.starttag(document, id, "section");
                self.body.push(tag);
                self.body.push("\n".to_string());
            }
            NodeKind::Title => {
                let level = heading_level(document, id);
                self.body.push(format!("<h{level}>"));
            }
            NodeKind::Paragraph => self.body.push("<p>".to_string()),
            NodeKind::Text(text) => self.body.push(escape_html(text)),
            NodeKind::Container => {
                let tag = self.starttag(document, id, "div");
                self.body.push(tag);
                self.body.push("\n".to_string());
            }
            NodeKind::LiteralBlock => self.body.push("<pre class=\"literal-block\">".to_string()),
            NodeKind::Custom(kind) => {
                if let Some((visit, _)) = self.builder.html_handlers(kind) {
                    visit(self, document, id);
                }
            }
        }
    }

    fn depart(&mut self, document: &Document, id: NodeId) {
        match document.kind(id) {
            NodeKind::Document | NodeKind::Text(_) => {}
            NodeKind::Section => self.body.push("</section>\n".to_string()),
            NodeKind::Title => {
                let level = heading_level(document, id);
                self.body.push(format!("</h{level}>\n"));
            }
            NodeKind::Paragraph => self.body.push("</p>\n".to_string()),
            NodeKind::Container => self.body.push("</div>\n".to_string()),
            NodeKind::LiteralBlock => self.body.push("</pre>\n".to_string()),
            NodeKind::Custom(kind) => {
                if let Some((_, depart)) = self.builder.html_handlers(kind) {
                    depart(self, document, id);
                }
            }
        }
    }
}

fn heading_level(document: &Document, title: NodeId) -> usize {
    let depth = document.parent(title).map_or(1, |p| document.section_depth(p));
    depth.clamp(1, 6)
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
