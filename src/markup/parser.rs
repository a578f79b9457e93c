/*!
 * Line-based block parser for a reStructuredText subset.
 *
 * Supported constructs: paragraphs, underlined section titles, literal
 * blocks introduced by `::`, block quotes, comments and directives with
 * `:option:` lines and an indented body.
 */

use log::{trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::directive::{DirectiveInvocation, DirectiveRegistry};
use crate::doctree::{Document, NodeId, NodeKind};
use crate::errors::{DirectiveError, MarkupError};

static DIRECTIVE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.\.\s+([A-Za-z0-9](?:[\w.:+-]*[A-Za-z0-9])?)::(?:\s+(.*))?$").unwrap()
});

static OPTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:([^:\s][^:]*):(?:\s+(.*))?$").unwrap());

/// Parser state shared by a top-level parse and every nested parse it triggers
pub struct ParseState<'a> {
    registry: &'a DirectiveRegistry,
    document: Document,
    /// Underline characters in first-seen order; index + 1 is the section level
    title_styles: Vec<char>,
    /// Where the nodes of each running directive will be attached
    directive_parents: Vec<NodeId>,
}

impl<'a> ParseState<'a> {
    pub fn new(registry: &'a DirectiveRegistry) -> Self {
        Self {
            registry,
            document: Document::new(),
            title_styles: Vec::new(),
            directive_parents: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn finish(self) -> Document {
        self.document
    }

    /// Parse `lines` and append the resulting nodes to `parent`.
    ///
    /// `offset` is the 0-based source index of `lines[0]`, used for line numbers.
    pub fn nested_parse(&mut self, lines: &[String], offset: usize, parent: NodeId) {
        let base_level = self.context_depth(parent);
        let mut sections: Vec<(usize, NodeId)> = vec![(base_level, parent)];
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].as_str();
            let lineno = offset + i + 1;
            let (current_level, current) = sections.last().copied().unwrap_or((base_level, parent));

            if line.trim().is_empty() {
                i += 1;
                continue;
            }

            if is_indented(line) {
                let end = indented_block_end(lines, i);
                let quote = self.document.create(NodeKind::Container);
                self.document.attributes_mut(quote).classes.push("block-quote".to_string());
                self.document.node_mut(quote).line = Some(lineno);
                self.document.append(current, quote);
                self.nested_parse(&dedent(&lines[i..end]), offset + i, quote);
                i = end;
                continue;
            }

            if let Some(caps) = DIRECTIVE_MARKER.captures(line) {
                let name = caps[1].to_string();
                let argument_text = caps.get(2).map_or("", |m| m.as_str()).to_string();
                let end = indented_block_end(lines, i + 1);
                self.run_directive(&name, &argument_text, &lines[i + 1..end], offset + i + 1, lineno, current);
                i = end;
                continue;
            }

            if is_comment(line) {
                i = indented_block_end(lines, i + 1);
                continue;
            }

            if let Some(style) = lines.get(i + 1).and_then(|u| underline_style(line, u)) {
                match self.section_level(style, base_level, current_level) {
                    Ok(level) => {
                        while sections.len() > 1 && sections.last().is_some_and(|&(l, _)| l >= level) {
                            sections.pop();
                        }
                        let container = sections.last().map_or(parent, |&(_, n)| n);
                        let section = self.add_section(line.trim(), lineno, container);
                        sections.push((level, section));
                    }
                    Err(message) => {
                        warn!("line {}: {}", lineno, message);
                        self.document.report(MarkupError::Structure { line: lineno, message });
                        self.add_paragraph(line.trim().to_string(), lineno, current);
                    }
                }
                i += 2;
                continue;
            }

            i = self.parse_paragraph(lines, i, offset, current);
        }
    }

    /// Section depth of `node`. A detached subtree built by a running
    /// directive counts the depth of the place it will be attached to.
    fn context_depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = Some(node);
        let mut attach_points = self.directive_parents.iter().rev().copied();

        while let Some(id) = current {
            if self.document.is_section(id) {
                depth += 1;
            }
            current = match self.document.parent(id) {
                Some(parent) => Some(parent),
                None if id != self.document.root() => attach_points.next(),
                None => None,
            };
        }
        depth
    }

    fn section_level(&mut self, style: char, base_level: usize, current_level: usize) -> Result<usize, String> {
        let level = match self.title_styles.iter().position(|&c| c == style) {
            Some(index) => index + 1,
            None if self.title_styles.len() == current_level => {
                self.title_styles.push(style);
                self.title_styles.len()
            }
            None => return Err(format!("Title level inconsistent (new underline style '{}')", style)),
        };

        if level <= base_level {
            return Err("Unexpected section title".to_string());
        }
        if level > current_level + 1 {
            return Err(format!("Title level inconsistent (level {} under level {})", level, current_level));
        }

        Ok(level)
    }

    fn add_section(&mut self, title: &str, lineno: usize, parent: NodeId) -> NodeId {
        let doc = &mut self.document;
        let section = doc.create(NodeKind::Section);
        doc.node_mut(section).line = Some(lineno);
        doc.set_unique_id(section, title);
        doc.attributes_mut(section)
            .names
            .push(title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase());

        let title_node = doc.create(NodeKind::Title);
        let text = doc.create_text(title);
        doc.append(title_node, text);
        doc.append(section, title_node);
        doc.append(parent, section);
        section
    }

    fn add_paragraph(&mut self, text: String, lineno: usize, parent: NodeId) {
        let doc = &mut self.document;
        let paragraph = doc.create(NodeKind::Paragraph);
        doc.node_mut(paragraph).line = Some(lineno);
        let text = doc.create_text(text);
        doc.append(paragraph, text);
        doc.append(parent, paragraph);
    }

    /// Parse a paragraph starting at `start`; returns the index after it
    fn parse_paragraph(&mut self, lines: &[String], start: usize, offset: usize, parent: NodeId) -> usize {
        let mut end = start;
        while end < lines.len() && !lines[end].trim().is_empty() && (end == start || !is_indented(&lines[end])) {
            end += 1;
        }

        let mut text = lines[start..end]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        let lineno = offset + start + 1;

        let expects_literal = text.ends_with("::");
        if expects_literal {
            text.truncate(text.len() - 2);
            if text.ends_with(char::is_whitespace) || text.is_empty() {
                text = text.trim_end().to_string();
            } else {
                text.push(':');
            }
        }

        if !text.is_empty() {
            self.add_paragraph(text, lineno, parent);
        }

        if !expects_literal {
            return end;
        }

        let mut next = end;
        while next < lines.len() && lines[next].trim().is_empty() {
            next += 1;
        }
        if next >= lines.len() || !is_indented(&lines[next]) {
            let message = "Literal block expected; none found".to_string();
            warn!("line {}: {}", lineno, message);
            self.document.report(MarkupError::Structure { line: lineno, message });
            return end;
        }

        let block_end = indented_block_end(lines, next);
        let doc = &mut self.document;
        let literal = doc.create(NodeKind::LiteralBlock);
        doc.node_mut(literal).line = Some(offset + next + 1);
        let text = doc.create_text(dedent(&lines[next..block_end]).join("\n"));
        doc.append(literal, text);
        doc.append(parent, literal);
        block_end
    }

    fn run_directive(
        &mut self,
        name: &str,
        argument_text: &str,
        block: &[String],
        block_offset: usize,
        lineno: usize,
        parent: NodeId,
    ) {
        let registry = self.registry;
        let Some(directive) = registry.get(name) else {
            self.report_directive_error(lineno, DirectiveError::Unknown(name.to_string()));
            return;
        };
        let spec = directive.spec();

        let block = dedent(block);
        let mut options = BTreeMap::new();
        let mut j = 0;
        while let Some(caps) = block.get(j).and_then(|l| OPTION_LINE.captures(l)) {
            options.insert(caps[1].trim().to_string(), caps.get(2).map_or("", |m| m.as_str()).trim().to_string());
            j += 1;
        }
        while block.get(j).is_some_and(|l| l.trim().is_empty()) {
            j += 1;
        }
        let content = block[j..].to_vec();

        let arguments = match spec.split_arguments(name, argument_text) {
            Ok(arguments) => arguments,
            Err(e) => return self.report_directive_error(lineno, e),
        };
        if let Some(option) = spec.unknown_option(options.keys().map(String::as_str)) {
            let error = DirectiveError::UnknownOption {
                name: name.to_string(),
                option: option.to_string(),
            };
            return self.report_directive_error(lineno, error);
        }
        if !spec.has_content && !content.is_empty() {
            return self.report_directive_error(lineno, DirectiveError::ContentNotPermitted(name.to_string()));
        }

        let invocation = DirectiveInvocation {
            name: name.to_string(),
            arguments,
            options,
            content,
            line: lineno,
            content_offset: block_offset + j,
        };
        trace!("line {}: running directive '{}' {:?}", lineno, name, invocation.arguments);

        self.directive_parents.push(parent);
        let result = directive.run(&invocation, self);
        self.directive_parents.pop();

        match result {
            Ok(nodes) => {
                for node in nodes {
                    let slot = self.document.node_mut(node);
                    if slot.line.is_none() {
                        slot.line = Some(lineno);
                    }
                    self.document.append(parent, node);
                }
            }
            Err(e) => self.report_directive_error(lineno, e),
        }
    }

    fn report_directive_error(&mut self, line: usize, source: DirectiveError) {
        warn!("line {}: {}", line, source);
        self.document.report(MarkupError::Directive { line, source });
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with(char::is_whitespace)
}

fn is_comment(line: &str) -> bool {
    line == ".." || line.starts_with(".. ")
}

/// End of the indented block starting at `start`, trailing blank lines excluded
fn indented_block_end(lines: &[String], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() && (lines[end].trim().is_empty() || is_indented(&lines[end])) {
        end += 1;
    }
    while end > start && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    end
}

/// Remove the common leading indentation; blank lines become empty
fn dedent(lines: &[String]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| if l.trim().is_empty() { String::new() } else { l.chars().skip(indent).collect() })
        .collect()
}

/// The underline character if `underline` is a valid title underline for `title`
fn underline_style(title: &str, underline: &str) -> Option<char> {
    let underline = underline.trim_end();
    let first = underline.chars().next()?;
    if !first.is_ascii_punctuation() || !underline.chars().all(|c| c == first) {
        return None;
    }
    if underline.chars().count() < title.trim_end().chars().count() {
        return None;
    }
    Some(first)
}
