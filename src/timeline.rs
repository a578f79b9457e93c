/*!
 * Timeline markup extension.
 *
 * Adds two directives:
 *
 * ```text
 * .. timeline::
 *
 *    .. timeline-card:: Launch
 *
 *       First public release.
 * ```
 *
 * `timeline` wraps its parsed body in a timeline node. `timeline-card` builds a
 * card section holding a header with the title and a container with the body.
 * The optional [`PromoteTimelineSections`] transform lifts section children
 * out of each timeline so they follow it as siblings.
 */

use log::{debug, trace};

use crate::builder::{Builder, Extension, ExtensionMetadata, HtmlTranslator, NodeHandlers, Transform};
use crate::doctree::{CustomKind, Document, NodeId, NodeKind};
use crate::errors::DirectiveError;
use crate::markup::{Directive, DirectiveInvocation, DirectiveSpec, ParseState};

pub const TIMELINE: CustomKind = CustomKind::element("timeline");
pub const CARD: CustomKind = CustomKind::section("timeline-card");
pub const HEADER: CustomKind = CustomKind::element("timeline-header");

/// Class attached to every card
pub const CARD_CLASS: &str = "terminal-card";

pub const EXTENSION_VERSION: &str = "0.1";

/// `.. timeline::` wraps its body in a timeline node
pub struct TimelineDirective;

impl Directive for TimelineDirective {
    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            has_content: true,
            ..DirectiveSpec::default()
        }
    }

    fn run(
        &self,
        invocation: &DirectiveInvocation,
        state: &mut ParseState<'_>,
    ) -> Result<Vec<NodeId>, DirectiveError> {
        let container = state.document_mut().create(NodeKind::Custom(TIMELINE));
        state.nested_parse(&invocation.content, invocation.content_offset, container);
        Ok(vec![container])
    }
}

/// `.. timeline-card:: <title>` builds one card
pub struct TimelineCardDirective;

impl Directive for TimelineCardDirective {
    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            required_arguments: 1,
            final_argument_whitespace: true,
            has_content: true,
            ..DirectiveSpec::default()
        }
    }

    fn run(
        &self,
        invocation: &DirectiveInvocation,
        state: &mut ParseState<'_>,
    ) -> Result<Vec<NodeId>, DirectiveError> {
        let title = invocation.arguments.first().ok_or_else(|| DirectiveError::MissingArguments {
            name: invocation.name.clone(),
            required: 1,
            supplied: 0,
        })?;

        let doc = state.document_mut();
        let card = doc.create(NodeKind::Custom(CARD));
        doc.attributes_mut(card).classes = vec![CARD_CLASS.to_string()];
        let id = doc.set_unique_id(card, title);
        trace!("timeline card '{}' -> #{}", title, id);

        let header = doc.create(NodeKind::Custom(HEADER));
        let text = doc.create_text(title.as_str());
        doc.append(header, text);
        doc.append(card, header);

        let content = doc.create(NodeKind::Container);
        doc.append(card, content);
        state.nested_parse(&invocation.content, invocation.content_offset, content);

        Ok(vec![card])
    }
}

/// Moves every section child of a timeline to directly after the timeline
pub struct PromoteTimelineSections;

impl PromoteTimelineSections {
    pub const PRIORITY: u32 = 500;
}

impl Transform for PromoteTimelineSections {
    fn name(&self) -> &str {
        "promote-timeline-sections"
    }

    fn priority(&self) -> u32 {
        Self::PRIORITY
    }

    fn apply(&self, document: &mut Document) {
        // Inner timelines first, so sections lifted out of a nested timeline
        // are lifted again by the timeline that now holds them
        let timelines = document.traverse(|node| node.kind.is_custom(&TIMELINE));

        for timeline in timelines.into_iter().rev() {
            let Some(parent) = document.parent(timeline) else {
                continue;
            };
            let Some(index) = document.index_of(parent, timeline) else {
                continue;
            };

            let sections: Vec<NodeId> = document
                .children(timeline)
                .iter()
                .copied()
                .filter(|&child| document.is_section(child))
                .collect();

            if sections.is_empty() {
                continue;
            }
            debug!("Promoting {} section(s) out of timeline {:?}", sections.len(), timeline);

            for (offset, section) in sections.into_iter().enumerate() {
                document.remove(timeline, section);
                document.insert(parent, index + 1 + offset, section);
            }
        }
    }
}

fn visit_timeline_html(translator: &mut HtmlTranslator<'_>, _document: &Document, _id: NodeId) {
    translator.body.push("<div class=\"terminal-timeline\">".to_string());
}

fn depart_timeline_html(translator: &mut HtmlTranslator<'_>, _document: &Document, _id: NodeId) {
    translator.body.push("</div>".to_string());
}

fn visit_card_html(translator: &mut HtmlTranslator<'_>, _document: &Document, _id: NodeId) {
    translator.body.push(format!("<section class=\"{CARD_CLASS}\">"));
}

fn depart_card_html(translator: &mut HtmlTranslator<'_>, _document: &Document, _id: NodeId) {
    translator.body.push("</section>".to_string());
}

fn visit_header_html(translator: &mut HtmlTranslator<'_>, document: &Document, id: NodeId) {
    let tag = translator.starttag(document, id, "header");
    translator.body.push(tag);
}

fn depart_header_html(translator: &mut HtmlTranslator<'_>, _document: &Document, _id: NodeId) {
    translator.body.push("</header>".to_string());
}

/// Extension settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineOptions {
    /// Register [`PromoteTimelineSections`]
    pub promote_sections: bool,
}

/// Registers the timeline directives, node kinds and (optionally) the promotion transform
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineExtension {
    pub options: TimelineOptions,
}

impl TimelineExtension {
    pub fn new(options: TimelineOptions) -> Self {
        Self { options }
    }
}

impl Extension for TimelineExtension {
    fn name(&self) -> &str {
        "timeline"
    }

    fn setup(&self, builder: &mut Builder) -> ExtensionMetadata {
        builder.add_directive("timeline", TimelineDirective);
        builder.add_directive("timeline-card", TimelineCardDirective);
        builder.add_node(HEADER, NodeHandlers::html(visit_header_html, depart_header_html));
        builder.add_node(CARD, NodeHandlers::html(visit_card_html, depart_card_html));
        builder.add_node(TIMELINE, NodeHandlers::html(visit_timeline_html, depart_timeline_html));

        if self.options.promote_sections {
            builder.add_transform(PromoteTimelineSections);
        } else {
            debug!("Timeline section promotion is disabled");
        }

        ExtensionMetadata {
            version: EXTENSION_VERSION.to_string(),
            parallel_read_safe: true,
            parallel_write_safe: true,
        }
    }
}
