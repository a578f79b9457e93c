/*!
 * Tests for the timeline extension
 */

use prismdocs::builder::{Builder, Extension, Transform};
use prismdocs::doctree::{Document, NodeId, NodeKind};
use prismdocs::errors::{DirectiveError, MarkupError};
use prismdocs::timeline::{
    CARD, CARD_CLASS, HEADER, PromoteTimelineSections, TIMELINE, TimelineExtension, TimelineOptions,
};

use crate::common::TIMELINE_SOURCE;

const LAUNCH_SOURCE: &str = "\
.. timeline::

   .. timeline-card:: Launch

      The first release.
";

fn builder(promote_sections: bool) -> Builder {
    let mut builder = Builder::new();
    builder.setup_extension(&TimelineExtension::new(TimelineOptions { promote_sections }));
    builder
}

fn tags(doc: &Document, parent: NodeId) -> Vec<&str> {
    doc.children(parent).iter().map(|&c| doc.kind(c).tag_name()).collect()
}

/// Test the registrations made by the extension
#[test]
fn test_setup_shouldRegisterDirectivesNodesAndMetadata() {
    let mut builder = Builder::new();
    let extension = TimelineExtension::default();

    let metadata = extension.setup(&mut builder);

    assert_eq!(extension.name(), "timeline");
    assert_eq!(metadata.version, "0.1");
    assert!(metadata.parallel_read_safe);
    assert!(metadata.parallel_write_safe);
    assert_eq!(builder.directives().names(), vec!["timeline", "timeline-card"]);
    assert!(builder.has_node(&TIMELINE));
    assert!(builder.has_node(&CARD));
    assert!(builder.has_node(&HEADER));
    assert!(builder.html_handlers(&CARD).is_some());
}

/// Test that the promotion transform is only registered on request
#[test]
fn test_setup_withPromotionOption_shouldToggleTransform() {
    assert!(builder(false).transform_names().is_empty());
    assert_eq!(builder(true).transform_names(), vec!["promote-timeline-sections"]);
    assert_eq!(PromoteTimelineSections::PRIORITY, 500);
}

/// Test that loaded extensions are remembered with their metadata
#[test]
fn test_setupExtension_shouldRecordMetadata() {
    let builder = builder(false);

    assert_eq!(builder.extensions().len(), 1);
    assert_eq!(builder.extensions()[0].0, "timeline");
    assert!(builder.is_parallel_read_safe());
    assert!(builder.is_parallel_write_safe());
}

/// Test the tree built for a single card
#[test]
fn test_parse_withSingleCard_shouldBuildCardStructure() {
    let doc = builder(false).parse(LAUNCH_SOURCE);

    let expected = "\
<document>
    <timeline>
        <timeline-card classes=\"terminal-card\" ids=\"launch\">
            <timeline-header>
                Launch
            <container>
                <paragraph>
                    The first release.
";
    assert_eq!(doc.pformat(), expected);
    assert!(doc.diagnostics().is_empty());
}

/// Test that card titles keep their spaces and produce hyphenated ids
#[test]
fn test_parse_withMultiWordTitle_shouldKeepWholeTitle() {
    let doc = builder(false).parse(".. timeline::\n\n   .. timeline-card:: Public Beta Opens\n\n      Text.\n");

    let cards = doc.traverse(|n| n.kind.is_custom(&CARD));
    assert_eq!(cards.len(), 1);
    assert_eq!(doc.attributes(cards[0]).ids, vec!["public-beta-opens".to_string()]);
    assert_eq!(doc.attributes(cards[0]).classes, vec![CARD_CLASS.to_string()]);

    let header = doc.children(cards[0])[0];
    assert!(doc.kind(header).is_custom(&HEADER));
    assert_eq!(doc.text_content(header), "Public Beta Opens");
}

/// Test that repeated titles do not produce duplicate ids
#[test]
fn test_parse_withDuplicateTitles_shouldKeepIdsUnique() {
    let source = ".. timeline::\n\n   .. timeline-card:: Launch\n\n      One.\n\n   .. timeline-card:: Launch\n\n      Two.\n";
    let doc = builder(false).parse(source);

    let ids: Vec<String> = doc
        .traverse(|n| n.kind.is_custom(&CARD))
        .into_iter()
        .flat_map(|card| doc.attributes(card).ids.clone())
        .collect();
    assert_eq!(ids, vec!["launch".to_string(), "launch-1".to_string()]);
}

/// Test that a card without a title is reported and dropped
#[test]
fn test_parse_withMissingTitle_shouldReportMissingArgument() {
    let doc = builder(false).parse(".. timeline-card::\n\n   Body.\n");

    assert_eq!(
        doc.diagnostics(),
        &[MarkupError::Directive {
            line: 1,
            source: DirectiveError::MissingArguments {
                name: "timeline-card".to_string(),
                required: 1,
                supplied: 0
            }
        }]
    );
    assert_eq!(doc.node_count(), 1);
}

/// Test that an empty timeline still produces a node
#[test]
fn test_parse_withEmptyTimeline_shouldCreateEmptyNode() {
    let doc = builder(false).parse(".. timeline::\n");

    assert_eq!(tags(&doc, doc.root()), vec!["timeline"]);
    assert!(doc.children(doc.children(doc.root())[0]).is_empty());
}

/// Test that cards stay nested when promotion is off
#[test]
fn test_parse_withoutPromotion_shouldKeepCardsInsideTimeline() {
    let doc = builder(false).parse(TIMELINE_SOURCE);

    let history = doc.children(doc.root())[0];
    assert_eq!(tags(&doc, history), vec!["title", "timeline", "paragraph"]);

    let timeline = doc.children(history)[1];
    assert_eq!(tags(&doc, timeline), vec!["timeline-card", "paragraph", "timeline-card"]);
}

/// Test that promotion moves cards after the timeline in order
#[test]
fn test_parse_withPromotion_shouldMoveCardsAfterTimeline() {
    let doc = builder(true).parse(TIMELINE_SOURCE);

    let history = doc.children(doc.root())[0];
    assert_eq!(
        tags(&doc, history),
        vec!["title", "timeline", "timeline-card", "timeline-card", "paragraph"]
    );

    let timeline = doc.children(history)[1];
    assert_eq!(tags(&doc, timeline), vec!["paragraph"]);
    assert_eq!(doc.text_content(timeline), "Between cards.");

    let alpha = doc.children(history)[2];
    let beta = doc.children(history)[3];
    assert_eq!(doc.attributes(alpha).ids, vec!["alpha".to_string()]);
    assert_eq!(doc.attributes(beta).ids, vec!["beta".to_string()]);
    assert_eq!(doc.parent(alpha), Some(history));
    assert_eq!(doc.text_content(doc.children(history)[4]), "Epilogue.");
}

/// Test that native sections are promoted as well
#[test]
fn test_parse_withNativeSectionInTimeline_shouldPromoteSection() {
    let source = ".. timeline::\n\n   Milestones\n   ----------\n\n   Text.\n";
    let doc = builder(true).parse(source);
    let root = doc.root();

    assert_eq!(tags(&doc, root), vec!["timeline", "section"]);
    assert!(doc.children(doc.children(root)[0]).is_empty());
    assert_eq!(doc.attributes(doc.children(root)[1]).ids, vec!["milestones".to_string()]);
}

/// Test that running the transform by hand on an unpromoted tree gives the same result
#[test]
fn test_applyTransforms_withManualTransform_shouldMatchRegisteredRun() {
    let mut manual = builder(false).parse(TIMELINE_SOURCE);
    let mut promoting = Builder::new();
    promoting.add_transform(PromoteTimelineSections);
    promoting.apply_transforms(&mut manual);

    let registered = builder(true).parse(TIMELINE_SOURCE);

    assert_eq!(manual.pformat(), registered.pformat());
}

/// Test that a second pass changes nothing and no node is created or lost
#[test]
fn test_promote_appliedTwice_shouldBeNoOp() {
    let mut doc = builder(false).parse(TIMELINE_SOURCE);
    let count_before = doc.node_count();

    PromoteTimelineSections.apply(&mut doc);
    let once = doc.pformat();
    PromoteTimelineSections.apply(&mut doc);

    assert_eq!(doc.pformat(), once);
    assert_eq!(doc.node_count(), count_before);
    for timeline in doc.traverse(|n| n.kind.is_custom(&TIMELINE)) {
        assert!(!doc.children(timeline).iter().any(|&c| doc.is_section(c)));
    }
}

/// Test that cards inside nested timelines end up after the outermost one
#[test]
fn test_promote_withNestedTimelines_shouldLeaveNoSectionInsideAnyTimeline() {
    let source = ".. timeline::\n\n   .. timeline::\n\n      .. timeline-card:: A\n\n         Body.\n";
    let mut doc = builder(true).parse(source);
    let root = doc.root();

    assert_eq!(tags(&doc, root), vec!["timeline", "timeline-card"]);
    let outer = doc.children(root)[0];
    assert_eq!(tags(&doc, outer), vec!["timeline"]);
    assert!(doc.children(doc.children(outer)[0]).is_empty());
    for timeline in doc.traverse(|n| n.kind.is_custom(&TIMELINE)) {
        assert!(!doc.children(timeline).iter().any(|&c| doc.is_section(c)));
    }

    let once = doc.pformat();
    PromoteTimelineSections.apply(&mut doc);
    assert_eq!(doc.pformat(), once);
}

/// Test that accented card titles fold to ASCII ids
#[test]
fn test_parse_withAccentedTitle_shouldFoldId() {
    let doc = builder(false).parse(".. timeline::\n\n   .. timeline-card:: Café Opening\n\n      Text.\n");

    let card = doc.traverse(|n| n.kind.is_custom(&CARD))[0];
    assert_eq!(doc.attributes(card).ids, vec!["cafe-opening".to_string()]);
    assert_eq!(doc.text_content(doc.children(card)[0]), "Café Opening");
}

/// Test that cards accept no options
#[test]
fn test_parse_withCardOption_shouldReportUnknownOption() {
    let doc = builder(false).parse(".. timeline::\n\n   .. timeline-card:: A\n      :class: x\n\n      Body.\n");

    assert_eq!(
        doc.diagnostics(),
        &[MarkupError::Directive {
            line: 3,
            source: DirectiveError::UnknownOption {
                name: "timeline-card".to_string(),
                option: "class".to_string()
            }
        }]
    );
    assert!(doc.traverse(|n| n.kind.is_custom(&CARD)).is_empty());
    assert_eq!(tags(&doc, doc.root()), vec!["timeline"]);
}

/// Test that non-section children stay put
#[test]
fn test_promote_withOnlyParagraphs_shouldLeaveTimelineUntouched() {
    let source = ".. timeline::\n\n   Just text.\n";
    let doc = builder(true).parse(source);

    assert_eq!(tags(&doc, doc.root()), vec!["timeline"]);
    assert_eq!(tags(&doc, doc.children(doc.root())[0]), vec!["paragraph"]);
}

/// Test the HTML for a card
#[test]
fn test_renderHtml_withSingleCard_shouldEmitTerminalMarkup() {
    let builder = builder(false);
    let doc = builder.parse(LAUNCH_SOURCE);

    let expected = "<div class=\"terminal-timeline\"><section class=\"terminal-card\"><header>Launch</header><div>\n<p>The first release.</p>\n</div>\n</section></div>";
    assert_eq!(builder.render_html(&doc), expected);
}

/// Test that header text is escaped
#[test]
fn test_renderHtml_withMarkupInTitle_shouldEscapeHeader() {
    let builder = builder(false);
    let doc = builder.parse(".. timeline::\n\n   .. timeline-card:: Fish & <Chips>\n\n      x\n");

    let html = builder.render_html(&doc);
    assert!(html.contains("<header>Fish &amp; &lt;Chips&gt;</header>"));
}

/// Test the heading level of a promoted native section
#[test]
fn test_renderHtml_withPromotedSection_shouldRenderAfterTimeline() {
    let builder = builder(true);
    let doc = builder.parse(".. timeline::\n\n   Milestones\n   ----------\n\n   Text.\n");

    assert_eq!(
        builder.render_html(&doc),
        "<div class=\"terminal-timeline\"></div><section id=\"milestones\">\n<h1>Milestones</h1>\n<p>Text.</p>\n</section>\n"
    );
}

/// Test that card content counts one section level deeper
#[test]
fn test_parse_withCardInsideSection_shouldNestCardBelowSection() {
    let doc = builder(false).parse(TIMELINE_SOURCE);

    let card = doc.traverse(|n| n.kind.is_custom(&CARD))[0];
    let body = doc.children(card)[1];
    assert_eq!(doc.kind(body), &NodeKind::Container);
    assert_eq!(doc.section_depth(body), 2);
}
