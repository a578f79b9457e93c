/*!
 * Markup parsing.
 *
 * - `directive`: the contract extensions implement to add block-level constructs
 * - `parser`: the block parser and the state handed to directives for nested parses
 */

pub mod directive;
pub mod parser;

pub use directive::{Directive, DirectiveInvocation, DirectiveRegistry, DirectiveSpec};
pub use parser::ParseState;

use crate::doctree::Document;

/// Parse a markup source into a document using the given directives.
///
/// Authoring problems do not abort the parse; they are collected in
/// [`Document::diagnostics`].
pub fn parse(source: &str, registry: &DirectiveRegistry) -> Document {
    let lines: Vec<String> = source.lines().map(|l| l.replace('\t', "        ")).collect();
    let mut state = ParseState::new(registry);
    let root = state.document().root();
    state.nested_parse(&lines, 0, root);
    state.finish()
}
