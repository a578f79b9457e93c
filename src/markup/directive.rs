/*!
 * Directive contract between the parser and extensions.
 */

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::parser::ParseState;
use crate::doctree::NodeId;
use crate::errors::DirectiveError;

/// Argument, option and body rules the parser checks before running a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectiveSpec {
    pub required_arguments: usize,
    pub optional_arguments: usize,
    /// Whether the last argument may contain whitespace
    pub final_argument_whitespace: bool,
    pub has_content: bool,
    /// Option names accepted on `:name: value` lines
    pub option_spec: &'static [&'static str],
}

impl DirectiveSpec {
    /// First option name this spec does not accept
    pub fn unknown_option<'o, I>(&self, names: I) -> Option<&'o str>
    where
        I: IntoIterator<Item = &'o str>,
    {
        names.into_iter().find(|name| !self.option_spec.iter().any(|known| *known == *name))
    }

    /// Split the raw argument text per this spec and check the count
    pub fn split_arguments(&self, name: &str, text: &str) -> Result<Vec<String>, DirectiveError> {
        let text = text.trim();
        let max = self.required_arguments + self.optional_arguments;

        let arguments: Vec<String> = if text.is_empty() {
            Vec::new()
        } else if self.final_argument_whitespace && max > 0 {
            let mut parts: Vec<String> = Vec::new();
            let mut rest = text;
            while parts.len() + 1 < max {
                match rest.split_once(char::is_whitespace) {
                    Some((head, tail)) => {
                        parts.push(head.to_string());
                        rest = tail.trim_start();
                    }
                    None => break,
                }
            }
            parts.push(rest.to_string());
            parts
        } else {
            text.split_whitespace().map(str::to_string).collect()
        };

        if arguments.len() < self.required_arguments {
            return Err(DirectiveError::MissingArguments {
                name: name.to_string(),
                required: self.required_arguments,
                supplied: arguments.len(),
            });
        }
        if arguments.len() > max {
            return Err(DirectiveError::TooManyArguments {
                name: name.to_string(),
                allowed: max,
                supplied: arguments.len(),
            });
        }

        Ok(arguments)
    }
}

/// One occurrence of a directive in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveInvocation {
    pub name: String,
    pub arguments: Vec<String>,
    pub options: BTreeMap<String, String>,
    /// Body lines, dedented
    pub content: Vec<String>,
    /// 1-based line of the directive marker
    pub line: usize,
    /// 0-based source line index of the first body line
    pub content_offset: usize,
}

/// A block-level markup extension
pub trait Directive: Send + Sync {
    fn spec(&self) -> DirectiveSpec;

    /// Build the nodes that replace this directive.
    ///
    /// Returned nodes are detached; the parser appends them to the current parent.
    fn run(
        &self,
        invocation: &DirectiveInvocation,
        state: &mut ParseState<'_>,
    ) -> Result<Vec<NodeId>, DirectiveError>;
}

/// Directives known to a parser, by name
#[derive(Default, Clone)]
pub struct DirectiveRegistry {
    directives: HashMap<String, Arc<dyn Directive>>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directive, replacing any previous one with the same name
    pub fn register(&mut self, name: &str, directive: Arc<dyn Directive>) {
        self.directives.insert(name.to_string(), directive);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Directive> {
        self.directives.get(name).map(|d| d.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.directives.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("directives", &self.names())
            .finish()
    }
}
