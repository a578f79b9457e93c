/*!
 * Document build host.
 *
 * A [`Builder`] owns everything extensions register: directives, custom node
 * kinds with their per-format render callbacks, and tree transforms. Each
 * document is parsed, transformed once, then rendered; documents share no
 * state, so builds of different documents can run independently.
 */

pub mod html;

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub use html::{HtmlTranslator, escape_html};

use crate::doctree::{CustomKind, Document, NodeId};
use crate::markup::{self, Directive, DirectiveRegistry};

/// HTML visit or depart callback for a custom node kind
pub type HtmlCallback = fn(&mut HtmlTranslator<'_>, &Document, NodeId);

/// Render callbacks registered for a node kind
#[derive(Clone, Copy, Default)]
pub struct NodeHandlers {
    /// `(visit, depart)` for the HTML writer
    pub html: Option<(HtmlCallback, HtmlCallback)>,
}

impl NodeHandlers {
    /// Handlers with an HTML visit/depart pair
    pub fn html(visit: HtmlCallback, depart: HtmlCallback) -> Self {
        Self {
            html: Some((visit, depart)),
        }
    }
}

/// A post-parse, pre-render pass over one document
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    /// Lower priorities run first
    fn priority(&self) -> u32;

    fn apply(&self, document: &mut Document);
}

/// What an extension reports back after setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionMetadata {
    pub version: String,
    pub parallel_read_safe: bool,
    pub parallel_write_safe: bool,
}

/// A bundle of registrations applied to a builder
pub trait Extension {
    fn name(&self) -> &str;

    fn setup(&self, builder: &mut Builder) -> ExtensionMetadata;
}

/// Registry of directives, node kinds and transforms
#[derive(Default)]
pub struct Builder {
    directives: DirectiveRegistry,
    nodes: HashMap<&'static str, (CustomKind, NodeHandlers)>,
    transforms: Vec<Arc<dyn Transform>>,
    extensions: Vec<(String, ExtensionMetadata)>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_directive<D: Directive + 'static>(&mut self, name: &str, directive: D) {
        if self.directives.contains(name) {
            warn!("Directive '{}' is already registered, replacing it", name);
        } else {
            debug!("Registering directive '{}'", name);
        }
        self.directives.register(name, Arc::new(directive));
    }

    pub fn add_node(&mut self, kind: CustomKind, handlers: NodeHandlers) {
        debug!("Registering node kind '{}'", kind.name);
        self.nodes.insert(kind.name, (kind, handlers));
    }

    pub fn add_transform<T: Transform + 'static>(&mut self, transform: T) {
        debug!("Registering transform '{}' (priority {})", transform.name(), transform.priority());
        self.transforms.push(Arc::new(transform));
    }

    /// Run an extension's setup and remember its metadata
    pub fn setup_extension(&mut self, extension: &dyn Extension) -> ExtensionMetadata {
        let metadata = extension.setup(self);
        info!("Loaded extension '{}' v{}", extension.name(), metadata.version);
        self.extensions.push((extension.name().to_string(), metadata.clone()));
        metadata
    }

    pub fn directives(&self) -> &DirectiveRegistry {
        &self.directives
    }

    pub fn has_node(&self, kind: &CustomKind) -> bool {
        self.nodes.contains_key(kind.name)
    }

    pub fn html_handlers(&self, kind: &CustomKind) -> Option<(HtmlCallback, HtmlCallback)> {
        self.nodes.get(kind.name).and_then(|(_, handlers)| handlers.html)
    }

    pub fn transform_names(&self) -> Vec<&str> {
        self.ordered_transforms().into_iter().map(|t| t.name()).collect()
    }

    pub fn extensions(&self) -> &[(String, ExtensionMetadata)] {
        &self.extensions
    }

    /// Whether every loaded extension allows documents to be read in parallel
    pub fn is_parallel_read_safe(&self) -> bool {
        self.extensions.iter().all(|(_, m)| m.parallel_read_safe)
    }

    /// Whether every loaded extension allows documents to be written in parallel
    pub fn is_parallel_write_safe(&self) -> bool {
        self.extensions.iter().all(|(_, m)| m.parallel_write_safe)
    }

    /// Parse a source and apply every registered transform
    pub fn parse(&self, source: &str) -> Document {
        let mut document = markup::parse(source, &self.directives);
        self.apply_transforms(&mut document);
        document
    }

    /// Apply transforms by ascending priority; ties keep registration order
    pub fn apply_transforms(&self, document: &mut Document) {
        for transform in self.ordered_transforms() {
            debug!("Applying transform '{}'", transform.name());
            transform.apply(document);
        }
    }

    pub fn render_html(&self, document: &Document) -> String {
        HtmlTranslator::new(self).translate(document)
    }

    fn ordered_transforms(&self) -> Vec<&Arc<dyn Transform>> {
        let mut ordered: Vec<&Arc<dyn Transform>> = self.transforms.iter().collect();
        ordered.sort_by_key(|t| t.priority());
        ordered
    }
}
