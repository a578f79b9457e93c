/*!
 * # prismdocs - documentation build tooling
 *
 * A Rust library and CLI for building the project's reference documentation.
 *
 * ## Features
 *
 * - Mirror a source tree into documentation sources, replacing every file
 *   annotated with `@class Name` by a generated `autoobject` reference stub
 * - Parse a reStructuredText subset into an arena document tree
 * - A timeline extension with `timeline` and `timeline-card` directives,
 *   an optional section promotion transform and HTML rendering
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `stub_generator`: Annotation-driven stub generation
 * - `doctree`: Arena document tree
 * - `markup`: Block parser and the directive contract
 * - `builder`: Registration host, transforms and the HTML writer
 * - `timeline`: The timeline extension
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod builder;
pub mod doctree;
pub mod errors;
pub mod file_utils;
pub mod markup;
pub mod stub_generator;
pub mod timeline;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, OutputFormat};
pub use builder::{Builder, Extension, ExtensionMetadata, Transform};
pub use doctree::{Document, NodeId, NodeKind};
pub use errors::{ConfigError, DirectiveError, MarkupError};
pub use stub_generator::{GenerationSummary, StubGenerator};
pub use timeline::{PromoteTimelineSections, TimelineExtension, TimelineOptions};
