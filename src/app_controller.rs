use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use std::path::Path;

use crate::app_config::Config;
use crate::builder::Builder;
use crate::doctree::Document;
use crate::file_utils::FileManager;
use crate::stub_generator::{GenerationSummary, StubGenerator};
use crate::timeline::{TimelineExtension, TimelineOptions};

// @module: Application controller for documentation builds

/// Output written by a render run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// HTML fragment
    #[default]
    Html,
    /// Indented tree dump
    PseudoXml,
    /// Nested JSON tree
    Json,
}

/// Result of rendering one markup source
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub output: String,
    /// Number of authoring problems reported while parsing
    pub diagnostics: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mirror a source tree into reference documentation sources
    pub fn run_generate<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input_dir: P1,
        output_dir: P2,
        show_progress: bool,
    ) -> Result<GenerationSummary> {
        let generator = StubGenerator::new(self.config.stubs.clone())?.with_progress(show_progress);
        generator.generate(input_dir, output_dir)
    }

    /// Builder with every extension this tooling ships loaded
    pub fn builder(&self) -> Builder {
        let mut builder = Builder::new();
        let extension = TimelineExtension::new(TimelineOptions {
            promote_sections: self.config.timeline.promote_sections,
        });
        builder.setup_extension(&extension);
        builder
    }

    /// Parse and render a markup source held in memory
    pub fn render_source(&self, source: &str, format: OutputFormat) -> Result<RenderOutcome> {
        let builder = self.builder();
        let document = builder.parse(source);

        for diagnostic in document.diagnostics() {
            warn!("{}", diagnostic);
        }

        let output = Self::serialize(&builder, &document, format)?;
        Ok(RenderOutcome {
            output,
            diagnostics: document.diagnostics().len(),
        })
    }

    /// Render a markup file, writing to `output_file` when given
    pub fn render_file<P: AsRef<Path>>(
        &self,
        input_file: P,
        output_file: Option<&Path>,
        format: OutputFormat,
    ) -> Result<RenderOutcome> {
        let input_file = input_file.as_ref();
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let source = FileManager::read_to_string(input_file)?;

        let outcome = self
            .render_source(&source, format)
            .with_context(|| format!("Failed to render {:?}", input_file))?;

        if let Some(output_file) = output_file {
            FileManager::write_to_file(output_file, &outcome.output)?;
            info!("Rendered {:?} -> {:?}", input_file, output_file);
        }

        Ok(outcome)
    }

    fn serialize(builder: &Builder, document: &Document, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Html => builder.render_html(document),
            OutputFormat::PseudoXml => document.pformat(),
            OutputFormat::Json => document.to_json().context("Failed to serialize document tree")?,
        })
    }
}
