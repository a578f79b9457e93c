/*!
 * Annotation-driven reference stub generation.
 *
 * Every file below an input directory is mirrored into an output directory.
 * Files whose comments carry an annotation such as `@class Actor` are replaced
 * by a generated reference page; all other files are copied byte for byte.
 */

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use regex::bytes::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::app_config::StubConfig;
use crate::file_utils::FileManager;

/// What was written for a single source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedDocument {
    /// A synthesized reference page for the tagged object
    Stub { tag: String, object_domain: String },
    /// The source bytes, unchanged
    Verbatim(Vec<u8>),
}

impl GeneratedDocument {
    /// Bytes to write for this document
    pub fn contents(&self) -> Vec<u8> {
        match self {
            Self::Stub { tag, object_domain } => render_stub(tag, object_domain).into_bytes(),
            Self::Verbatim(bytes) => bytes.clone(),
        }
    }
}

/// Counts reported at the end of a generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Files replaced by a generated stub
    pub stubs: usize,
    /// Files copied verbatim
    pub copies: usize,
    /// Writes that replaced an output already written in the same run
    pub collisions: usize,
}

impl GenerationSummary {
    /// Total number of files written
    pub fn total(&self) -> usize {
        self.stubs + self.copies
    }
}

/// Mirrors a source tree into reference documentation sources
pub struct StubGenerator {
    config: StubConfig,
    pattern: Regex,
    show_progress: bool,
}

impl StubGenerator {
    /// Create a generator for the given settings
    pub fn new(config: StubConfig) -> Result<Self> {
        let pattern = Regex::new(&format!(r"{}\s+(\w+)", regex::escape(&config.marker)))
            .with_context(|| format!("Invalid annotation marker: {}", config.marker))?;

        Ok(Self {
            config,
            pattern,
            show_progress: false,
        })
    }

    /// Show a progress bar while files are processed
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Find the first annotated identifier in a file's contents.
    ///
    /// Lines are scanned in order and scanning stops at the first match.
    pub fn extract_tag(&self, contents: &[u8]) -> Option<String> {
        contents
            .split(|&b| b == b'\n')
            .find_map(|line| self.pattern.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
    }

    /// Decide what to emit for a file's contents
    pub fn transform(&self, contents: Vec<u8>) -> GeneratedDocument {
        match self.extract_tag(&contents) {
            Some(tag) => GeneratedDocument::Stub {
                tag,
                object_domain: self.config.object_domain.clone(),
            },
            None => GeneratedDocument::Verbatim(contents),
        }
    }

    /// Output location for an input file
    pub fn output_path(&self, input_file: &Path, input_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
        FileManager::mirrored_output_path(input_file, input_dir, output_dir, &self.config.output_extension)
    }

    /// Mirror `input_dir` into `output_dir`, one output file per input file.
    ///
    /// Any I/O failure aborts the run.
    pub fn generate<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input_dir: P1,
        output_dir: P2,
    ) -> Result<GenerationSummary> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        FileManager::ensure_dir(output_dir)?;

        let files = FileManager::find_all_files(input_dir)?;
        info!("Generating reference sources for {} file(s) from {:?}", files.len(), input_dir);

        let progress = if self.show_progress {
            let bar = ProgressBar::new(files.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut summary = GenerationSummary::default();
        let mut written: HashMap<PathBuf, &Path> = HashMap::new();

        for input_file in &files {
            let output_file = self.output_path(input_file, input_dir, output_dir)?;
            if let Some(previous) = written.insert(output_file.clone(), input_file.as_path()) {
                warn!("{:?} overwrites {:?}, already written from {:?}", input_file, output_file, previous);
                summary.collisions += 1;
            }
            let contents = FileManager::read_bytes(input_file)?;

            let document = self.transform(contents);
            match &document {
                GeneratedDocument::Stub { tag, .. } => {
                    debug!("{:?} -> {:?} (stub for {})", input_file, output_file, tag);
                    summary.stubs += 1;
                }
                GeneratedDocument::Verbatim(_) => {
                    debug!("{:?} -> {:?} (copied)", input_file, output_file);
                    summary.copies += 1;
                }
            }

            FileManager::write_to_file(&output_file, document.contents())?;
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "Wrote {} file(s) to {:?}: {} stub(s), {} copied",
            summary.total(),
            output_dir,
            summary.stubs,
            summary.copies
        );
        if summary.collisions > 0 {
            warn!("{} output file(s) were overwritten by a later input", summary.collisions);
        }

        Ok(summary)
    }
}

/// Render the reference page for an annotated object
pub fn render_stub(tag: &str, object_domain: &str) -> String {
    let underline = "=".repeat(tag.chars().count());
    format!("{tag}\n{underline}\n\n.. {object_domain}:autoobject:: {tag}\n   :members:\n")
}
