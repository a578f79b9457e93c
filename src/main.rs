// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use prismdocs::app_config::{Config, LogLevel};
use prismdocs::{Controller, OutputFormat};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOutputFormat {
    Html,
    Pseudoxml,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli_format: CliOutputFormat) -> Self {
        match cli_format {
            CliOutputFormat::Html => OutputFormat::Html,
            CliOutputFormat::Pseudoxml => OutputFormat::PseudoXml,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror a source tree into reference documentation sources (default command)
    Gen(GenArgs),

    /// Render one markup file with the timeline extension loaded
    Render(RenderArgs),

    /// Generate shell completions for prismdocs
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenArgs {
    /// Directory holding annotated source files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory receiving the generated files
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Markup file to render
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    format: CliOutputFormat,

    /// Lift sections out of timelines so they follow the timeline as siblings
    #[arg(long)]
    promote_sections: bool,
}

/// prismdocs - documentation build tooling
///
/// Generates reference stubs from annotated sources and renders markup
/// that uses the timeline directives.
#[derive(Parser, Debug)]
#[command(name = "prismdocs")]
#[command(args_conflicts_with_subcommands = true)]
#[command(version)]
#[command(about = "Documentation build tooling")]
#[command(long_about = "prismdocs mirrors annotated source trees into reference documentation sources
and renders markup that uses the timeline directives.

EXAMPLES:
    prismdocs src/ docs/source/api/               # Generate reference stubs
    prismdocs gen src/ docs/source/api/           # Same, with the explicit subcommand
    prismdocs render history.rst -o history.html  # Render a page with timelines
    prismdocs render --format pseudoxml page.rst  # Dump the document tree
    prismdocs completions bash > prismdocs.bash   # Generate bash completions

CONFIGURATION:
    Settings are read from prismdocs.json when it exists. You can specify a
    different file with --config-path. Missing settings use built-in defaults.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding annotated source files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Directory receiving the generated files
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "prismdocs.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and label for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "error"),
            Level::Warn => ("1;33", "warn "),
            Level::Info => ("1;32", "info "),
            Level::Debug => ("1;36", "debug"),
            Level::Trace => ("1;35", "trace"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger accepts everything; the facade's max level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = match CommandLineOptions::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return Ok(());
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "prismdocs", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Gen(args)) => run_gen(config, args),
        Some(Commands::Render(args)) => run_render(config, args),
        None => {
            // Default behavior - two positional directories
            let (Some(input_dir), Some(output_dir)) = (cli.input_dir, cli.output_dir) else {
                eprintln!("{}", CommandLineOptions::command().render_usage());
                std::process::exit(1);
            };
            run_gen(config, GenArgs { input_dir, output_dir })
        }
    }
}

// Load the config file, apply command line overrides and set the log level
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    if let Some(level) = &cli.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    let mut config = Config::load_or_default(&cli.config_path)?;

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }
    if let Some(Commands::Render(args)) = &cli.command {
        if args.promote_sections {
            config.timeline.promote_sections = true;
        }
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

fn run_gen(config: Config, args: GenArgs) -> Result<()> {
    if !args.input_dir.is_dir() {
        return Err(anyhow!("Input directory does not exist: {:?}", args.input_dir));
    }

    let controller = Controller::with_config(config)?;
    let start_time = std::time::Instant::now();
    let summary = controller.run_generate(&args.input_dir, &args.output_dir, std::io::stderr().is_terminal())?;

    info!(
        "Done in {:.2?}: {} stub(s), {} verbatim copies",
        start_time.elapsed(),
        summary.stubs,
        summary.copies
    );
    Ok(())
}

fn run_render(config: Config, args: RenderArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let outcome = controller.render_file(&args.input_file, args.output.as_deref(), args.format.into())?;

    if args.output.is_none() {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(outcome.output.as_bytes())
            .context("Failed to write rendered output")?;
        stdout.flush().context("Failed to write rendered output")?;
    }

    if outcome.diagnostics > 0 {
        info!("Rendered with {} authoring problem(s)", outcome.diagnostics);
    }
    Ok(())
}
