//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use tasksmith_common_config::{ConfigLoader, TasksmithConfig};
use tasksmith_plan::{Enhancer, Placeholders, TaskRenderer};
use tracing::debug;

use crate::commands::{EnhanceCommand, ExtractCommand, NormalizeCommand, RunCommand};
use crate::error::CliError;

/// Tasksmith - execution-order outline to task documents
///
/// Extracts one markdown document per task from an outline, enriches the
/// documents with requirements and test cases, and keeps them normalized.
#[derive(Debug, Parser)]
#[command(
    name = "tasksmith",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "TASKSMITH_CONFIG",
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Project root that configured paths are relative to
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = ".",
        value_hint = ValueHint::DirPath,
        help = "Project root directory"
    )]
    pub root: PathBuf,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one task document per outline entry
    Extract(ExtractCommand),

    /// Add requirements, test cases and verification steps to task documents
    Enhance(EnhanceCommand),

    /// Apply normalization passes to task documents
    Normalize(NormalizeCommand),

    /// Extract, enhance and normalize in one go
    Run(RunCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsCommand),
}

/// Shell completions generation
#[derive(Debug, Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl Cli {
    /// Load configuration from `--config` or the project root.
    pub fn load_config(&self) -> Result<TasksmithConfig, CliError> {
        let loader = ConfigLoader::new(&self.root);
        let config = match &self.config {
            Some(path) => loader.load_file(path)?,
            None => loader.load()?,
        };
        debug!(root = %self.root.display(), "configuration loaded");
        Ok(config)
    }

    /// Execute the selected command
    pub fn execute(self, config: TasksmithConfig) -> Result<(), CliError> {
        let ctx = CommandContext {
            config,
            root: self.root,
            format: self.format,
            verbose: self.verbose,
        };

        match self.command {
            Command::Extract(cmd) => cmd.execute(&ctx),
            Command::Enhance(cmd) => cmd.execute(&ctx),
            Command::Normalize(cmd) => cmd.execute(&ctx),
            Command::Run(cmd) => cmd.execute(&ctx),
            Command::Completions(cmd) => cmd.execute(&ctx),
        }
    }
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, _ctx: &CommandContext) -> Result<(), CliError> {
        use clap::CommandFactory;
        use clap_complete::generate;
        use std::io;

        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(self.shell, &mut cmd, name, &mut io::stdout());
        Ok(())
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: TasksmithConfig,
    pub root: PathBuf,
    pub format: OutputFormat,
    pub verbose: u8,
}

impl CommandContext {
    /// Resolve a project-relative path against the root. Absolute paths
    /// are returned as given.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// The outline path, either `overridden` or the configured one.
    pub fn outline_path(&self, overridden: Option<&Path>) -> PathBuf {
        self.resolve(overridden.unwrap_or(&self.config.paths.outline))
    }

    /// The task document directory, either `overridden` or the configured one.
    pub fn tasks_dir(&self, overridden: Option<&Path>) -> PathBuf {
        self.resolve(overridden.unwrap_or(&self.config.paths.tasks_dir))
    }

    pub fn read_outline(&self, path: &Path) -> Result<String, CliError> {
        std::fs::read_to_string(path)
            .map_err(|e| CliError::io_with_path("Failed to read outline", e, path))
    }

    /// A renderer with any configured template overrides registered.
    pub fn renderer(&self) -> Result<TaskRenderer, CliError> {
        let mut renderer = TaskRenderer::new(&self.config)?;
        if let Some(dir) = &self.config.paths.template_dir {
            let loaded = renderer.load_templates(&self.resolve(dir))?;
            debug!(templates = loaded, "loaded template overrides");
        }
        Ok(renderer)
    }

    /// Placeholder values for checklist text, matching the renderer's.
    pub fn placeholders(&self) -> Placeholders {
        Placeholders::from_config(&self.config)
    }

    pub fn enhancer(&self) -> Enhancer {
        Enhancer::new(self.placeholders())
    }
}
