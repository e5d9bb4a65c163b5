//! Normalize command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use tasksmith_plan::{normalize_dir, Normalizer, Pass};
use tracing::info;

use super::{finish, write_mode};
use crate::cli::CommandContext;
use crate::error::CliError;

/// Apply normalization passes to task documents
#[derive(Debug, Parser)]
pub struct NormalizeCommand {
    /// Directory holding the task documents
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Pass to run; repeat to run several. Runs every pass when omitted.
    ///
    /// Passes always run in canonical order: dedupe-tests, reflow-dod,
    /// inject-verification, cleanup.
    #[arg(long = "pass", value_name = "NAME")]
    pub passes: Vec<Pass>,

    /// Report what would change without writing
    #[arg(long)]
    pub check: bool,
}

impl NormalizeCommand {
    pub fn normalizer(&self, ctx: &CommandContext) -> Normalizer {
        if self.passes.is_empty() {
            Normalizer::new(ctx.placeholders())
        } else {
            Normalizer::with_passes(ctx.placeholders(), self.passes.iter().copied())
        }
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let dir = ctx.tasks_dir(self.dir.as_deref());
        let normalizer = self.normalizer(ctx);
        let passes: Vec<_> = normalizer.passes().map(|p| p.name()).collect();
        info!(dir = %dir.display(), passes = ?passes, "normalize");

        if !dir.is_dir() {
            return Err(CliError::user_with_hint(
                format!("Task directory not found: {}", dir.display()),
                "Run `tasksmith extract` first or pass --dir",
            ));
        }

        let mode = write_mode(self.check);
        let report = normalize_dir(&dir, &normalizer, mode)?;

        finish(ctx, "normalize", mode, report)
    }
}
