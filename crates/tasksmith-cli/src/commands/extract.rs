//! Extract command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use tasksmith_plan::extract_to_dir;
use tracing::info;

use super::{finish, write_mode};
use crate::cli::CommandContext;
use crate::error::CliError;

/// Render one task document per outline entry
#[derive(Debug, Parser)]
pub struct ExtractCommand {
    /// Outline to read instead of the configured one
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub outline: Option<PathBuf>,

    /// Directory to write task documents to
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long)]
    pub check: bool,
}

impl ExtractCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let outline_path = ctx.outline_path(self.outline.as_deref());
        let out = ctx.tasks_dir(self.out.as_deref());
        info!(outline = %outline_path.display(), out = %out.display(), "extract");

        let outline = ctx.read_outline(&outline_path)?;
        let mode = write_mode(self.check);
        let report = extract_to_dir(&outline, &ctx.renderer()?, &out, mode)?;

        finish(ctx, "extract", mode, report)
    }
}
