//! Run command implementation.

use clap::Parser;
use tasksmith_plan::{run_pipeline, Normalizer};
use tracing::info;

use super::{finish, write_mode};
use crate::cli::CommandContext;
use crate::error::CliError;

/// Extract, enhance and normalize in one go
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Report what would change without writing
    #[arg(long)]
    pub check: bool,
}

impl RunCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let outline_path = ctx.outline_path(None);
        let dir = ctx.tasks_dir(None);
        info!(outline = %outline_path.display(), dir = %dir.display(), "run");

        let outline = ctx.read_outline(&outline_path)?;
        let mode = write_mode(self.check);
        let report = run_pipeline(
            &outline,
            &ctx.renderer()?,
            &ctx.enhancer(),
            &Normalizer::new(ctx.placeholders()),
            &dir,
            mode,
        )?;

        finish(ctx, "run", mode, report)
    }
}
