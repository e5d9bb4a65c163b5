//! Enhance command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use tasksmith_plan::{enhance_dir, OutlineParser};
use tracing::info;

use super::{finish, write_mode};
use crate::cli::CommandContext;
use crate::error::CliError;

/// Add requirements, test cases and verification steps to task documents
#[derive(Debug, Parser)]
pub struct EnhanceCommand {
    /// Outline the documents were extracted from
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub outline: Option<PathBuf>,

    /// Directory holding the task documents
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long)]
    pub check: bool,
}

impl EnhanceCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let outline_path = ctx.outline_path(self.outline.as_deref());
        let dir = ctx.tasks_dir(self.dir.as_deref());
        info!(outline = %outline_path.display(), dir = %dir.display(), "enhance");

        if !dir.is_dir() {
            return Err(CliError::user_with_hint(
                format!("Task directory not found: {}", dir.display()),
                "Run `tasksmith extract` first or pass --dir",
            ));
        }

        let records = OutlineParser::new().parse(&ctx.read_outline(&outline_path)?)?;
        let mode = write_mode(self.check);
        let report = enhance_dir(&dir, &records, &ctx.enhancer(), mode)?;

        finish(ctx, "enhance", mode, report)
    }
}
