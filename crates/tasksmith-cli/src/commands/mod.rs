//! Command implementations.

mod enhance;
mod extract;
mod normalize;
mod run;

pub use enhance::EnhanceCommand;
pub use extract::ExtractCommand;
pub use normalize::NormalizeCommand;
pub use run::RunCommand;

use tasksmith_plan::{BatchReport, WriteMode};
use tracing::warn;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, BatchSummary};

fn write_mode(check: bool) -> WriteMode {
    if check {
        WriteMode::Check
    } else {
        WriteMode::Write
    }
}

/// Print the summary of a batch command and turn failures or, in check
/// mode, out-of-date documents into an error.
fn finish(
    ctx: &CommandContext,
    command: &'static str,
    mode: WriteMode,
    report: BatchReport,
) -> Result<(), CliError> {
    let summary = BatchSummary::new(command, mode, &report);
    print_output(ctx, &summary)?;

    if report.has_failures() {
        let count = report.failures.len();
        return Err(CliError::Documents {
            message: format!("{count} document(s) could not be processed"),
            paths: report.failures.into_iter().map(|f| f.path).collect(),
        });
    }

    if mode == WriteMode::Check && report.touched() > 0 {
        for path in summary.touched.iter() {
            warn!(path = %path.display(), "document is out of date");
        }
        return Err(CliError::validation_with_hint(
            format!("{} document(s) are out of date", report.touched()),
            format!("Run `tasksmith {command}` without --check to update them"),
        ));
    }

    Ok(())
}
