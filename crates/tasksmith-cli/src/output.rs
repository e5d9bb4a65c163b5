//! Output formatting utilities for CLI commands.

use std::path::PathBuf;

use serde::Serialize;
use tasksmith_plan::{BatchReport, FileFailure, WriteMode};

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> String;
    fn format_json(&self) -> Result<String, serde_json::Error>;
}

/// Print formatted output to stdout
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
{
    let output = match ctx.format {
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json().map_err(|e| {
            CliError::Other(anyhow::anyhow!("JSON serialization failed: {}", e))
        })?,
    };

    println!("{}", output);
    Ok(())
}

/// Summary of one batch command.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub command: &'static str,
    pub check: bool,
    pub created: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    /// Documents that were (or would be) created or changed
    pub touched: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn new(command: &'static str, mode: WriteMode, report: &BatchReport) -> Self {
        Self {
            command,
            check: mode == WriteMode::Check,
            created: report.created.len(),
            changed: report.changed.len(),
            unchanged: report.unchanged,
            skipped: report.skipped.len(),
            touched: report
                .created
                .iter()
                .chain(&report.changed)
                .cloned()
                .collect(),
            failures: report.failures.clone(),
        }
    }
}

impl FormattedOutput for BatchSummary {
    fn format_text(&self) -> String {
        let mut line = if self.check {
            format!(
                "{} (check): {} to create, {} to change, {} up to date",
                self.command, self.created, self.changed, self.unchanged
            )
        } else {
            format!(
                "{}: {} created, {} changed, {} unchanged",
                self.command, self.created, self.changed, self.unchanged
            )
        };
        if self.skipped > 0 {
            line.push_str(&format!(", {} skipped", self.skipped));
        }
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} failed", self.failures.len()));
        }
        line
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
