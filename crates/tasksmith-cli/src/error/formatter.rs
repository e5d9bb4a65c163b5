//! Error formatting for terminal and JSON output.

use std::error::Error;
use std::fmt::Write as FmtWrite;

use crate::error::CliError;

/// Formats a [`CliError`] for stderr.
#[derive(Debug, Default)]
pub struct ErrorFormatter {
    verbose: bool,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the chain of source errors.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn print(&self, error: &CliError) {
        eprint!("{}", self.format(error));
    }

    pub fn format(&self, error: &CliError) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "error[{}]: {error}", error.code());

        if self.verbose {
            format_source_chain(&mut output, error);
        }

        format_context(&mut output, error);

        if let Some(hint) = error.hint() {
            let _ = writeln!(output, "\nhint: {hint}");
        }

        output
    }

    pub fn format_json(&self, error: &CliError) -> String {
        let json = serde_json::json!({
            "error": {
                "code": error.code(),
                "message": error.to_string(),
                "hint": error.hint(),
            }
        });

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| error.to_string())
    }
}

fn format_source_chain(output: &mut String, error: &CliError) {
    let mut current = error.source();
    if current.is_none() {
        return;
    }

    let _ = writeln!(output, "\ncaused by:");
    let mut depth = 0;
    while let Some(source) = current {
        let _ = writeln!(output, "  {depth}: {source}");
        current = source.source();
        depth += 1;
    }
}

fn format_context(output: &mut String, error: &CliError) {
    match error {
        CliError::Io { path: Some(p), .. } => {
            let _ = writeln!(output, "\n  path: {}", p.display());
        }
        CliError::Documents { paths, .. } => {
            let _ = writeln!(output);
            for path in paths {
                let _ = writeln!(output, "  - {}", path.display());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_format_includes_code_and_hint() {
        let err = CliError::validation_with_hint("2 documents are out of date", "Run without --check");
        let text = ErrorFormatter::new().format(&err);
        assert!(text.starts_with("error[E003]: 2 documents are out of date\n"));
        assert!(text.contains("hint: Run without --check"));
    }

    #[test]
    fn test_verbose_shows_source_chain() {
        let err = CliError::io_with_path(
            "Failed to read outline",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
            "plan/execution-order.md",
        );
        let quiet = ErrorFormatter::new().format(&err);
        assert!(!quiet.contains("caused by"));
        assert!(quiet.contains("path: plan/execution-order.md"));

        let verbose = ErrorFormatter::new().verbose(true).format(&err);
        assert!(verbose.contains("caused by:\n  0: no such file"));
    }

    #[test]
    fn test_document_failures_listed() {
        let err = CliError::Documents {
            message: "1 document failed".into(),
            paths: vec![PathBuf::from("tasks/002.md")],
        };
        assert!(ErrorFormatter::new().format(&err).contains("  - tasks/002.md"));
    }

    #[test]
    fn test_json_shape() {
        let err = CliError::validation("bad");
        let value: serde_json::Value =
            serde_json::from_str(&ErrorFormatter::new().format_json(&err)).unwrap();
        assert_eq!(value["error"]["code"], "E003");
        assert!(value["error"]["hint"].is_null());
    }
}
