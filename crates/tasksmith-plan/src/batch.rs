//! Directory-level operations: render, enhance and normalize every task
//! document in a directory.
//!
//! Files are only rewritten when their content changes. In
//! [`WriteMode::Check`] nothing is written and the report lists what would
//! change. Read and write failures of single documents are recorded in the
//! report; outline and template errors abort the whole run.

use std::io;
use std::path::{Path, PathBuf};

use glob::glob;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::enhance::Enhancer;
use crate::normalize::Normalizer;
use crate::outline::{OutlineError, OutlineParser, TaskRecord};
use crate::rendering::{RenderError, TaskRenderer};

/// Whether documents are written or only compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Write,
    Check,
}

/// What happened (or would happen) to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutcome {
    Created,
    Changed,
    Unchanged,
}

/// A document that could not be read or written.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of one directory operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub created: Vec<PathBuf>,
    pub changed: Vec<PathBuf>,
    pub unchanged: usize,
    /// Documents with no matching task record
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Created => self.created.push(path),
            FileOutcome::Changed => self.changed.push(path),
            FileOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn fail(&mut self, path: PathBuf, err: &dyn std::fmt::Display) {
        error!(path = %path.display(), "{err}");
        self.failures.push(FileFailure {
            path,
            message: err.to_string(),
        });
    }

    /// Number of documents created or changed.
    pub fn touched(&self) -> usize {
        self.created.len() + self.changed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: BatchReport) {
        self.created.extend(other.created);
        self.changed.extend(other.changed);
        self.unchanged += other.unchanged;
        self.skipped.extend(other.skipped);
        self.failures.extend(other.failures);
    }
}

/// Errors that abort a batch operation.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("malformed outline: {0}")]
    Outline(#[from] OutlineError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid document pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Write `text` to `path` unless the file already holds exactly `text`.
pub fn write_if_changed(path: &Path, text: &str, mode: WriteMode) -> io::Result<FileOutcome> {
    let outcome = match std::fs::read(path) {
        Ok(current) if current == text.as_bytes() => FileOutcome::Unchanged,
        Ok(_) => FileOutcome::Changed,
        Err(e) if e.kind() == io::ErrorKind::NotFound => FileOutcome::Created,
        Err(e) => return Err(e),
    };

    if outcome != FileOutcome::Unchanged && mode == WriteMode::Write {
        std::fs::write(path, text)?;
        info!(path = %path.display(), ?outcome, "wrote document");
    }
    Ok(outcome)
}

/// Markdown documents directly inside `dir`, sorted by path. A missing
/// directory has no documents.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let pattern = glob::Pattern::escape(&dir.to_string_lossy()) + "/*.md";
    debug!(%pattern, "discovering documents");

    let mut paths: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn ensure_dir(dir: &Path, mode: WriteMode) -> Result<(), BatchError> {
    if mode == WriteMode::Write {
        std::fs::create_dir_all(dir).map_err(|source| BatchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Parse the outline and render one document per task into `dir`.
pub fn extract_to_dir(
    outline: &str,
    renderer: &TaskRenderer,
    dir: &Path,
    mode: WriteMode,
) -> Result<BatchReport, BatchError> {
    let records = OutlineParser::new().parse(outline)?;
    info!(tasks = records.len(), dir = %dir.display(), "extracting tasks");
    ensure_dir(dir, mode)?;

    let mut report = BatchReport::default();
    for record in &records {
        let text = renderer.render(record, &records)?;
        let path = dir.join(renderer.file_name(record));
        match write_if_changed(&path, &text, mode) {
            Ok(outcome) => report.record(path, outcome),
            Err(e) => report.fail(path, &e),
        }
    }
    Ok(report)
}

/// Record whose ordinal matches the numeric file stem of `path`.
fn record_for<'a>(path: &Path, records: &'a [TaskRecord]) -> Option<&'a TaskRecord> {
    let ordinal: u32 = path.file_stem()?.to_str()?.parse().ok()?;
    records.iter().find(|r| r.ordinal == ordinal)
}

/// Enhance every document in `dir` that maps to a task record.
pub fn enhance_dir(
    dir: &Path,
    records: &[TaskRecord],
    enhancer: &Enhancer,
    mode: WriteMode,
) -> Result<BatchReport, BatchError> {
    let mut report = BatchReport::default();

    for path in discover_documents(dir)? {
        let Some(record) = record_for(&path, records) else {
            warn!(path = %path.display(), "no task record for document, skipping");
            report.skipped.push(path);
            continue;
        };

        let current = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                report.fail(path, &e);
                continue;
            }
        };

        debug!(path = %path.display(), task = %record.id, "enhancing");
        let text = enhancer.enhance(&current, record);
        match write_if_changed(&path, &text, mode) {
            Ok(outcome) => report.record(path, outcome),
            Err(e) => report.fail(path, &e),
        }
    }

    Ok(report)
}

/// Normalize every document in `dir`.
pub fn normalize_dir(
    dir: &Path,
    normalizer: &Normalizer,
    mode: WriteMode,
) -> Result<BatchReport, BatchError> {
    let mut report = BatchReport::default();

    for path in discover_documents(dir)? {
        let current = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                report.fail(path, &e);
                continue;
            }
        };

        debug!(path = %path.display(), "normalizing");
        let text = normalizer.normalize(&current);
        match write_if_changed(&path, &text, mode) {
            Ok(outcome) => report.record(path, outcome),
            Err(e) => report.fail(path, &e),
        }
    }

    Ok(report)
}

/// Extract, enhance and normalize in one go.
///
/// Each task document is computed in memory as
/// `normalize(enhance(render(record)))` and written once, so a second run
/// over an up-to-date directory changes nothing. Other documents in `dir`
/// are normalized.
pub fn run_pipeline(
    outline: &str,
    renderer: &TaskRenderer,
    enhancer: &Enhancer,
    normalizer: &Normalizer,
    dir: &Path,
    mode: WriteMode,
) -> Result<BatchReport, BatchError> {
    let records = OutlineParser::new().parse(outline)?;
    info!(tasks = records.len(), dir = %dir.display(), "running pipeline");
    ensure_dir(dir, mode)?;

    let mut report = BatchReport::default();
    let mut generated = Vec::with_capacity(records.len());

    for record in &records {
        let rendered = renderer.render(record, &records)?;
        let text = normalizer.normalize(&enhancer.enhance(&rendered, record));
        let path = dir.join(renderer.file_name(record));
        match write_if_changed(&path, &text, mode) {
            Ok(outcome) => report.record(path.clone(), outcome),
            Err(e) => report.fail(path.clone(), &e),
        }
        generated.push(path);
    }

    for path in discover_documents(dir)? {
        if generated.contains(&path) {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(current) => {
                let text = normalizer.normalize(&current);
                match write_if_changed(&path, &text, mode) {
                    Ok(outcome) => report.record(path, outcome),
                    Err(e) => report.fail(path, &e),
                }
            }
            Err(e) => report.fail(path, &e),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Placeholders;
    use tasksmith_common_config::TasksmithConfig;
    use tasksmith_test_utils::{temp_dir, write_file, SAMPLE_OUTLINE, SAMPLE_OUTLINE_TASKS};

    fn renderer() -> TaskRenderer {
        TaskRenderer::new(&TasksmithConfig::default()).unwrap()
    }

    #[test]
    fn test_write_if_changed_outcomes() {
        let dir = temp_dir();
        let path = dir.path().join("a.md");

        assert_eq!(write_if_changed(&path, "x", WriteMode::Check).unwrap(), FileOutcome::Created);
        assert!(!path.exists());

        assert_eq!(write_if_changed(&path, "x", WriteMode::Write).unwrap(), FileOutcome::Created);
        assert_eq!(write_if_changed(&path, "x", WriteMode::Write).unwrap(), FileOutcome::Unchanged);
        assert_eq!(write_if_changed(&path, "y", WriteMode::Check).unwrap(), FileOutcome::Changed);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn test_extract_overwrites_undecodable_document() {
        let dir = temp_dir();
        std::fs::write(dir.path().join("001.md"), [0xff, 0xfe, 0x00]).unwrap();

        let report = extract_to_dir(SAMPLE_OUTLINE, &renderer(), dir.path(), WriteMode::Write).unwrap();

        assert!(!report.has_failures());
        assert_eq!(report.changed, vec![dir.path().join("001.md")]);
        let text = std::fs::read_to_string(dir.path().join("001.md")).unwrap();
        assert!(text.starts_with("# TASK-001: Install deps"));
    }

    #[test]
    fn test_discover_sorted_markdown_only() {
        let dir = temp_dir();
        write_file(dir.path(), "010.md", "");
        write_file(dir.path(), "002.md", "");
        write_file(dir.path(), "notes.txt", "");
        write_file(dir.path(), "nested/003.md", "");

        let names: Vec<_> = discover_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["002.md", "010.md"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = temp_dir();
        assert!(discover_documents(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_extract_creates_then_unchanged() {
        let dir = temp_dir();
        let out = dir.path().join("tasks");

        let first = extract_to_dir(SAMPLE_OUTLINE, &renderer(), &out, WriteMode::Write).unwrap();
        assert_eq!(first.created.len(), SAMPLE_OUTLINE_TASKS);
        assert!(out.join("004.md").is_file());

        let second = extract_to_dir(SAMPLE_OUTLINE, &renderer(), &out, WriteMode::Write).unwrap();
        assert_eq!(second.touched(), 0);
        assert_eq!(second.unchanged, SAMPLE_OUTLINE_TASKS);
    }

    #[test]
    fn test_extract_check_mode_writes_nothing() {
        let dir = temp_dir();
        let out = dir.path().join("tasks");
        let report = extract_to_dir(SAMPLE_OUTLINE, &renderer(), &out, WriteMode::Check).unwrap();
        assert_eq!(report.created.len(), SAMPLE_OUTLINE_TASKS);
        assert!(!out.exists());
    }

    #[test]
    fn test_extract_rejects_malformed_outline() {
        let dir = temp_dir();
        let err = extract_to_dir(
            "1. **[T-001] A**\n1. **[T-002] B**\n",
            &renderer(),
            dir.path(),
            WriteMode::Write,
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::Outline(_)));
        assert!(discover_documents(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_enhance_skips_unknown_documents() {
        let dir = temp_dir();
        extract_to_dir(SAMPLE_OUTLINE, &renderer(), dir.path(), WriteMode::Write).unwrap();
        write_file(dir.path(), "README.md", "# Tasks\n");
        write_file(dir.path(), "099.md", "# Orphan\n");

        let records = OutlineParser::new().parse(SAMPLE_OUTLINE).unwrap();
        let enhancer = Enhancer::new(Placeholders::default());
        let report = enhance_dir(dir.path(), &records, &enhancer, WriteMode::Write).unwrap();

        assert_eq!(report.changed.len(), SAMPLE_OUTLINE_TASKS);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("099.md")).unwrap(),
            "# Orphan\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_document_is_recorded() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir();
        let bad = write_file(dir.path(), "001.md", "## Definition of Done\n");
        write_file(dir.path(), "002.md", "# fine\n");
        std::fs::set_permissions(&bad, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read_to_string(&bad).is_ok() {
            // running as root, permissions are not enforced
            return;
        }

        let normalizer = Normalizer::new(Placeholders::default());
        let report = normalize_dir(dir.path(), &normalizer, WriteMode::Write).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, bad);
        assert_eq!(report.unchanged, 1);
    }

    #[test]
    fn test_pipeline_second_run_is_noop() {
        let dir = temp_dir();
        write_file(dir.path(), "notes.md", "a\n\n\n\n\nb\n");
        let enhancer = Enhancer::new(Placeholders::default());
        let normalizer = Normalizer::new(Placeholders::default());

        let first = run_pipeline(
            SAMPLE_OUTLINE,
            &renderer(),
            &enhancer,
            &normalizer,
            dir.path(),
            WriteMode::Write,
        )
        .unwrap();
        assert_eq!(first.created.len(), SAMPLE_OUTLINE_TASKS);
        assert_eq!(first.changed.len(), 1);

        let second = run_pipeline(
            SAMPLE_OUTLINE,
            &renderer(),
            &enhancer,
            &normalizer,
            dir.path(),
            WriteMode::Check,
        )
        .unwrap();
        assert_eq!(second.touched(), 0);
        assert_eq!(second.unchanged, SAMPLE_OUTLINE_TASKS + 1);
    }

    #[test]
    fn test_report_merge() {
        let mut a = BatchReport::default();
        a.record(PathBuf::from("1.md"), FileOutcome::Created);
        let mut b = BatchReport::default();
        b.record(PathBuf::from("2.md"), FileOutcome::Unchanged);
        b.fail(PathBuf::from("3.md"), &"boom");
        a.merge(b);

        assert_eq!(a.touched(), 1);
        assert_eq!(a.unchanged, 1);
        assert!(a.has_failures());
    }
}
