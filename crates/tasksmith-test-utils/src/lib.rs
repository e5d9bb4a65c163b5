//! Test utilities for tasksmith crates.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small outline covering two stages, a dangling dependency and a task
/// without any tests.
pub const SAMPLE_OUTLINE: &str = r#"# Execution Order

Tasks are listed in the order they must be executed.

## Stage A — Tooling & Baseline App Health (Prep for all later phases)

1. **[T-001] Install deps**
   - Actions:
     - Run npm install for the workspace
   - Tests:
     - npm test exits cleanly

2. **[T-002] Configure Vitest test runner**
   - Depends on: [T-001]
   - Actions:
     - Add vitest.config.mjs
     - Wire the setup file
   - Tests:
     - Vitest discovers files under test/

## Stage B — Phase 0: Bootstrap the Core App

3. **[T-010] Create restaurant schema**
   - Depends on: [T-002], [T-999]
   - Actions:
     - Define the restaurant schema
     - Export inferred types
     - Add default values
     - Document optional fields
   - Tests:
     - Valid config parses
     - Missing name is rejected

4. **[T-011] Write architecture docs**
   - Depends on: [T-010]
   - Actions:
     - Describe the module layout
"#;

/// Number of task headers in [`SAMPLE_OUTLINE`].
pub const SAMPLE_OUTLINE_TASKS: usize = 4;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("test_file");
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Writes `content` to `relative` under `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(&path, content).expect("Failed to write file");
    path
}

/// Creates a project layout with the sample outline at the default location
/// `plan/phase-1/execution-order.md`.
pub fn sample_project() -> TempDir {
    let dir = temp_dir();
    write_file(dir.path(), "plan/phase-1/execution-order.md", SAMPLE_OUTLINE);
    dir
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
