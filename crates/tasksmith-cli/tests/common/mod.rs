//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tasksmith_test_utils::{sample_project, write_file};
use tempfile::TempDir;

/// Test context with a temporary project holding the sample outline
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: sample_project(),
        }
    }

    /// Write `.tasksmith/config.yaml`
    pub fn with_config(self, config: &str) -> Self {
        write_file(self.path(), ".tasksmith/config.yaml", config);
        self
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Default task document directory
    pub fn tasks_dir(&self) -> PathBuf {
        self.path().join("plan/phase-1/tasks")
    }

    pub fn read_task(&self, name: &str) -> String {
        std::fs::read_to_string(self.tasks_dir().join(name)).expect("Failed to read task")
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tasksmith").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("TASKSMITH_CONFIG")
            .env_remove("TASKSMITH_LOG_LEVEL")
            .env_remove("TASKSMITH_LOG_FILE")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert helpers for CLI output
pub trait OutputAssertions {
    fn assert_success(&self);
    fn assert_stdout_contains(&self, text: &str);
    fn assert_stderr_contains(&self, text: &str);
    fn assert_exit_code(&self, code: i32);
}

impl OutputAssertions for Output {
    fn assert_success(&self) {
        assert!(
            self.status.success(),
            "Command failed with status: {}\nstderr: {}",
            self.status,
            String::from_utf8_lossy(&self.stderr)
        );
    }

    fn assert_stdout_contains(&self, text: &str) {
        let stdout = String::from_utf8_lossy(&self.stdout);
        assert!(
            stdout.contains(text),
            "stdout did not contain '{}'\nstdout: {}",
            text,
            stdout
        );
    }

    fn assert_stderr_contains(&self, text: &str) {
        let stderr = String::from_utf8_lossy(&self.stderr);
        assert!(
            stderr.contains(text),
            "stderr did not contain '{}'\nstderr: {}",
            text,
            stderr
        );
    }

    fn assert_exit_code(&self, code: i32) {
        assert_eq!(
            self.status.code(),
            Some(code),
            "Expected exit code {}, got {:?}\nstderr: {}",
            code,
            self.status.code(),
            String::from_utf8_lossy(&self.stderr)
        );
    }
}

/// JSON output helpers
pub mod json {
    use serde_json::Value;

    pub fn parse_output(output: &[u8]) -> Value {
        serde_json::from_slice(output).expect("Failed to parse JSON output")
    }
}
