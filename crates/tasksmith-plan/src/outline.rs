//! Outline document parsing.
//!
//! The outline lists every task in execution order, grouped under
//! `## Stage ...` headings:
//!
//! ```text
//! ## Stage A — Tooling & Baseline App Health
//!
//! 1. **[T-001] Install deps**
//!    - Depends on: [T-000]
//!    - Actions:
//!      - Run npm install
//!    - Tests:
//!      - npm test exits cleanly
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// One task parsed from the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Position in execution order
    pub ordinal: u32,
    /// External identifier, `T-<digits>`
    pub id: String,
    pub title: String,
    /// Enclosing stage heading, without the leading `## `
    pub stage: Option<String>,
    /// Ids this task depends on, kept even when they name no task
    pub depends_on: Vec<String>,
    pub actions: Vec<String>,
    pub tests: Vec<String>,
}

impl TaskRecord {
    /// Ordinal zero-padded to `width` digits.
    pub fn padded_ordinal(&self, width: usize) -> String {
        format!("{:0width$}", self.ordinal, width = width)
    }

    /// File name of the rendered document.
    pub fn file_name(&self, width: usize) -> String {
        format!("{}.md", self.padded_ordinal(width))
    }
}

/// Outline parse errors. Any of these rejects the whole outline.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("line {line}: task id {id} already used on line {first_line}")]
    DuplicateId {
        id: String,
        line: usize,
        first_line: usize,
    },

    #[error("line {line}: ordinal {ordinal} does not follow {previous}")]
    OrdinalOutOfOrder {
        ordinal: u32,
        previous: u32,
        line: usize,
    },

    #[error("line {line}: invalid ordinal '{value}'")]
    InvalidOrdinal { value: String, line: usize },
}

static STAGE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s+(Stage\b.*\S)\s*$").expect("stage header regex"));
static RECORD_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.\s+\*\*\[(T-\d+)\]\s+(.+?)\*\*").expect("record header regex")
});
static DEPENDENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(T-\d+)\]").expect("dependency regex"));

/// Which list the current record is collecting into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Collect {
    #[default]
    Nothing,
    Actions,
    Tests,
}

/// Parser state threaded through the line fold.
#[derive(Debug, Default)]
struct ParseState {
    stage: Option<String>,
    open: Option<TaskRecord>,
    collect: Collect,
    emitted: Vec<TaskRecord>,
    /// id -> line it was declared on
    seen_ids: HashMap<String, usize>,
    last_ordinal: Option<u32>,
}

impl ParseState {
    fn close(&mut self) {
        if let Some(record) = self.open.take() {
            debug!(id = %record.id, ordinal = record.ordinal, "parsed task");
            self.emitted.push(record);
        }
        self.collect = Collect::Nothing;
    }

    fn finish(mut self) -> Vec<TaskRecord> {
        self.close();
        self.emitted
    }
}

/// Outline document parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineParser;

impl OutlineParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the outline into task records in document order.
    pub fn parse(&self, content: &str) -> Result<Vec<TaskRecord>, OutlineError> {
        let state = content
            .lines()
            .enumerate()
            .try_fold(ParseState::default(), |state, (idx, line)| {
                self.parse_line(state, line, idx + 1)
            })?;

        let records = state.finish();
        for (record, missing) in unresolved_dependencies(&records) {
            warn!(task = %record.id, dependency = missing, "dependency names no task in the outline");
        }
        Ok(records)
    }

    fn parse_line(
        &self,
        mut state: ParseState,
        line: &str,
        line_num: usize,
    ) -> Result<ParseState, OutlineError> {
        if let Some(caps) = STAGE_HEADER.captures(line) {
            state.stage = Some(caps[1].to_string());
            return Ok(state);
        }

        if let Some(caps) = RECORD_HEADER.captures(line) {
            let record = self.open_record(&mut state, &caps, line_num)?;
            state.close();
            state.open = Some(record);
            return Ok(state);
        }

        let Some(record) = state.open.as_mut() else {
            return Ok(state);
        };

        if line.contains("Depends on:") {
            record.depends_on = DEPENDENCY
                .captures_iter(line)
                .map(|c| c[1].to_string())
                .collect();
            return Ok(state);
        }

        if line.contains("Actions:") {
            state.collect = Collect::Actions;
            return Ok(state);
        }

        if line.contains("Tests:") {
            state.collect = Collect::Tests;
            return Ok(state);
        }

        if let Some(item) = line.trim().strip_prefix("- ") {
            let item = item.trim();
            if item.is_empty() {
                return Ok(state);
            }
            match state.collect {
                Collect::Actions if !item.starts_with("Depends on") => {
                    record.actions.push(item.to_string())
                }
                Collect::Tests => record.tests.push(item.to_string()),
                _ => {}
            }
        }

        Ok(state)
    }

    /// Validate a record header and build the new record.
    fn open_record(
        &self,
        state: &mut ParseState,
        caps: &regex::Captures<'_>,
        line_num: usize,
    ) -> Result<TaskRecord, OutlineError> {
        let ordinal: u32 = caps[1]
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| OutlineError::InvalidOrdinal {
                value: caps[1].to_string(),
                line: line_num,
            })?;

        if let Some(previous) = state.last_ordinal {
            if ordinal <= previous {
                return Err(OutlineError::OrdinalOutOfOrder {
                    ordinal,
                    previous,
                    line: line_num,
                });
            }
        }

        let id = caps[2].to_string();
        if let Some(&first_line) = state.seen_ids.get(&id) {
            return Err(OutlineError::DuplicateId {
                id,
                line: line_num,
                first_line,
            });
        }

        state.seen_ids.insert(id.clone(), line_num);
        state.last_ordinal = Some(ordinal);

        Ok(TaskRecord {
            ordinal,
            id,
            title: caps[3].trim().to_string(),
            stage: state.stage.clone(),
            depends_on: Vec::new(),
            actions: Vec::new(),
            tests: Vec::new(),
        })
    }
}

/// Dependencies that name no record, as `(record, missing id)` pairs.
pub fn unresolved_dependencies(records: &[TaskRecord]) -> Vec<(&TaskRecord, &str)> {
    records
        .iter()
        .flat_map(|record| {
            record
                .depends_on
                .iter()
                .filter(|dep| !records.iter().any(|r| &r.id == *dep))
                .map(move |dep| (record, dep.as_str()))
        })
        .collect()
}
