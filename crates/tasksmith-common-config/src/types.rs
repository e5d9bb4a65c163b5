//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksmithConfig {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Rendered document settings.
    pub render: RenderConfig,
    /// Commands quoted in checklists.
    pub commands: CommandsConfig,
    /// Stage table used to label rendered documents.
    pub stages: StagesConfig,
}

/// Project-relative paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The outline document.
    pub outline: PathBuf,
    /// Directory holding one rendered document per task.
    pub tasks_dir: PathBuf,
    /// Directory with `.hbs` template overrides.
    pub template_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            outline: PathBuf::from("plan/phase-1/execution-order.md"),
            tasks_dir: PathBuf::from("plan/phase-1/tasks"),
            template_dir: None,
        }
    }
}

/// Rendered document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Path quoted as the reference implementation.
    pub reference_implementation: String,
    /// Closing phrase of every description.
    pub project_summary: String,
    /// Zero-padding width of file names and `TASK-` labels.
    pub ordinal_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            reference_implementation: "plan/phase-1/master-plan.md".to_string(),
            project_summary: "building the restaurant platform core application".to_string(),
            ordinal_width: 3,
        }
    }
}

/// Project commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub test: String,
    pub build: String,
    pub lint: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            test: "npm test".to_string(),
            build: "npm run build".to_string(),
            lint: "npm run lint".to_string(),
        }
    }
}

/// One entry of the stage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    /// Exact stage heading text, without the leading `## `.
    pub name: String,
    /// Section marker, usually a single letter.
    pub section: String,
    /// Human-readable label.
    pub label: String,
}

impl StageEntry {
    pub fn new(name: &str, section: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            section: section.to_string(),
            label: label.to_string(),
        }
    }
}

/// Stage table, in outline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagesConfig(pub Vec<StageEntry>);

impl StagesConfig {
    pub fn iter(&self) -> impl Iterator<Item = &StageEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self(vec![
            StageEntry::new(
                "Stage A — Tooling & Baseline App Health (Prep for all later phases)",
                "A",
                "Tooling & Baseline App Health",
            ),
            StageEntry::new(
                "Stage B — Phase 0: Bootstrap the Core App",
                "B",
                "Phase 0: Bootstrap the Core App",
            ),
            StageEntry::new(
                "Stage C — Phase 1: Domain Modeling (Menu & Restaurant Config)",
                "C",
                "Phase 1: Domain Modeling",
            ),
            StageEntry::new(
                "Stage D — Phase 2: Core UI Components (Template Library)",
                "D",
                "Phase 2: Core UI Components",
            ),
            StageEntry::new(
                "Stage E — Phase 3: Routing & Preview Pages",
                "E",
                "Phase 3: Routing & Preview Pages",
            ),
            StageEntry::new("Stage F — Phase 4: Theme System", "F", "Phase 4: Theme System"),
            StageEntry::new(
                "Stage G — Phase 5: AI Menu Ingestion Tooling (Skeleton)",
                "G",
                "Phase 5: AI Menu Ingestion Tooling",
            ),
            StageEntry::new(
                "Stage H — Phase 6: Restaurant Scaffolding & Per-Restaurant Repos",
                "H",
                "Phase 6: Restaurant Scaffolding",
            ),
            StageEntry::new(
                "Stage I — Phase 7: Demo Restaurant Implementations",
                "I",
                "Phase 7: Demo Restaurant Implementations",
            ),
            StageEntry::new(
                "Stage J — Phase 8: Internal Docs for AI Agents & Yourself",
                "J",
                "Phase 8: Internal Documentation",
            ),
        ])
    }
}
