//! Task document rendering.

use std::io;
use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::catalog::{Placeholders, BASE_REQUIREMENTS, TESTING_CHECKLIST};
use crate::classify::classify;
use crate::outline::TaskRecord;
use tasksmith_common_config::{RenderConfig, StagesConfig, TasksmithConfig};

/// Built-in task document template.
pub const TASK_TEMPLATE: &str = include_str!("../templates/task.hbs");

/// Values available to the task template. Multi-line blocks are joined
/// ahead of time so templates only need plain substitutions.
#[derive(Debug, Clone, Serialize)]
pub struct TaskContext {
    pub padded: String,
    pub ordinal: u32,
    pub id: String,
    pub title: String,
    /// Section marker of the stage, `?` when unknown
    pub section: String,
    pub stage_label: String,
    pub description: String,
    pub reference_implementation: String,
    pub outline: String,
    /// `[T-001], [T-002]`, or `None`
    pub dependencies: String,
    pub execution_timing: String,
    pub independence: String,
    pub implementation_steps: String,
    pub specific_requirements: String,
    pub testing: String,
    pub previous: String,
    pub next: String,
    /// Dependency list under "Related Tasks", empty when there are none
    pub related_dependencies: String,
    pub category_label: String,
    pub closing: String,
}

/// Renders one markdown document per task record.
pub struct TaskRenderer {
    handlebars: Handlebars<'static>,
    stages: StagesConfig,
    render: RenderConfig,
    placeholders: Placeholders,
}

impl TaskRenderer {
    /// Name the task template is registered under.
    pub const TEMPLATE_NAME: &'static str = "task";

    /// Create a renderer with the built-in template.
    pub fn new(config: &TasksmithConfig) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(Self::TEMPLATE_NAME, TASK_TEMPLATE)?;

        Ok(Self {
            handlebars,
            stages: config.stages.clone(),
            render: config.render.clone(),
            placeholders: Placeholders::from_config(config),
        })
    }

    /// Register every `.hbs` file in `dir` under its file stem. A `task.hbs`
    /// replaces the built-in template. Returns the number of templates loaded.
    pub fn load_templates(&mut self, dir: &Path) -> Result<usize, RenderError> {
        if !dir.is_dir() {
            return Err(RenderError::InvalidTemplate(format!(
                "template directory not found: {}",
                dir.display()
            )));
        }

        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "hbs").unwrap_or(false) {
                let name = path
                    .file_stem()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| RenderError::InvalidTemplate("Invalid filename".into()))?
                    .to_string();

                let content = std::fs::read_to_string(&path)?;
                self.handlebars.register_template_string(&name, content)?;
                debug!(template = %name, path = %path.display(), "loaded template");
                loaded += 1;
            }
        }

        Ok(loaded)
    }

    /// Register a template string under `name`.
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<(), RenderError> {
        self.handlebars.register_template_string(name, template)?;
        Ok(())
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// File name of the document rendered for `record`.
    pub fn file_name(&self, record: &TaskRecord) -> String {
        record.file_name(self.render.ordinal_width)
    }

    /// Render the document for `record`; `all` is the full record list, used
    /// for neighbours and dependency titles.
    pub fn render(&self, record: &TaskRecord, all: &[TaskRecord]) -> Result<String, RenderError> {
        let context = self.context(record, all);
        Ok(self.handlebars.render(Self::TEMPLATE_NAME, &context)?)
    }

    /// Build the template context for `record`.
    pub fn context(&self, record: &TaskRecord, all: &[TaskRecord]) -> TaskContext {
        let width = self.render.ordinal_width;
        let (section, stage_label) = self.stage_info(record.stage.as_deref());
        let category = classify(&record.title);
        let p = &self.placeholders;

        let position = all.iter().position(|r| r.id == record.id);
        let neighbour = |r: Option<&TaskRecord>| match r {
            Some(r) => format!("TASK-{} ({})", r.padded_ordinal(width), r.id),
            None => "None".to_string(),
        };
        let previous = position
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| all.get(i));
        let next = position.and_then(|i| all.get(i + 1));

        let dependencies = if record.depends_on.is_empty() {
            "None".to_string()
        } else {
            record
                .depends_on
                .iter()
                .map(|d| format!("[{d}]"))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let related_dependencies = if record.depends_on.is_empty() {
            String::new()
        } else {
            let mut block = "- Dependencies:\n".to_string();
            for dep in &record.depends_on {
                match all.iter().find(|r| &r.id == dep) {
                    Some(found) => block.push_str(&format!("  - {dep}: {}\n", found.title)),
                    None => block.push_str(&format!("  - {dep}\n")),
                }
            }
            block
        };

        let implementation_steps = if record.actions.is_empty() {
            p.checklist(&["Implement the required functionality as specified in {outline}"])
        } else {
            record
                .actions
                .iter()
                .enumerate()
                .map(|(i, action)| format!("- [ ] Step {}: {action}", i + 1))
                .collect()
        };

        let mut testing: Vec<String> = if record.tests.is_empty() {
            vec!["- [ ] Write appropriate tests if required".to_string()]
        } else {
            record.tests.iter().map(|t| format!("- [ ] {t}")).collect()
        };
        testing.extend(p.checklist(TESTING_CHECKLIST));

        TaskContext {
            padded: record.padded_ordinal(width),
            ordinal: record.ordinal,
            id: record.id.clone(),
            title: record.title.clone(),
            description: self.description(record, &stage_label),
            section,
            stage_label,
            reference_implementation: self.render.reference_implementation.clone(),
            outline: p.outline.clone(),
            execution_timing: if record.depends_on.is_empty() {
                "None (can start immediately)".to_string()
            } else {
                dependencies.clone()
            },
            independence: if record.depends_on.is_empty() {
                "Can be completed independently".to_string()
            } else {
                "Requires dependencies to be completed first".to_string()
            },
            dependencies,
            implementation_steps: implementation_steps.join("\n"),
            specific_requirements: p.checklist(BASE_REQUIREMENTS).join("\n"),
            testing: testing.join("\n"),
            previous: neighbour(previous),
            next: neighbour(next),
            related_dependencies,
            category_label: category.label().to_string(),
            closing: category.closing().trim_end().to_string(),
        }
    }

    fn description(&self, record: &TaskRecord, stage_label: &str) -> String {
        let mut description = format!("{}.", record.title.trim_end_matches('.'));
        if !record.actions.is_empty() {
            let shown: Vec<&str> = record.actions.iter().take(3).map(String::as_str).collect();
            description.push_str(" This task involves: ");
            description.push_str(&shown.join("; "));
            if record.actions.len() > 3 {
                description.push_str("; and more");
            }
            description.push('.');
        }
        description.push_str(&format!(
            " This task is part of {stage_label} and contributes to {}.",
            self.render.project_summary
        ));
        description
    }

    /// Section marker and label of a stage.
    fn stage_info(&self, stage: Option<&str>) -> (String, String) {
        let Some(name) = stage else {
            return ("?".to_string(), "Unstaged".to_string());
        };
        match self.stages.iter().find(|s| s.name == name) {
            Some(entry) => (entry.section.clone(), entry.label.clone()),
            None => ("?".to_string(), name.to_string()),
        }
    }
}

/// Render errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),
}
