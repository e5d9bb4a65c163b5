//! Task classification.
//!
//! A task's category is decided by an ordered table of keyword rules
//! evaluated against its lowercased title. The first matching rule wins.

use serde::{Deserialize, Serialize};

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    EnvironmentOperation,
    Testing,
    Documentation,
    Configuration,
    CodeChange,
}

impl TaskCategory {
    /// Label shown in the "Definition of Done" section.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnvironmentOperation => "SYSTEM/ENVIRONMENT OPERATION",
            Self::Testing => "TESTING",
            Self::Documentation => "DOCUMENTATION",
            Self::Configuration => "CONFIGURATION",
            Self::CodeChange => "CODE/FILE WRITING",
        }
    }

    /// The quoted completion statement.
    pub fn statement(&self) -> &'static str {
        match self {
            Self::EnvironmentOperation => {
                "The required operation must complete successfully with no errors, and the \
                 expected artifacts must be created. If any part of the operation fails, the \
                 task is NOT complete."
            }
            Self::Testing => {
                "Tests are written, all tests pass, and test coverage meets project \
                 requirements (if applicable)"
            }
            Self::Documentation => {
                "Documentation files are created or updated with accurate, complete \
                 information and committed to git"
            }
            Self::Configuration => {
                "Configuration is complete, verified to work correctly, and committed to git"
            }
            Self::CodeChange => {
                "A Pull Request was created OR code was pushed to origin with the task complete"
            }
        }
    }

    /// Closing paragraph of the "Definition of Done" section, starting with
    /// the statement line.
    pub fn closing(&self) -> String {
        let statement = format!("**Definition of Done**: \"{}\"\n", self.statement());
        match self {
            Self::EnvironmentOperation => format!(
                "{statement}\n**Important Notes**:\n\
                 - Installing dependencies requires packages to actually be installed successfully\n\
                 - Updating the package manifest is NOT enough\n\
                 - If the output mentions environmental issues, errors, warnings, or failed operations, the task is NOT complete\n"
            ),
            Self::CodeChange => format!(
                "{statement}\n**Examples**:\n\
                 - Creating new source code files\n\
                 - Modifying existing source code files\n\
                 - Implementing features, functions, classes, modules\n\
                 - Writing tests, specs\n\
                 - Refactoring code\n\
                 - Fixing bugs in source code\n"
            ),
            _ => statement,
        }
    }
}

/// Keyword predicate over a lowercased title.
///
/// Matches when any of `any` occurs (or `any` is empty), every entry of
/// `all` occurs and none of `none` occurs.
#[derive(Debug, Clone, Copy)]
pub struct Keywords {
    pub any: &'static [&'static str],
    pub all: &'static [&'static str],
    pub none: &'static [&'static str],
}

impl Keywords {
    pub const ALWAYS: Keywords = Keywords::any(&[]);

    pub const fn any(words: &'static [&'static str]) -> Self {
        Self {
            any: words,
            all: &[],
            none: &[],
        }
    }

    pub const fn all(words: &'static [&'static str]) -> Self {
        Self {
            any: &[],
            all: words,
            none: &[],
        }
    }

    pub const fn excluding(self, words: &'static [&'static str]) -> Self {
        Self {
            none: words,
            ..self
        }
    }

    pub fn matches(&self, lowered: &str) -> bool {
        (self.any.is_empty() || self.any.iter().any(|w| lowered.contains(w)))
            && self.all.iter().all(|w| lowered.contains(w))
            && !self.none.iter().any(|w| lowered.contains(w))
    }
}

/// One classification rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub keywords: Keywords,
    pub category: TaskCategory,
}

/// Classification rules in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        keywords: Keywords::any(&["install", "dependency"]),
        category: TaskCategory::EnvironmentOperation,
    },
    Rule {
        keywords: Keywords::any(&["test"]).excluding(&["write", "add"]),
        category: TaskCategory::Testing,
    },
    Rule {
        keywords: Keywords::any(&["write", "document", "docs"]),
        category: TaskCategory::Documentation,
    },
    Rule {
        keywords: Keywords::any(&["create", "implement", "add"]),
        category: TaskCategory::CodeChange,
    },
    Rule {
        keywords: Keywords::any(&["configure", "setup"]),
        category: TaskCategory::Configuration,
    },
];

/// Classify a task by its title.
pub fn classify(title: &str) -> TaskCategory {
    let lowered = title.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.matches(&lowered))
        .map(|rule| rule.category)
        .unwrap_or(TaskCategory::CodeChange)
}
