//! Fixed checklist text used by the renderer, the enhancer and the
//! normalization passes.
//!
//! Entries may contain the placeholders `{test}`, `{build}`, `{lint}` and
//! `{outline}`, filled in from [`Placeholders`].

use crate::classify::Keywords;
use tasksmith_common_config::{CommandsConfig, TasksmithConfig};

/// Values substituted into catalog text.
#[derive(Debug, Clone)]
pub struct Placeholders {
    pub test: String,
    pub build: String,
    pub lint: String,
    pub outline: String,
}

impl Placeholders {
    pub fn new(commands: &CommandsConfig, outline: impl Into<String>) -> Self {
        Self {
            test: commands.test.clone(),
            build: commands.build.clone(),
            lint: commands.lint.clone(),
            outline: outline.into(),
        }
    }

    /// Commands from `config`; the outline is named by the file name of the
    /// configured outline path.
    pub fn from_config(config: &TasksmithConfig) -> Self {
        let outline = &config.paths.outline;
        let name = outline
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| outline.display().to_string());
        Self::new(&config.commands, name)
    }

    /// Substitute every placeholder in `text`.
    pub fn fill(&self, text: &str) -> String {
        text.replace("{test}", &self.test)
            .replace("{build}", &self.build)
            .replace("{lint}", &self.lint)
            .replace("{outline}", &self.outline)
    }

    /// Fill a list of entries and format them as `- [ ] ` checklist lines.
    pub fn checklist(&self, items: &[&str]) -> Vec<String> {
        items
            .iter()
            .map(|item| format!("- [ ] {}", self.fill(item)))
            .collect()
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::new(&CommandsConfig::default(), "execution-order.md")
    }
}

/// Command lines closing every "Testing" subsection.
pub const TESTING_CHECKLIST: &[&str] = &[
    "Run full test suite: `{test}`",
    "Run type checking: `{build}`",
    "Run linting: `{lint}`",
    "**DO NOT manually test by running the server** - use automated tests instead",
    "Ensure all affected functionality is covered by automated tests",
];

/// Marker of the test-verification checklist.
pub const VERIFICATION_MARKER: &str = "Test Verification Requirements";

/// Items of the test-verification checklist.
pub const VERIFICATION_ITEMS: &[&str] = &[
    "All test cases listed above must be implemented",
    "All test cases must pass (`{test}` completes successfully)",
    "Test coverage must be maintained or improved",
    "No test warnings or errors should be present",
    "All user stories must be validated through passing tests",
];

/// Items every "Specific Requirements" subsection starts with.
pub const BASE_REQUIREMENTS: &[&str] = &[
    "All requirements from {outline} must be met",
    "Code must follow Global Rules.md guidelines",
    "Type safety must be maintained",
    "Error handling must be implemented appropriately",
];

/// A titled group of requirement items selected by title keywords.
#[derive(Debug)]
pub struct RequirementGroup {
    pub title: &'static str,
    pub trigger: Keywords,
    pub items: &'static [&'static str],
}

pub const REQUIREMENT_GROUPS: &[RequirementGroup] = &[
    RequirementGroup {
        title: "Code Quality",
        trigger: Keywords::ALWAYS,
        items: &[
            "All code must follow TypeScript best practices",
            "All code must pass `{lint}` without errors",
            "All code must be properly typed (no `any` types unless absolutely necessary)",
            "All functions must have appropriate JSDoc/TSDoc comments",
        ],
    },
    RequirementGroup {
        title: "Dependency Installation",
        trigger: Keywords::any(&["install", "dependency"]),
        items: &[
            "All packages must be installed successfully in `node_modules`",
            "`package.json` must be updated with correct version ranges",
            "`package-lock.json` must be updated and committed",
            "No peer dependency warnings that would cause runtime issues",
            "All npm scripts must be functional and executable",
        ],
    },
    RequirementGroup {
        title: "Schema Validation",
        trigger: Keywords::any(&["schema", "zod"]),
        items: &[
            "All schemas must properly validate required fields",
            "Optional fields must be handled correctly",
            "Default values must be applied when appropriate",
            "Type inference must work correctly for all schemas",
            "Invalid data must throw descriptive validation errors",
        ],
    },
    RequirementGroup {
        title: "Component Requirements",
        trigger: Keywords::any(&["component", "layout"]),
        items: &[
            "Component must accept all required props with proper TypeScript types",
            "Component must handle optional props gracefully",
            "Component must be accessible (ARIA labels, semantic HTML)",
            "Component must be responsive and work on mobile/tablet/desktop",
            "Component must accept and apply `className` prop for styling flexibility",
        ],
    },
    RequirementGroup {
        title: "Testing Configuration",
        trigger: Keywords::all(&["test", "configure"]),
        items: &[
            "The test runner must be configured for the application framework",
            "Test files must be discoverable in `test/` or `__tests__/` directories",
            "TypeScript must be properly configured for test files",
            "Path aliases (`@/*`) must work in test files",
            "Test setup file must be properly imported",
        ],
    },
    RequirementGroup {
        title: "Data Loading",
        trigger: Keywords::any(&["loader", "load"]),
        items: &[
            "Function must work in Node.js environment (server-side only)",
            "Function must handle file system errors gracefully",
            "Function must validate loaded data against schemas",
            "Function must return properly typed data",
            "Function must handle missing files or directories appropriately",
        ],
    },
    RequirementGroup {
        title: "Route Requirements",
        trigger: Keywords::any(&["route", "page"]),
        items: &[
            "Route must be a server component (async function)",
            "Route must handle dynamic parameters correctly",
            "Route must load and validate data before rendering",
            "Route must handle errors and display appropriate error states",
            "Route must render all required components in correct order",
        ],
    },
    RequirementGroup {
        title: "Theme System",
        trigger: Keywords::any(&["theme"]),
        items: &[
            "Theme provider must correctly select and provide theme",
            "Theme hook must throw error when used outside provider",
            "Theme must fallback to default when invalid theme key provided",
            "Theme classes must be properly applied to components",
            "Theme must support class composition with custom className props",
        ],
    },
    RequirementGroup {
        title: "CLI Script Requirements",
        trigger: Keywords::any(&["script", "cli"]),
        items: &[
            "Script must parse command-line arguments correctly",
            "Script must validate inputs before processing",
            "Script must handle file I/O errors gracefully",
            "Script must provide clear error messages",
            "Script must create directories if they do not exist",
        ],
    },
    RequirementGroup {
        title: "Documentation Requirements",
        trigger: Keywords::any(&["document", "docs"]),
        items: &[
            "Documentation must be clear and comprehensive",
            "Documentation must include code examples where appropriate",
            "Documentation must be properly formatted in Markdown",
            "Documentation must be committed to git",
            "Documentation must follow project documentation standards",
        ],
    },
];

/// A generated test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub kind: String,
    pub description: String,
    pub acceptance: String,
}

/// Test case text before placeholder substitution.
#[derive(Debug)]
pub struct TestCaseTemplate {
    pub kind: &'static str,
    pub description: &'static str,
    pub acceptance: &'static str,
}

impl TestCaseTemplate {
    pub fn instantiate(&self, placeholders: &Placeholders) -> TestCase {
        TestCase {
            kind: self.kind.to_string(),
            description: placeholders.fill(self.description),
            acceptance: placeholders.fill(self.acceptance),
        }
    }
}

/// Test cases selected by title keywords.
#[derive(Debug)]
pub struct TestCaseGroup {
    pub trigger: Keywords,
    pub cases: &'static [TestCaseTemplate],
}

const fn case(
    kind: &'static str,
    description: &'static str,
    acceptance: &'static str,
) -> TestCaseTemplate {
    TestCaseTemplate {
        kind,
        description,
        acceptance,
    }
}

pub const TEST_CASE_GROUPS: &[TestCaseGroup] = &[
    TestCaseGroup {
        trigger: Keywords::ALWAYS,
        cases: &[
            case(
                "Unit Test",
                "Code compiles without TypeScript errors",
                "`{build}` completes successfully with no type errors",
            ),
            case(
                "Lint Test",
                "Code passes lint validation",
                "`{lint}` completes with no errors or warnings",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::any(&["install", "dependency"]),
        cases: &[
            case(
                "Integration Test",
                "All packages are installed and accessible",
                "Can import all installed packages in a test file without errors",
            ),
            case(
                "Functional Test",
                "npm scripts are functional",
                "`{test}` executes without errors",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::any(&["schema", "zod"]),
        cases: &[
            case(
                "Unit Test",
                "Valid data passes schema validation",
                "Schema parsing succeeds with valid input data",
            ),
            case(
                "Unit Test",
                "Invalid data throws validation errors",
                "Schema parsing throws descriptive errors for invalid input",
            ),
            case(
                "Unit Test",
                "Optional fields are handled correctly",
                "Schema accepts data with optional fields missing",
            ),
            case(
                "Unit Test",
                "Default values are applied",
                "Schema applies default values when fields are missing",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::any(&["component", "layout"]),
        cases: &[
            case(
                "Unit Test",
                "Component renders without errors",
                "Component renders successfully with required props",
            ),
            case(
                "Unit Test",
                "Component displays expected content",
                "Component renders expected text, images, or elements based on props",
            ),
            case(
                "Unit Test",
                "Component handles optional props",
                "Component renders correctly when optional props are omitted",
            ),
            case(
                "Accessibility Test",
                "Component is accessible",
                "Component has proper ARIA labels and semantic HTML structure",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::all(&["test", "configure"]),
        cases: &[
            case(
                "Configuration Test",
                "The test runner can discover and run test files",
                "`{test}` finds and executes test files in `test/` directory",
            ),
            case(
                "Integration Test",
                "Test setup file is loaded",
                "Test setup file imports are executed before tests run",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::any(&["loader", "load"]),
        cases: &[
            case(
                "Unit Test",
                "Loader reads and parses data correctly",
                "The loader returns valid config and menu objects",
            ),
            case(
                "Unit Test",
                "Loader validates data against schemas",
                "The loader throws an error if data does not match schemas",
            ),
            case(
                "Error Handling Test",
                "Loader handles missing files",
                "The loader throws a descriptive error when data files are missing",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::any(&["route", "page"]),
        cases: &[
            case(
                "Integration Test",
                "Route renders without errors",
                "Page component renders successfully with mocked data",
            ),
            case(
                "Integration Test",
                "Route displays expected content",
                "Page displays restaurant name, menu items, and other expected content",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::any(&["theme"]),
        cases: &[
            case(
                "Unit Test",
                "Theme provider provides correct theme",
                "The theme hook returns the correct theme object for a given theme key",
            ),
            case(
                "Unit Test",
                "Theme hook throws when used outside provider",
                "The theme hook throws a descriptive error when used outside the provider",
            ),
            case(
                "Unit Test",
                "Theme falls back to default",
                "The provider uses the default theme when an invalid theme key is provided",
            ),
        ],
    },
    TestCaseGroup {
        trigger: Keywords::any(&["script", "cli"]),
        cases: &[
            case(
                "Unit Test",
                "Script processes input correctly",
                "Script reads input file and processes data as expected",
            ),
            case(
                "Unit Test",
                "Script validates output",
                "Script validates generated output against schema before writing",
            ),
            case(
                "Integration Test",
                "Script writes output file",
                "Script creates output file with valid JSON content",
            ),
        ],
    },
];

/// Acceptance criteria of test cases derived from outline test lines.
pub const OUTLINE_TEST_ACCEPTANCE: &str = "Test passes and validates expected behavior";

/// Requirement groups whose trigger matches `title`.
pub fn requirement_groups(title: &str) -> impl Iterator<Item = &'static RequirementGroup> {
    let lowered = title.to_lowercase();
    REQUIREMENT_GROUPS
        .iter()
        .filter(move |group| group.trigger.matches(&lowered))
}

/// Generated test cases for a task: the keyword-selected cases followed by
/// one case per outline test line.
pub fn test_cases(title: &str, tests: &[String], placeholders: &Placeholders) -> Vec<TestCase> {
    let lowered = title.to_lowercase();
    let selected = TEST_CASE_GROUPS
        .iter()
        .filter(|group| group.trigger.matches(&lowered))
        .flat_map(|group| group.cases.iter())
        .map(|template| template.instantiate(placeholders));

    let from_outline = tests
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && !t.starts_with('-'))
        .map(|t| TestCase {
            kind: "Unit Test".to_string(),
            description: t.to_string(),
            acceptance: OUTLINE_TEST_ACCEPTANCE.to_string(),
        });

    selected.chain(from_outline).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_placeholders() {
        let p = Placeholders::new(
            &CommandsConfig {
                test: "cargo test".into(),
                build: "cargo build".into(),
                lint: "cargo clippy".into(),
            },
            "outline.md",
        );
        assert_eq!(
            p.fill("run `{test}`, `{build}`, `{lint}` per {outline}"),
            "run `cargo test`, `cargo build`, `cargo clippy` per outline.md"
        );
    }

    #[test]
    fn test_checklist_lines() {
        let lines = Placeholders::default().checklist(TESTING_CHECKLIST);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "- [ ] Run full test suite: `npm test`");
        assert!(lines[3].contains("DO NOT manually test"));
    }

    #[test]
    fn test_code_quality_always_selected() {
        let titles: Vec<_> = requirement_groups("Refactor hero section")
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, vec!["Code Quality"]);
    }

    #[test]
    fn test_keyword_groups_selected_in_order() {
        let titles: Vec<_> = requirement_groups("Create theme page layout")
            .map(|g| g.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Code Quality",
                "Component Requirements",
                "Route Requirements",
                "Theme System"
            ]
        );
    }

    #[test]
    fn test_test_cases_append_outline_tests() {
        let tests = vec![
            "Valid config parses".to_string(),
            "  ".to_string(),
            "- nested marker".to_string(),
        ];
        let cases = test_cases("Create restaurant schema", &tests, &Placeholders::default());

        // two common, four schema, one from the outline
        assert_eq!(cases.len(), 7);
        assert_eq!(
            cases[0].acceptance,
            "`npm run build` completes successfully with no type errors"
        );
        let last = cases.last().unwrap();
        assert_eq!(last.description, "Valid config parses");
        assert_eq!(last.acceptance, OUTLINE_TEST_ACCEPTANCE);
    }
}
