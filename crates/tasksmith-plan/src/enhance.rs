//! Task document enhancement.
//!
//! Expands the "Specific Requirements" checklist with keyword-selected
//! requirement groups, adds a generated "Test Cases / User Stories" section
//! and the test-verification checklist. Enhancing twice is a no-op.

use crate::catalog::{self, Placeholders, TestCase, BASE_REQUIREMENTS};
use crate::document::Document;
use crate::normalize::{inject_test_verification, DEFINITION_OF_DONE_HEADING, TEST_CASES_HEADING};
use crate::outline::TaskRecord;

pub const SPECIFIC_REQUIREMENTS_HEADING: &str = "Specific Requirements";

/// Adds requirement and test case detail to rendered task documents.
#[derive(Debug, Clone)]
pub struct Enhancer {
    placeholders: Placeholders,
}

impl Enhancer {
    pub fn new(placeholders: Placeholders) -> Self {
        Self { placeholders }
    }

    /// Enhance the document rendered for `record`.
    pub fn enhance(&self, text: &str, record: &TaskRecord) -> String {
        let mut doc = Document::parse(text);

        if let Some(index) = doc.find(3, SPECIFIC_REQUIREMENTS_HEADING) {
            doc.sections[index].body = self.requirements_body(&record.title);
        }

        if doc.find(2, TEST_CASES_HEADING).is_none() {
            if let Some(dod) = doc.find(2, DEFINITION_OF_DONE_HEADING) {
                let generated = self.test_cases_section(record);
                doc.insert(dod, Document::sections_of(&generated));
            }
        }

        inject_test_verification(&doc.to_string(), &self.placeholders)
    }

    /// Body of "Specific Requirements": the base items followed by every
    /// requirement group selected by `title`.
    pub fn requirements_body(&self, title: &str) -> String {
        let mut lines = self.placeholders.checklist(BASE_REQUIREMENTS);
        for group in catalog::requirement_groups(title) {
            lines.push(format!("- [ ] **{}**:", group.title));
            lines.extend(
                group
                    .items
                    .iter()
                    .map(|item| format!("  - [ ] {}", self.placeholders.fill(item))),
            );
        }
        format!("\n{}\n\n", lines.join("\n"))
    }

    /// The generated "Test Cases / User Stories" section.
    pub fn test_cases_section(&self, record: &TaskRecord) -> String {
        let cases = catalog::test_cases(&record.title, &record.tests, &self.placeholders);

        let mut section = format!(
            "## {TEST_CASES_HEADING}\n\n\
             The following test cases must be implemented and passing for this task to be considered complete:\n\n"
        );
        for (i, case) in cases.iter().enumerate() {
            section.push_str(&render_test_case(i + 1, case));
        }
        section
    }
}

fn render_test_case(number: usize, case: &TestCase) -> String {
    format!(
        "### Test Case {number}: {description}\n\n\
         **Type**: {kind}\n\n\
         **Acceptance Criteria**: {acceptance}\n\n\
         **User Story**: As a developer, I want {want} so that {so_that}.\n\n\
         ---\n\n",
        description = case.description,
        kind = case.kind,
        acceptance = case.acceptance,
        want = case.description.to_lowercase(),
        so_that = case.acceptance.to_lowercase().trim_end_matches('.'),
    )
}
