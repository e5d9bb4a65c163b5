//! Normalization passes over rendered task documents.
//!
//! Each pass is a pure text transform and is idempotent on its own. A
//! document missing the heading a pass looks for is returned unchanged.
//! [`Normalizer`] runs a selection of passes in their canonical order.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::catalog::{Placeholders, TESTING_CHECKLIST, VERIFICATION_ITEMS, VERIFICATION_MARKER};
use crate::document::{Document, Section};

pub const TEST_CASES_HEADING: &str = "Test Cases / User Stories";
pub const DEFINITION_OF_DONE_HEADING: &str = "Definition of Done";
pub const TESTING_HEADING: &str = "Testing";

static STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\*\*Definition of Done\*\*:\s*"([^"]*)"[ \t]*([^\r\n]*)"#)
        .expect("statement regex")
});
static TEST_CASE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Test Case \d+:").expect("test case regex"));
static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t\r]*\n){3,}").expect("blank run regex"));
static DUPLICATE_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^---[ \t\r]*\n(?:[ \t\r]*\n)*---[ \t]*$").expect("separator regex")
});

/// A normalization pass. Variants are declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pass {
    /// Keep one "Test Cases / User Stories" section, placed before
    /// "Definition of Done"
    DedupeTests,
    /// Put the Definition-of-Done statement on one line
    ReflowDod,
    /// Add the test-verification checklist after the statement
    InjectVerification,
    /// Drop orphaned test cases and tidy blank lines and separators
    Cleanup,
}

impl Pass {
    pub const ALL: [Pass; 4] = [
        Pass::DedupeTests,
        Pass::ReflowDod,
        Pass::InjectVerification,
        Pass::Cleanup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DedupeTests => "dedupe-tests",
            Self::ReflowDod => "reflow-dod",
            Self::InjectVerification => "inject-verification",
            Self::Cleanup => "cleanup",
        }
    }

    /// Run the pass. CRLF documents are processed as LF and keep their
    /// CRLF line endings.
    pub fn apply(&self, text: &str, placeholders: &Placeholders) -> String {
        if text.contains("\r\n") {
            let unix = text.replace("\r\n", "\n");
            return self.apply(&unix, placeholders).replace('\n', "\r\n");
        }
        match self {
            Self::DedupeTests => dedupe_test_sections(text),
            Self::ReflowDod => reflow_definition_of_done(text),
            Self::InjectVerification => inject_test_verification(text, placeholders),
            Self::Cleanup => cleanup(text, placeholders),
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(Pass::name).collect();
                format!("unknown pass '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Applies a set of passes in canonical order.
#[derive(Debug, Clone)]
pub struct Normalizer {
    passes: BTreeSet<Pass>,
    placeholders: Placeholders,
}

impl Normalizer {
    /// A normalizer running every pass.
    pub fn new(placeholders: Placeholders) -> Self {
        Self::with_passes(placeholders, Pass::ALL)
    }

    /// A normalizer running only `passes`. Selection order is irrelevant.
    pub fn with_passes(placeholders: Placeholders, passes: impl IntoIterator<Item = Pass>) -> Self {
        Self {
            passes: passes.into_iter().collect(),
            placeholders,
        }
    }

    pub fn passes(&self) -> impl Iterator<Item = Pass> + '_ {
        self.passes.iter().copied()
    }

    pub fn normalize(&self, text: &str) -> String {
        self.passes
            .iter()
            .fold(text.to_string(), |acc, pass| pass.apply(&acc, &self.placeholders))
    }
}

/// Keep the first "Test Cases / User Stories" section and move it directly
/// before "Definition of Done" when the document has more than one.
pub fn dedupe_test_sections(text: &str) -> String {
    let mut doc = Document::parse(text);
    let occurrences = doc.find_all(2, TEST_CASES_HEADING);
    if occurrences.len() < 2 || doc.find(2, DEFINITION_OF_DONE_HEADING).is_none() {
        return text.to_string();
    }

    let kept: Vec<Section> = doc.sections[doc.span(occurrences[0])].to_vec();
    for &index in occurrences.iter().rev() {
        let span = doc.span(index);
        doc.remove(span);
    }

    let Some(dod) = doc.find(2, DEFINITION_OF_DONE_HEADING) else {
        return text.to_string();
    };
    doc.insert(dod, kept);
    doc.to_string()
}

/// Rewrite the Definition-of-Done statement as one line. Text glued after
/// the closing quote moves to its own paragraph.
pub fn reflow_definition_of_done(text: &str) -> String {
    let mut doc = Document::parse(text);
    let Some(dod) = doc.find(2, DEFINITION_OF_DONE_HEADING) else {
        return text.to_string();
    };

    let body = &doc.sections[dod].body;
    let reflowed = STATEMENT.replace_all(body, |caps: &Captures<'_>| {
        let statement = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
        let glued = caps[2].trim();
        if glued.is_empty() {
            format!("**Definition of Done**: \"{statement}\"")
        } else {
            format!("**Definition of Done**: \"{statement}\"\n\n{glued}")
        }
    });

    if reflowed == *body {
        return text.to_string();
    }
    doc.sections[dod].body = reflowed.into_owned();
    doc.to_string()
}

/// The test-verification checklist, without surrounding blank lines.
pub fn verification_block(placeholders: &Placeholders) -> String {
    let mut block = format!("**{VERIFICATION_MARKER}**:\n");
    block.push_str(&placeholders.checklist(VERIFICATION_ITEMS).join("\n"));
    block
}

/// Insert the test-verification checklist after the Definition-of-Done
/// statement unless the document already has one.
pub fn inject_test_verification(text: &str, placeholders: &Placeholders) -> String {
    if text.contains(VERIFICATION_MARKER) {
        return text.to_string();
    }

    let mut doc = Document::parse(text);
    let Some(dod) = doc.find(2, DEFINITION_OF_DONE_HEADING) else {
        return text.to_string();
    };

    let body = &doc.sections[dod].body;
    let Some(statement_end) = STATEMENT.captures(body).and_then(|c| c.get(1)).map(|m| m.end() + 1)
    else {
        return text.to_string();
    };

    let rest = &body[statement_end..];
    let line_end = rest.find('\n').unwrap_or(rest.len());
    let glued = rest[..line_end].trim();

    let mut updated = String::with_capacity(body.len() + 512);
    updated.push_str(&body[..statement_end]);
    updated.push_str("\n\n");
    updated.push_str(&verification_block(placeholders));
    if !glued.is_empty() {
        updated.push_str("\n\n");
        updated.push_str(glued);
    }
    updated.push_str(&rest[line_end..]);

    doc.sections[dod].body = updated;
    doc.to_string()
}

/// Remove `Test Case N:` sections outside the canonical test section,
/// collapse blank-line runs and duplicate separators, then reflow the
/// Definition-of-Done statement.
pub fn cleanup(text: &str, placeholders: &Placeholders) -> String {
    let text = remove_orphan_test_cases(text, placeholders);
    let text = BLANK_RUN.replace_all(&text, "\n\n\n");
    let text = collapse_separators(&text);
    reflow_definition_of_done(&text)
}

fn is_test_case(section: &Section) -> bool {
    TEST_CASE_TITLE.is_match(&section.title)
}

fn remove_orphan_test_cases(text: &str, placeholders: &Placeholders) -> String {
    let mut doc = Document::parse(text);
    let Some(canonical) = doc.find(2, TEST_CASES_HEADING) else {
        return text.to_string();
    };
    let keep = doc.span(canonical);

    let orphans: Vec<usize> = (0..doc.sections.len())
        .filter(|i| !keep.contains(i) && is_test_case(&doc.sections[*i]))
        .collect();
    if orphans.is_empty() {
        return text.to_string();
    }

    let embedded_in_testing: BTreeSet<usize> = orphans
        .iter()
        .filter_map(|&i| (0..i).rev().find(|&j| !is_test_case(&doc.sections[j])))
        .filter(|&host| doc.sections[host].title == TESTING_HEADING)
        .collect();

    let checklist = placeholders.checklist(TESTING_CHECKLIST).join("\n");
    for &host in &embedded_in_testing {
        doc.sections[host].body = format!("\n{checklist}\n\n");
    }

    let doomed: BTreeSet<usize> = orphans.iter().flat_map(|&i| doc.span(i)).collect();
    for &index in doomed.iter().rev() {
        doc.remove(index..index + 1);
    }

    doc.to_string()
}

fn collapse_separators(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = DUPLICATE_SEPARATOR.replace_all(&current, "---").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders() -> Placeholders {
        Placeholders::default()
    }

    fn test_case(n: usize, name: &str) -> String {
        format!(
            "### Test Case {n}: {name}\n\n**Type**: Unit Test\n\n**Acceptance Criteria**: ok\n\n---\n\n"
        )
    }

    fn test_section(names: &[&str]) -> String {
        let mut section = format!("## {TEST_CASES_HEADING}\n\nThe following test cases must pass:\n\n");
        for (i, name) in names.iter().enumerate() {
            section.push_str(&test_case(i + 1, name));
        }
        section
    }

    const DOD: &str =
        "## Definition of Done\n\nThis is a **TESTING TASK**.\n\n**Definition of Done**: \"Tests pass\"\n";

    #[test]
    fn test_pass_names_round_trip() {
        for pass in Pass::ALL {
            assert_eq!(pass.name().parse::<Pass>().unwrap(), pass);
        }
        assert!("sparkle".parse::<Pass>().unwrap_err().contains("dedupe-tests"));
    }

    #[test]
    fn test_dedupe_keeps_first_before_dod() {
        let first = test_section(&["a", "b", "c"]);
        let second = test_section(&["x", "y", "z"]);
        let input = format!("# T\n\n{first}## Related Tasks\n\n- Previous: None\n\n{second}{DOD}");

        let output = dedupe_test_sections(&input);

        assert_eq!(output.matches("## Test Cases / User Stories").count(), 1);
        assert_eq!(output.matches("### Test Case").count(), 3);
        assert!(output.contains(&format!("- Previous: None\n\n{first}## Definition of Done")));
        assert!(!output.contains("Test Case 1: x"));
    }

    #[test]
    fn test_dedupe_noop_cases() {
        let single = format!("{}{DOD}", test_section(&["a"]));
        assert_eq!(dedupe_test_sections(&single), single);

        let no_dod = format!("{}{}", test_section(&["a"]), test_section(&["b"]));
        assert_eq!(dedupe_test_sections(&no_dod), no_dod);
    }

    #[test]
    fn test_reflow_joins_lines_and_moves_glued_text() {
        let input = "## Definition of Done\n\n**Definition of Done**:\n  \"Tests are\n   written and   pass\" **Test Verification Requirements**:\n- [ ] x\n";
        let output = reflow_definition_of_done(input);
        assert_eq!(
            output,
            "## Definition of Done\n\n**Definition of Done**: \"Tests are written and pass\"\n\n**Test Verification Requirements**:\n- [ ] x\n"
        );
        assert_eq!(reflow_definition_of_done(&output), output);
    }

    #[test]
    fn test_reflow_only_touches_dod_section() {
        let input = "## Notes\n\n**Definition of Done**: \"a\n b\"\n";
        assert_eq!(reflow_definition_of_done(input), input);
    }

    #[test]
    fn test_inject_after_statement() {
        let input = format!("{DOD}\n**Important Notes**:\n- note\n");
        let output = inject_test_verification(&input, &placeholders());

        assert!(output.contains(
            "**Definition of Done**: \"Tests pass\"\n\n**Test Verification Requirements**:\n\
             - [ ] All test cases listed above must be implemented\n"
        ));
        assert!(output.contains(
            "- [ ] All user stories must be validated through passing tests\n\n**Important Notes**:"
        ));
        assert!(output.contains("(`npm test` completes successfully)"));
        assert_eq!(inject_test_verification(&output, &placeholders()), output);
    }

    #[test]
    fn test_inject_needs_statement() {
        let input = "## Definition of Done\n\nNo statement here.\n";
        assert_eq!(inject_test_verification(input, &placeholders()), input);
        let no_dod = "# Title\n";
        assert_eq!(inject_test_verification(no_dod, &placeholders()), no_dod);
    }

    #[test]
    fn test_cleanup_removes_embedded_test_cases() {
        let input = format!(
            "## Checklist\n\n### Testing\n\n- [ ] old item\n\n{}{}### Documentation\n\n- [ ] docs\n\n{}{DOD}",
            test_case(1, "stray"),
            test_case(2, "stray"),
            test_section(&["kept"]),
        );

        let output = cleanup(&input, &placeholders());

        assert!(!output.contains("stray"));
        assert!(!output.contains("old item"));
        assert!(output.contains(
            "### Testing\n\n- [ ] Run full test suite: `npm test`\n- [ ] Run type checking: `npm run build`\n"
        ));
        assert!(output.contains("Test Case 1: kept"));
        assert_eq!(cleanup(&output, &placeholders()), output);
    }

    #[test]
    fn test_cleanup_without_canonical_section_keeps_test_cases() {
        let input = format!("### Testing\n\n{}", test_case(1, "only"));
        assert_eq!(cleanup(&input, &placeholders()), input);
    }

    #[test]
    fn test_cleanup_collapses_blank_lines_and_separators() {
        let input = "a\n\n\n\n\n\nb\n\n---\n\n---\n  \n---\nc\n";
        assert_eq!(cleanup(input, &placeholders()), "a\n\n\nb\n\n---\nc\n");
    }

    #[test]
    fn test_crlf_document_keeps_line_endings() {
        let input = "# T\r\n\r\na\r\n\r\n\r\n\r\n\r\n\r\nb\r\n## Definition of Done\r\n\r\n\
                     **Definition of Done**: \"Done\"\r\n\r\nmore\r\n";
        let normalizer = Normalizer::new(placeholders());

        let output = normalizer.normalize(input);

        assert!(!output.replace("\r\n", "").contains('\n'));
        assert!(output.contains("a\r\n\r\n\r\nb\r\n"));
        assert!(output.contains("\"Done\"\r\n\r\n**Test Verification Requirements**:\r\n- [ ] "));
        assert!(output.ends_with("\r\n\r\nmore\r\n"));
        assert_eq!(output, normalizer.normalize(&input.replace("\r\n", "\n")).replace('\n', "\r\n"));
        assert_eq!(normalizer.normalize(&output), output);
    }

    #[test]
    fn test_normalizer_uses_canonical_order() {
        let normalizer = Normalizer::with_passes(
            placeholders(),
            [Pass::Cleanup, Pass::DedupeTests, Pass::Cleanup],
        );
        let passes: Vec<_> = normalizer.passes().collect();
        assert_eq!(passes, vec![Pass::DedupeTests, Pass::Cleanup]);
    }

    #[test]
    fn test_full_normalization_is_idempotent() {
        let input = format!(
            "# T\n\n{}## Related Tasks\n\n- Next: None\n\n\n\n\n{}## Definition of Done\n\n**Definition of Done**:\n\"x\n y\"",
            test_section(&["a"]),
            test_section(&["b"]),
        );
        let normalizer = Normalizer::new(placeholders());
        let once = normalizer.normalize(&input);
        assert_eq!(normalizer.normalize(&once), once);
        assert_eq!(once.matches(VERIFICATION_MARKER).count(), 1);
        assert!(once.contains("**Definition of Done**: \"x y\"\n\n**Test Verification"));
    }
}
