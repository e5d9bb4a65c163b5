//! Structured form of a markdown task document.
//!
//! A [`Document`] is a preamble followed by sections, one per ATX heading.
//! Headings inside fenced code blocks are body text. Serializing an
//! unmodified document reproduces its input exactly.

use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})[ \t]+(.*?)[ \t#]*$").expect("heading regex"));

/// One heading and the text up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading level, 1 to 6
    pub level: usize,
    /// Heading text without markers
    pub title: String,
    /// The heading line as written, including its line ending
    pub heading: String,
    pub body: String,
}

impl Section {
    /// Text of the section as it appears in the document.
    pub fn text(&self) -> String {
        format!("{}{}", self.heading, self.body)
    }
}

/// A parsed markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Text before the first heading
    pub preamble: String,
    pub sections: Vec<Section>,
}

impl Document {
    /// Split `text` into sections in one pass.
    pub fn parse(text: &str) -> Self {
        let mut doc = Document::default();
        let mut fence: Option<String> = None;

        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(|c| c == '\n' || c == '\r');
            let trimmed = content.trim_start();

            if let Some(marker) = &fence {
                if trimmed.starts_with(marker.as_str()) {
                    fence = None;
                }
                doc.push_body(line);
                continue;
            }

            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                fence = Some(trimmed[..3].to_string());
                doc.push_body(line);
                continue;
            }

            match HEADING.captures(content) {
                Some(caps) => doc.sections.push(Section {
                    level: caps[1].len(),
                    title: caps[2].to_string(),
                    heading: line.to_string(),
                    body: String::new(),
                }),
                None => doc.push_body(line),
            }
        }

        doc
    }

    fn push_body(&mut self, line: &str) {
        match self.sections.last_mut() {
            Some(section) => section.body.push_str(line),
            None => self.preamble.push_str(line),
        }
    }

    /// Index of the first section with this level and title.
    pub fn find(&self, level: usize, title: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.level == level && s.title == title)
    }

    /// Indices of every section with this level and title.
    pub fn find_all(&self, level: usize, title: &str) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.level == level && s.title == title)
            .map(|(i, _)| i)
            .collect()
    }

    /// Range of section indices covered by the section at `index`: the
    /// section itself and every following section of a deeper level.
    pub fn span(&self, index: usize) -> Range<usize> {
        let level = self.sections[index].level;
        let end = self.sections[index + 1..]
            .iter()
            .position(|s| s.level <= level)
            .map(|offset| index + 1 + offset)
            .unwrap_or(self.sections.len());
        index..end
    }

    /// Remove and return the sections in `range`.
    pub fn remove(&mut self, range: Range<usize>) -> Vec<Section> {
        self.sections.drain(range).collect()
    }

    /// Insert `sections` before the section at `index`.
    pub fn insert(&mut self, index: usize, sections: Vec<Section>) {
        self.sections.splice(index..index, sections);
    }

    /// Sections of `text` without a preamble, for splicing generated text
    /// into a document.
    pub fn sections_of(text: &str) -> Vec<Section> {
        let doc = Self::parse(text);
        debug_assert!(doc.preamble.is_empty(), "generated text must start with a heading");
        doc.sections
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preamble)?;
        for section in &self.sections {
            f.write_str(&section.heading)?;
            f.write_str(&section.body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "# TASK-001: Title\n\
        \n\
        **Task ID**: T-001\n\
        \n\
        ## Checklist\n\
        \n\
        ### Testing\n\
        \n\
        - [ ] item\n\
        \n\
        ```md\n\
        ## Not a heading\n\
        ```\n\
        \n\
        ## Definition of Done\n\
        \n\
        done\n";

    #[test]
    fn test_parse_sections() {
        let doc = Document::parse(SAMPLE);
        let titles: Vec<_> = doc
            .sections
            .iter()
            .map(|s| (s.level, s.title.as_str()))
            .collect();
        assert_eq!(
            titles,
            vec![
                (1, "TASK-001: Title"),
                (2, "Checklist"),
                (3, "Testing"),
                (2, "Definition of Done"),
            ]
        );
        assert!(doc.sections[2].body.contains("## Not a heading"));
    }

    #[test]
    fn test_round_trip_is_exact() {
        assert_eq!(Document::parse(SAMPLE).to_string(), SAMPLE);
        let crlf = "intro\r\n## A\r\nbody\r\n";
        let doc = Document::parse(crlf);
        assert_eq!(doc.preamble, "intro\r\n");
        assert_eq!(doc.sections[0].title, "A");
        assert_eq!(doc.to_string(), crlf);
    }

    #[test]
    fn test_heading_needs_space() {
        let doc = Document::parse("#hashtag\n####### seven\n## Real ##\n");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Real");
        assert_eq!(doc.preamble, "#hashtag\n####### seven\n");
    }

    #[test]
    fn test_span_covers_deeper_sections() {
        let doc = Document::parse(SAMPLE);
        assert_eq!(doc.span(1), 1..3);
        assert_eq!(doc.span(2), 2..3);
        assert_eq!(doc.span(3), 3..4);
        assert_eq!(doc.span(0), 0..4);
    }

    #[test]
    fn test_find_remove_insert() {
        let mut doc = Document::parse(SAMPLE);
        let dod = doc.find(2, "Definition of Done").unwrap();
        assert_eq!(doc.find_all(2, "Checklist"), vec![1]);

        let removed = doc.remove(doc.span(1));
        assert_eq!(removed.len(), 2);
        doc.insert(doc.find(2, "Definition of Done").unwrap(), removed);
        assert_eq!(doc.to_string(), SAMPLE);
        assert_eq!(dod, 3);
    }

    #[test]
    fn test_sections_of_generated_text() {
        let sections = Document::sections_of("## A\n\ntext\n### B\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].text(), "## A\n\ntext\n");
    }

    proptest! {
        #[test]
        fn test_round_trip_any_text(lines in prop::collection::vec(
            prop_oneof![
                Just("# Title".to_string()),
                Just("## Section".to_string()),
                Just("### Sub".to_string()),
                Just("```".to_string()),
                Just(String::new()),
                "[a-z #*-]{0,20}",
            ],
            0..30,
        ), trailing_newline in any::<bool>()) {
            let mut text = lines.join("\n");
            if trailing_newline {
                text.push('\n');
            }
            prop_assert_eq!(Document::parse(&text).to_string(), text);
        }
    }
}
