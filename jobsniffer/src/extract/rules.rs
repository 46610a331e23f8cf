//! Composite extraction rules.

use scraper::{ElementRef, Selector};

use super::own_text;

/// Splits a combined "title - company" string.
///
/// The last segment is the company, everything before it (re-joined with the
/// delimiter) is the title. The company is `Some` exactly when the delimiter
/// occurs; a title that trims to nothing is `None`.
#[must_use]
pub fn split_title_company(raw: &str, delimiter: &str) -> (Option<String>, Option<String>) {
    let raw = raw.trim();
    if raw.is_empty() || delimiter.is_empty() {
        return (non_blank(raw), None);
    }

    match raw.rsplit_once(delimiter) {
        None => (Some(raw.to_string()), None),
        Some((title, company)) => (non_blank(title), Some(company.trim().to_string())),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// A labelled detail-page section, compiled.
///
/// Paragraphs belong to the section when any earlier sibling is a heading
/// whose text contains the label. Sections are not bounded by the next
/// heading: every later sibling paragraph is included.
#[derive(Debug, Clone)]
pub struct CompiledSection {
    heading: Selector,
    label: String,
    paragraph: Selector,
}

impl CompiledSection {
    /// Builds a section rule from parsed selectors.
    #[must_use]
    pub fn new(heading: Selector, label: impl Into<String>, paragraph: Selector) -> Self {
        Self {
            heading,
            label: label.into(),
            paragraph,
        }
    }

    /// The heading label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    fn is_labelled_heading(&self, element: ElementRef<'_>) -> bool {
        self.heading.matches(&element) && element.text().collect::<String>().contains(&self.label)
    }

    fn follows_heading(&self, paragraph: ElementRef<'_>) -> bool {
        paragraph
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .any(|sibling| self.is_labelled_heading(sibling))
    }
}

/// Text of every paragraph in `section`, joined with newlines.
///
/// Each own text node is trimmed and blank nodes are skipped. No matching
/// heading yields an empty string.
#[must_use]
pub fn extract_section(scope: ElementRef<'_>, section: &CompiledSection) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for paragraph in scope.select(&section.paragraph) {
        if !section.follows_heading(paragraph) {
            continue;
        }
        lines.extend(own_text(paragraph).map(str::trim).filter(|t| !t.is_empty()));
    }
    lines.join("\n")
}
