//! Detail stage: partial record plus detail page to complete record.

use chrono::{DateTime, Utc};

use crate::core::{CompleteRecord, DetailFields, PartialRecord, SourceId};
use crate::document::Document;
use crate::errors::{ConfigurationError, ParseError};
use crate::extract::{
    compile_selector, extract, extract_all, extract_section, CompiledField, CompiledSection,
};
use crate::fetch::FetchedPage;
use crate::sources::{DetailSelectors, SectionSpec};

/// Completes records from detail pages.
///
/// Pure: the same partial record, document, source and timestamp always
/// produce the same record.
#[derive(Debug, Clone)]
pub struct DetailStage {
    summary: CompiledField,
    qualifications: CompiledField,
    missions: CompiledSection,
    profile: CompiledSection,
}

fn compile_section(spec: &SectionSpec) -> Result<CompiledSection, ConfigurationError> {
    Ok(CompiledSection::new(
        compile_selector(&spec.heading)?,
        spec.label.clone(),
        compile_selector(&spec.paragraph)?,
    ))
}

impl DetailStage {
    /// Compiles detail selectors.
    pub fn new(selectors: &DetailSelectors) -> Result<Self, ConfigurationError> {
        Ok(Self {
            summary: selectors.summary.compile()?,
            qualifications: selectors.qualifications.compile()?,
            missions: compile_section(&selectors.missions)?,
            profile: compile_section(&selectors.profile)?,
        })
    }

    /// Completes `partial` from a detail document.
    ///
    /// The canonical URL is the document URL, i.e. the final URL after redirects.
    #[must_use]
    pub fn complete(
        &self,
        partial: PartialRecord,
        document: &Document,
        source: SourceId,
        scraped_at: DateTime<Utc>,
    ) -> CompleteRecord {
        let root = document.root();
        let detail = DetailFields {
            canonical_url: document.url().to_string(),
            summary: extract(root, &self.summary),
            qualifications: extract_all(root, &self.qualifications),
            missions: extract_section(root, &self.missions),
            profile: extract_section(root, &self.profile),
        };
        CompleteRecord::new(partial, detail, source, scraped_at)
    }

    /// Parses a fetched detail page and completes `partial` from it.
    pub fn complete_page(
        &self,
        partial: PartialRecord,
        page: &FetchedPage,
        source: SourceId,
        scraped_at: DateTime<Utc>,
    ) -> Result<CompleteRecord, ParseError> {
        let document = Document::from_page(page)?;
        Ok(self.complete(partial, &document, source, scraped_at))
    }
}
