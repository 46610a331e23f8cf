//! Job records produced by the listing and detail stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::SourceId;

/// Fields known after parsing a listing page.
///
/// Every field is optional: a selector that matches nothing is a valid
/// outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRecord {
    /// Job title.
    pub title: Option<String>,
    /// Identifier assigned by the job site.
    pub external_id: Option<String>,
    /// Contract type (e.g. "CDI").
    pub contract_type: Option<String>,
    /// Contract tag shown next to the contract type.
    pub contract_tag: Option<String>,
    /// Raw salary text.
    pub salary: Option<String>,
    /// Hiring company.
    pub company_name: Option<String>,
    /// Raw location text.
    pub location: Option<String>,
    /// Raw publication date text.
    pub publication_date: Option<String>,
    /// Remote-work policy text, where the site exposes one.
    pub remote: Option<String>,
    /// Absolute URL of the detail page.
    pub detail_url: Option<String>,
}

impl PartialRecord {
    /// Creates an empty partial record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the company name.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    /// Sets the detail URL.
    #[must_use]
    pub fn with_detail_url(mut self, url: impl Into<String>) -> Self {
        self.detail_url = Some(url.into());
        self
    }
}

/// Fields extracted from a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFields {
    /// Final URL of the detail page after redirects.
    pub canonical_url: String,
    /// First rich-text summary block.
    pub summary: Option<String>,
    /// Qualification tags, in page order.
    pub qualifications: Vec<String>,
    /// Missions section; empty when the page has no such section.
    pub missions: String,
    /// Candidate profile section; empty when the page has no such section.
    pub profile: String,
}

/// A fully extracted job record.
///
/// Immutable once built: fields are read through accessors. This is the unit
/// delivered to record sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRecord {
    #[serde(flatten)]
    listing: PartialRecord,
    #[serde(flatten)]
    detail: DetailFields,
    source: SourceId,
    scraped_at: DateTime<Utc>,
    fingerprint: String,
}

impl CompleteRecord {
    /// Merges listing and detail fields into a record.
    #[must_use]
    pub fn new(
        listing: PartialRecord,
        detail: DetailFields,
        source: SourceId,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let fingerprint = fingerprint_url(&detail.canonical_url);
        Self {
            listing,
            detail,
            source,
            scraped_at,
            fingerprint,
        }
    }

    /// Listing-page fields.
    #[must_use]
    pub fn listing(&self) -> &PartialRecord {
        &self.listing
    }

    /// Detail-page fields.
    #[must_use]
    pub fn detail(&self) -> &DetailFields {
        &self.detail
    }

    /// Job title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.listing.title.as_deref()
    }

    /// Hiring company.
    #[must_use]
    pub fn company_name(&self) -> Option<&str> {
        self.listing.company_name.as_deref()
    }

    /// Final detail URL.
    #[must_use]
    pub fn canonical_url(&self) -> &str {
        &self.detail.canonical_url
    }

    /// Summary block.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.detail.summary.as_deref()
    }

    /// Qualification tags.
    #[must_use]
    pub fn qualifications(&self) -> &[String] {
        &self.detail.qualifications
    }

    /// Missions section.
    #[must_use]
    pub fn missions(&self) -> &str {
        &self.detail.missions
    }

    /// Candidate profile section.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.detail.profile
    }

    /// Site that produced the record.
    #[must_use]
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// When the detail page was processed.
    #[must_use]
    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    /// Stable key derived from the canonical URL.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Hex-encoded SHA-256 of a URL string.
#[must_use]
pub fn fingerprint_url(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> CompleteRecord {
        let listing = PartialRecord::new()
            .with_title("Data Analyst")
            .with_company("Acme")
            .with_detail_url("https://jobs.test/offer/1");
        let detail = DetailFields {
            canonical_url: "https://jobs.test/offer/1".into(),
            summary: Some("Join us".into()),
            qualifications: vec!["SQL".into(), "Python".into()],
            missions: "Build dashboards".into(),
            profile: String::new(),
        };
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        CompleteRecord::new(listing, detail, SourceId::HelloWork, at)
    }

    #[test]
    fn test_record_accessors() {
        let record = sample();
        assert_eq!(record.title(), Some("Data Analyst"));
        assert_eq!(record.company_name(), Some("Acme"));
        assert_eq!(record.qualifications(), ["SQL".to_string(), "Python".to_string()]);
        assert_eq!(record.profile(), "");
        assert_eq!(record.source(), SourceId::HelloWork);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let record = sample();
        assert_eq!(record.fingerprint(), fingerprint_url("https://jobs.test/offer/1"));
        assert_eq!(record.fingerprint().len(), 64);
        assert_ne!(record.fingerprint(), fingerprint_url("https://jobs.test/offer/2"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["title"], serde_json::json!("Data Analyst"));
        assert_eq!(value["canonical_url"], serde_json::json!("https://jobs.test/offer/1"));
        assert_eq!(value["source"], serde_json::json!("hellowork"));
        assert_eq!(value["missions"], serde_json::json!("Build dashboards"));
        assert!(value["salary"].is_null());
    }
}
