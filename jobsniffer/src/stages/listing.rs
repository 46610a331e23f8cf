//! Listing stage: search-results page to partial records.

use scraper::{ElementRef, Selector};
use url::Url;

use crate::core::PartialRecord;
use crate::document::Document;
use crate::errors::{ConfigurationError, ParseError};
use crate::extract::{compile_selector, extract, split_title_company, CompiledField, FieldSpec};
use crate::fetch::FetchedPage;
use crate::sources::{ListingSelectors, TitleRule};

/// A listing item that can be followed to its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Fields read from the listing card.
    pub record: PartialRecord,
    /// Absolute detail-page URL.
    pub detail_url: Url,
}

/// Result of parsing one search-results page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Followable items, in page order.
    pub entries: Vec<ListingEntry>,
    /// Item scopes found on the page, including dropped ones.
    pub items_found: usize,
    /// Items dropped for lack of a usable detail link.
    pub dropped: usize,
    /// Resolved next-page link, if any.
    pub next_page: Option<Url>,
}

#[derive(Debug, Clone)]
enum CompiledTitle {
    Split {
        field: CompiledField,
        delimiter: String,
    },
    Separate {
        title: CompiledField,
        company: Option<CompiledField>,
    },
}

impl CompiledTitle {
    fn compile(rule: &TitleRule) -> Result<Self, ConfigurationError> {
        match rule {
            TitleRule::Split { field, delimiter } => {
                if delimiter.is_empty() {
                    return Err(ConfigurationError::new("Title delimiter must not be empty")
                        .with_field("title.delimiter"));
                }
                Ok(Self::Split {
                    field: field.compile()?,
                    delimiter: delimiter.clone(),
                })
            }
            TitleRule::Separate { title, company } => Ok(Self::Separate {
                title: title.compile()?,
                company: compile_optional(company.as_ref())?,
            }),
        }
    }

    fn apply(&self, scope: ElementRef<'_>) -> (Option<String>, Option<String>) {
        match self {
            Self::Split { field, delimiter } => extract(scope, field)
                .map_or((None, None), |raw| split_title_company(&raw, delimiter)),
            Self::Separate { title, company } => (
                extract(scope, title),
                company.as_ref().and_then(|c| extract(scope, c)),
            ),
        }
    }
}

/// Parses search-results pages for one source.
#[derive(Debug, Clone)]
pub struct ListingStage {
    item: Selector,
    title: CompiledTitle,
    external_id: Option<CompiledField>,
    contract_type: Option<CompiledField>,
    contract_tag: Option<CompiledField>,
    salary: Option<CompiledField>,
    location: Option<CompiledField>,
    publication_date: Option<CompiledField>,
    remote: Option<CompiledField>,
    detail_link: CompiledField,
    next_page: Option<CompiledField>,
}

fn compile_optional(spec: Option<&FieldSpec>) -> Result<Option<CompiledField>, ConfigurationError> {
    spec.map(FieldSpec::compile).transpose()
}

impl ListingStage {
    /// Compiles listing selectors.
    pub fn new(selectors: &ListingSelectors) -> Result<Self, ConfigurationError> {
        Ok(Self {
            item: compile_selector(&selectors.item)?,
            title: CompiledTitle::compile(&selectors.title)?,
            external_id: compile_optional(selectors.external_id.as_ref())?,
            contract_type: compile_optional(selectors.contract_type.as_ref())?,
            contract_tag: compile_optional(selectors.contract_tag.as_ref())?,
            salary: compile_optional(selectors.salary.as_ref())?,
            location: compile_optional(selectors.location.as_ref())?,
            publication_date: compile_optional(selectors.publication_date.as_ref())?,
            remote: compile_optional(selectors.remote.as_ref())?,
            detail_link: selectors.detail_link.compile()?,
            next_page: compile_optional(selectors.next_page.as_ref())?,
        })
    }

    /// Parses a fetched search-results page.
    pub fn parse_page(&self, page: &FetchedPage) -> Result<ListingPage, ParseError> {
        let document = Document::from_page(page)?;
        Ok(self.parse(&document))
    }

    /// Parses a search-results document.
    #[must_use]
    pub fn parse(&self, document: &Document) -> ListingPage {
        let mut listing = ListingPage::default();

        for scope in document.select(&self.item) {
            listing.items_found += 1;

            let Some(detail_url) =
                extract(scope, &self.detail_link).and_then(|href| document.resolve(&href))
            else {
                listing.dropped += 1;
                tracing::debug!(
                    url = %document.url(),
                    item = listing.items_found,
                    "Dropping listing item without a usable detail link"
                );
                continue;
            };

            let mut record = self.read_record(scope);
            record.detail_url = Some(detail_url.to_string());
            listing.entries.push(ListingEntry { record, detail_url });
        }

        listing.next_page = self
            .next_page
            .as_ref()
            .and_then(|field| extract(document.root(), field))
            .and_then(|href| document.resolve(&href));

        listing
    }

    fn read_record(&self, scope: ElementRef<'_>) -> PartialRecord {
        let field = |spec: &Option<CompiledField>| spec.as_ref().and_then(|f| extract(scope, f));
        let (title, company_name) = self.title.apply(scope);

        PartialRecord {
            title,
            external_id: field(&self.external_id),
            contract_type: field(&self.contract_type),
            contract_tag: field(&self.contract_tag),
            salary: field(&self.salary),
            company_name,
            location: field(&self.location),
            publication_date: field(&self.publication_date),
            remote: field(&self.remote),
            detail_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceId;
    use crate::sources::builtin_profile;
    use crate::testing::{hellowork_listing, wttj_listing, ListingCard};
    use pretty_assertions::assert_eq;

    fn stage(id: SourceId) -> ListingStage {
        ListingStage::new(&builtin_profile(id).listing).unwrap()
    }

    fn doc(url: &str, body: &str) -> Document {
        Document::parse(Url::parse(url).unwrap(), body)
    }

    #[test]
    fn test_hellowork_listing_fields() {
        let body = hellowork_listing(&[ListingCard::new("Data Analyst - Acme", "/fr-fr/emplois/1.html")
            .with_id("1")
            .with_contract("CDI")
            .with_salary("45 000 € / an")
            .with_location("Lyon - 69")]);
        let page = stage(SourceId::HelloWork)
            .parse(&doc("https://www.hellowork.com/fr-fr/emploi/recherche.html?k=data", &body));

        assert_eq!(page.items_found, 1);
        assert_eq!(page.dropped, 0);
        let record = &page.entries[0].record;
        assert_eq!(record.title.as_deref(), Some("Data Analyst"));
        assert_eq!(record.company_name.as_deref(), Some("Acme"));
        assert_eq!(record.external_id.as_deref(), Some("1"));
        assert_eq!(record.contract_type.as_deref(), Some("CDI"));
        assert_eq!(record.salary.as_deref(), Some("45 000 € / an"));
        assert_eq!(record.location.as_deref(), Some("Lyon - 69"));
        assert_eq!(record.publication_date, None);
        assert_eq!(
            page.entries[0].detail_url.as_str(),
            "https://www.hellowork.com/fr-fr/emplois/1.html"
        );
        assert_eq!(record.detail_url.as_deref(), Some(page.entries[0].detail_url.as_str()));
    }

    #[test]
    fn test_unresolvable_link_is_dropped() {
        let body = hellowork_listing(&[
            ListingCard::new("A - One", "/a.html"),
            ListingCard::new("B - Two", "mailto:hr@two.test"),
            ListingCard::new("C - Three", "/c.html"),
        ]);
        let page = stage(SourceId::HelloWork).parse(&doc("https://www.hellowork.com/", &body));

        assert_eq!(page.items_found, 3);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.dropped, 1);
        assert_eq!(page.entries[1].record.company_name.as_deref(), Some("Three"));
    }

    #[test]
    fn test_zero_items_is_empty_page() {
        let body = hellowork_listing(&[]);
        let page = stage(SourceId::HelloWork).parse(&doc("https://www.hellowork.com/", &body));
        assert_eq!(page, ListingPage::default());
    }

    #[test]
    fn test_title_without_delimiter_has_no_company() {
        let body = hellowork_listing(&[ListingCard::new("Comptable", "/c.html")]);
        let page = stage(SourceId::HelloWork).parse(&doc("https://www.hellowork.com/", &body));
        assert_eq!(page.entries[0].record.title.as_deref(), Some("Comptable"));
        assert_eq!(page.entries[0].record.company_name, None);
    }

    #[test]
    fn test_wttj_listing_with_next_link() {
        let body = wttj_listing(
            &[ListingCard::new("Data Engineer", "/fr/companies/acme/jobs/data-engineer")
                .with_company("Acme")
                .with_contract("CDI")
                .with_remote("Télétravail partiel")
                .with_location("Paris")],
            Some("/fr/jobs?query=data&page=2"),
        );
        let page = stage(SourceId::WelcomeToTheJungle)
            .parse(&doc("https://www.welcometothejungle.com/fr/jobs?query=data&page=1", &body));

        let record = &page.entries[0].record;
        assert_eq!(record.title.as_deref(), Some("Data Engineer"));
        assert_eq!(record.company_name.as_deref(), Some("Acme"));
        assert_eq!(record.contract_type.as_deref(), Some("CDI"));
        assert_eq!(record.remote.as_deref(), Some("Télétravail partiel"));
        assert_eq!(record.location.as_deref(), Some("Paris"));
        assert_eq!(
            page.next_page.unwrap().as_str(),
            "https://www.welcometothejungle.com/fr/jobs?query=data&page=2"
        );
    }

    #[test]
    fn test_parse_page_rejects_non_html() {
        let mut fetched = FetchedPage::html(Url::parse("https://www.hellowork.com/").unwrap(), "{}");
        fetched.content_type = Some("application/json".into());
        assert!(stage(SourceId::HelloWork).parse_page(&fetched).is_err());
    }

    #[test]
    fn test_empty_delimiter_is_rejected() {
        let mut selectors = builtin_profile(SourceId::HelloWork).listing;
        selectors.title = TitleRule::Split {
            field: FieldSpec::text("a"),
            delimiter: String::new(),
        };
        assert!(ListingStage::new(&selectors).is_err());
    }
}
