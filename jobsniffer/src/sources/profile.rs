//! Source profiles: everything site-specific, as data.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::SourceId;
use crate::errors::ConfigurationError;
use crate::extract::FieldSpec;
use crate::fetch::RenderMode;
use crate::pagination::PaginationPolicy;
use crate::stages::{DetailStage, ListingStage};

/// How the title (and possibly the company) is read from a listing item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TitleRule {
    /// One combined "title - company" value, split on `delimiter`.
    Split {
        /// Field holding the combined value.
        field: FieldSpec,
        /// Separator between title and company.
        delimiter: String,
    },
    /// Title and company come from separate fields.
    Separate {
        /// Title field.
        title: FieldSpec,
        /// Company field, if the site shows one on listing cards.
        #[serde(default)]
        company: Option<FieldSpec>,
    },
}

/// Selectors for a search-results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// CSS selector for one listing item scope.
    pub item: String,
    /// Title (and company) rule.
    pub title: TitleRule,
    /// External id field.
    #[serde(default)]
    pub external_id: Option<FieldSpec>,
    /// Contract type field.
    #[serde(default)]
    pub contract_type: Option<FieldSpec>,
    /// Contract tag field.
    #[serde(default)]
    pub contract_tag: Option<FieldSpec>,
    /// Salary field.
    #[serde(default)]
    pub salary: Option<FieldSpec>,
    /// Location field.
    #[serde(default)]
    pub location: Option<FieldSpec>,
    /// Publication date field.
    #[serde(default)]
    pub publication_date: Option<FieldSpec>,
    /// Remote-work field.
    #[serde(default)]
    pub remote: Option<FieldSpec>,
    /// Link to the detail page, resolved against the listing URL.
    pub detail_link: FieldSpec,
    /// Next-page link, looked up in the whole document.
    #[serde(default)]
    pub next_page: Option<FieldSpec>,
}

/// A labelled section of a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Heading selector.
    #[serde(default = "default_heading")]
    pub heading: String,
    /// Text the heading must contain (case-sensitive).
    pub label: String,
    /// Paragraph selector for the section body.
    #[serde(default = "default_paragraph")]
    pub paragraph: String,
}

fn default_heading() -> String {
    "h2".to_string()
}

fn default_paragraph() -> String {
    "p".to_string()
}

impl SectionSpec {
    /// A section under an `h2` heading with `p` paragraphs.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            heading: default_heading(),
            label: label.into(),
            paragraph: default_paragraph(),
        }
    }
}

/// Selectors for a detail page, evaluated against the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSelectors {
    /// Rich-text summary block; first match wins.
    pub summary: FieldSpec,
    /// Qualification list items.
    pub qualifications: FieldSpec,
    /// Missions section.
    pub missions: SectionSpec,
    /// Candidate profile section.
    pub profile: SectionSpec,
}

/// Everything the engine needs to crawl one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Source identifier.
    pub id: SourceId,
    /// Render mode for listing and detail pages.
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Pagination policy.
    pub pagination: PaginationPolicy,
    /// First search page, with `{job_title}`, `{location}` and `{page}` placeholders.
    pub search_url: String,
    /// Continuation page template, required by the item-count policy.
    #[serde(default)]
    pub page_url: Option<String>,
    /// Listing-page selectors.
    pub listing: ListingSelectors,
    /// Detail-page selectors.
    pub detail: DetailSelectors,
}

impl SourceProfile {
    /// Validates the profile and parses all of its selectors.
    pub fn compile(&self) -> Result<CompiledSource, ConfigurationError> {
        let field = |name: &str| format!("sources.{}.{name}", self.id);

        check_template(&self.search_url).map_err(|e| e.with_field(field("search_url")))?;
        match self.pagination {
            PaginationPolicy::ItemCount => {
                let template = self.page_url.as_deref().ok_or_else(|| {
                    ConfigurationError::new("Item-count pagination needs a page URL template")
                        .with_field(field("page_url"))
                        .with_fix_hint("Add a page_url containing a {page} placeholder.")
                })?;
                check_template(template).map_err(|e| e.with_field(field("page_url")))?;
                if !template.contains("{page}") {
                    return Err(ConfigurationError::new(
                        "Page URL template has no {page} placeholder",
                    )
                    .with_field(field("page_url")));
                }
            }
            PaginationPolicy::NextLink => {
                if self.listing.next_page.is_none() {
                    return Err(ConfigurationError::new(
                        "Next-link pagination needs a next_page selector",
                    )
                    .with_field(field("listing.next_page")));
                }
            }
        }

        let listing =
            ListingStage::new(&self.listing).map_err(|e| e.with_field(field("listing")))?;
        let detail = DetailStage::new(&self.detail).map_err(|e| e.with_field(field("detail")))?;

        Ok(CompiledSource {
            profile: self.clone(),
            listing,
            detail,
        })
    }
}

/// A validated profile with its stages ready to run.
#[derive(Debug, Clone)]
pub struct CompiledSource {
    profile: SourceProfile,
    listing: ListingStage,
    detail: DetailStage,
}

impl CompiledSource {
    /// Source identifier.
    #[must_use]
    pub fn id(&self) -> SourceId {
        self.profile.id
    }

    /// The profile this was compiled from.
    #[must_use]
    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    /// Render mode for every page of this source.
    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.profile.render_mode
    }

    /// Pagination policy.
    #[must_use]
    pub fn pagination(&self) -> PaginationPolicy {
        self.profile.pagination
    }

    /// Listing stage.
    #[must_use]
    pub fn listing(&self) -> &ListingStage {
        &self.listing
    }

    /// Detail stage.
    #[must_use]
    pub fn detail(&self) -> &DetailStage {
        &self.detail
    }

    /// URL of the first search page.
    pub fn first_page_url(&self, job_title: &str, location: &str) -> Result<Url, ConfigurationError> {
        render_template(&self.profile.search_url, job_title, location, 1)
    }

    /// URL of search page `page` under the item-count policy.
    ///
    /// Returns `None` when the profile has no continuation template.
    #[must_use]
    pub fn page_url(&self, job_title: &str, location: &str, page: u32) -> Option<Url> {
        let template = self.profile.page_url.as_deref()?;
        render_template(template, job_title, location, page).ok()
    }
}

/// Fills a URL template, form-encoding the query values.
pub fn render_template(
    template: &str,
    job_title: &str,
    location: &str,
    page: u32,
) -> Result<Url, ConfigurationError> {
    let rendered = template
        .replace("{job_title}", &encode(job_title))
        .replace("{location}", &encode(location))
        .replace("{page}", &page.to_string());

    if rendered.contains('{') || rendered.contains('}') {
        return Err(ConfigurationError::new(format!(
            "URL template '{template}' has an unknown placeholder"
        ))
        .with_fix_hint("Supported placeholders are {job_title}, {location} and {page}."));
    }

    let url = Url::parse(&rendered).map_err(|e| {
        ConfigurationError::new(format!("URL template '{template}' is not a valid URL: {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::new(format!(
            "URL template '{template}' must use http or https"
        )));
    }
    Ok(url)
}

fn check_template(template: &str) -> Result<(), ConfigurationError> {
    render_template(template, "probe", "probe", 1).map(|_| ())
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.trim().as_bytes()).collect()
}
