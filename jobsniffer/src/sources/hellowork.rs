//! HelloWork: server-rendered search pages, paged by item count.

use super::profile::{DetailSelectors, ListingSelectors, SectionSpec, SourceProfile, TitleRule};
use crate::core::SourceId;
use crate::extract::FieldSpec;
use crate::fetch::RenderMode;
use crate::pagination::PaginationPolicy;

const SEARCH_URL: &str =
    "https://www.hellowork.com/fr-fr/emploi/recherche.html?k={job_title}&l={location}";

const PAGE_URL: &str =
    "https://www.hellowork.com/fr-fr/emploi/recherche.html?k={job_title}&l={location}&page={page}";

/// Detail-page selectors shared by the built-in French sources.
pub(crate) fn french_detail_selectors() -> DetailSelectors {
    DetailSelectors {
        summary: FieldSpec::text("section.tw-mb-8 div.tw-typo-xl"),
        qualifications: FieldSpec::text("ul.tw-flex-wrap li"),
        missions: SectionSpec::new("Les missions"),
        profile: SectionSpec::new("Le profil"),
    }
}

/// Built-in HelloWork profile.
#[must_use]
pub fn profile() -> SourceProfile {
    SourceProfile {
        id: SourceId::HelloWork,
        render_mode: RenderMode::Plain,
        pagination: PaginationPolicy::ItemCount,
        search_url: SEARCH_URL.to_string(),
        page_url: Some(PAGE_URL.to_string()),
        listing: ListingSelectors {
            item: "ul li[data-id-storage-target='item']".to_string(),
            title: TitleRule::Split {
                field: FieldSpec::attr("a[data-cy='offerTitle']", "title"),
                delimiter: "-".to_string(),
            },
            external_id: Some(FieldSpec::own_attr("data-id-storage-item-id")),
            contract_type: Some(FieldSpec::text("div[data-cy='contractCard']")),
            contract_tag: Some(FieldSpec::text("div[data-cy='contractTag']")),
            salary: Some(FieldSpec::text("div.tw-tag-attractive-s")),
            location: Some(FieldSpec::text("div[data-cy='localisationCard']")),
            publication_date: Some(FieldSpec::text("div.tw-typo-s.tw-text-grey")),
            remote: None,
            detail_link: FieldSpec::attr("a[data-cy='offerTitle']", "href"),
            next_page: None,
        },
        detail: french_detail_selectors(),
    }
}
