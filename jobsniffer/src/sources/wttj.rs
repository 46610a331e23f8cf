//! Welcome to the Jungle: script-rendered search pages, paged by next link.

use super::hellowork::french_detail_selectors;
use super::profile::{ListingSelectors, SourceProfile, TitleRule};
use crate::core::SourceId;
use crate::extract::FieldSpec;
use crate::fetch::RenderMode;
use crate::pagination::PaginationPolicy;

// Searches around Paris, restricted to offices in France.
const SEARCH_URL: &str = "https://www.welcometothejungle.com/fr/jobs?query={job_title}&page={page}&aroundQuery={location}&refinementList%5Boffices.country_code%5D%5B%5D=FR&aroundLatLng=48.85341%2C2.3488&aroundRadius=20";

/// Built-in Welcome to the Jungle profile.
#[must_use]
pub fn profile() -> SourceProfile {
    SourceProfile {
        id: SourceId::WelcomeToTheJungle,
        render_mode: RenderMode::Script,
        pagination: PaginationPolicy::NextLink,
        search_url: SEARCH_URL.to_string(),
        page_url: None,
        listing: ListingSelectors {
            item: r#"div[data-role="jobs:thumb"]"#.to_string(),
            title: TitleRule::Separate {
                title: FieldSpec::text("h4"),
                company: Some(FieldSpec::text("span.wui-text")),
            },
            external_id: None,
            contract_type: Some(FieldSpec::text(r#"div[variant="default"] span"#)),
            contract_tag: None,
            salary: None,
            location: Some(FieldSpec::text("p.wui-text span")),
            publication_date: None,
            remote: Some(FieldSpec::text(r#"div[variant="default"] + div span"#)),
            detail_link: FieldSpec::attr("a", "href"),
            next_page: Some(FieldSpec::attr("a.pagination-next", "href")),
        },
        detail: french_detail_selectors(),
    }
}
