//! HTML fixtures shaped like the built-in sources' pages.

use std::fmt::Write as _;

/// One job card on a search-results page.
#[derive(Debug, Clone, Default)]
pub struct ListingCard {
    /// Title text (combined "title - company" for HelloWork-style pages).
    pub title: String,
    /// Detail link `href`.
    pub href: String,
    /// External id attribute.
    pub id: Option<String>,
    /// Company, shown separately on WTTJ-style cards.
    pub company: Option<String>,
    /// Contract type.
    pub contract: Option<String>,
    /// Salary text.
    pub salary: Option<String>,
    /// Location text.
    pub location: Option<String>,
    /// Remote-work text.
    pub remote: Option<String>,
}

impl ListingCard {
    /// Creates a card with a title and a detail link.
    #[must_use]
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            ..Self::default()
        }
    }

    /// Sets the external id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the company.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the contract type.
    #[must_use]
    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }

    /// Sets the salary.
    #[must_use]
    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = Some(salary.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the remote-work text.
    #[must_use]
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A HelloWork-style search-results page.
#[must_use]
pub fn hellowork_listing(cards: &[ListingCard]) -> String {
    let mut html = String::from("<html><body><main><ul class=\"results\">");
    for card in cards {
        html.push_str("<li data-id-storage-target=\"item\"");
        if let Some(id) = &card.id {
            let _ = write!(html, " data-id-storage-item-id=\"{}\"", escape(id));
        }
        let _ = write!(
            html,
            "><a data-cy=\"offerTitle\" title=\"{title}\" href=\"{href}\"><h3>{title}</h3></a>",
            title = escape(&card.title),
            href = escape(&card.href),
        );
        if let Some(contract) = &card.contract {
            let _ = write!(html, "<div data-cy=\"contractCard\">\n  {}\n</div>", escape(contract));
        }
        if let Some(location) = &card.location {
            let _ = write!(html, "<div data-cy=\"localisationCard\">{}</div>", escape(location));
        }
        if let Some(salary) = &card.salary {
            let _ = write!(html, "<div class=\"tw-tag-attractive-s\">{}</div>", escape(salary));
        }
        html.push_str("</li>");
    }
    html.push_str("</ul></main></body></html>");
    html
}

/// A WTTJ-style search-results page, optionally with a next-page link.
#[must_use]
pub fn wttj_listing(cards: &[ListingCard], next_page: Option<&str>) -> String {
    let mut html = String::from("<html><body><div id=\"jobs\">");
    for card in cards {
        let _ = write!(
            html,
            "<div data-role=\"jobs:thumb\"><a href=\"{}\"><h4>{}</h4></a>",
            escape(&card.href),
            escape(&card.title),
        );
        if let Some(company) = &card.company {
            let _ = write!(html, "<span class=\"wui-text\">{}</span>", escape(company));
        }
        if let Some(location) = &card.location {
            let _ = write!(html, "<p class=\"wui-text\"><span>{}</span></p>", escape(location));
        }
        if let Some(contract) = &card.contract {
            let _ = write!(html, "<div variant=\"default\"><span>{}</span></div>", escape(contract));
        }
        if let Some(remote) = &card.remote {
            let _ = write!(html, "<div><span>{}</span></div>", escape(remote));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    if let Some(href) = next_page {
        let _ = write!(html, "<nav><a class=\"pagination-next\" href=\"{}\">Suivant</a></nav>", escape(href));
    }
    html.push_str("</body></html>");
    html
}

/// A detail page in the layout shared by the built-in sources.
#[derive(Debug, Clone, Default)]
pub struct DetailPage {
    summary: Option<String>,
    qualifications: Vec<String>,
    sections: Vec<(String, Vec<String>)>,
}

impl DetailPage {
    /// Creates an empty detail page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the summary block.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the qualification tags.
    #[must_use]
    pub fn with_qualifications(mut self, tags: &[&str]) -> Self {
        self.qualifications = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    /// Appends a headed section with its paragraphs.
    #[must_use]
    pub fn with_section(mut self, heading: impl Into<String>, paragraphs: &[&str]) -> Self {
        self.sections.push((
            heading.into(),
            paragraphs.iter().map(|p| (*p).to_string()).collect(),
        ));
        self
    }

    /// Renders the page.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::from("<html><body>");
        if let Some(summary) = &self.summary {
            let _ = write!(
                html,
                "<section class=\"tw-mb-8\"><div class=\"tw-typo-xl\">{}</div></section>",
                escape(summary)
            );
        }
        if !self.qualifications.is_empty() {
            html.push_str("<ul class=\"tw-flex tw-flex-wrap\">");
            for tag in &self.qualifications {
                let _ = write!(html, "<li>{}</li>", escape(tag));
            }
            html.push_str("</ul>");
        }
        html.push_str("<div class=\"offer\">");
        for (heading, paragraphs) in &self.sections {
            let _ = write!(html, "<h2>{}</h2>", escape(heading));
            for paragraph in paragraphs {
                let _ = write!(html, "<p>{}</p>", escape(paragraph));
            }
        }
        html.push_str("</div></body></html>");
        html
    }
}
