//! Parsed HTML documents.
//!
//! A [`Document`] pairs a parsed DOM with the URL it was served from, so
//! relative links can be resolved. Documents are not `Send`: parse and query
//! them inside synchronous code, never across an `.await`.

use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::errors::ParseError;
use crate::fetch::FetchedPage;

/// A parsed HTML document and its URL.
pub struct Document {
    url: Url,
    html: Html,
}

impl Document {
    /// Parses `body` as a document served from `url`.
    #[must_use]
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }

    /// Parses a fetched page, using its final URL as the document URL.
    ///
    /// Non-HTML content types and blank bodies are parse failures.
    pub fn from_page(page: &FetchedPage) -> Result<Self, ParseError> {
        if !page.is_html() {
            return Err(ParseError::NotHtml {
                url: page.final_url.to_string(),
                content_type: page.content_type.clone().unwrap_or_default(),
            });
        }
        if page.body.trim().is_empty() {
            return Err(ParseError::EmptyBody(page.final_url.to_string()));
        }
        Ok(Self::parse(page.final_url.clone(), &page.body))
    }

    /// The URL the document was served from.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The root element, used as the scope for document-wide extraction.
    #[must_use]
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All elements matching `selector`, in document order.
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// Resolves `href` against the document URL.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<Url> {
        resolve_url(&self.url, href)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("url", &self.url.as_str()).finish_non_exhaustive()
    }
}

/// Resolves a possibly-relative link against `base`.
///
/// Returns `None` for blank links, links that fail to parse, and anything
/// that does not land on an http(s) URL (`mailto:`, `javascript:`, ...).
#[must_use]
pub fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}
