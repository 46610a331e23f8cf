//! Field extraction.
//!
//! Pure functions from an element scope and a compiled field spec to trimmed
//! string values. Absence is always a value (`None` or an empty list), never
//! an error.

mod field;
mod rules;

pub use field::{compile_selector, CompiledField, FieldSpec, FieldTarget};
pub use rules::{extract_section, split_title_company, CompiledSection};

use scraper::ElementRef;

/// First non-blank value of `field` within `scope`, trimmed.
#[must_use]
pub fn extract(scope: ElementRef<'_>, field: &CompiledField) -> Option<String> {
    values(scope, field).next()
}

/// Every non-blank value of `field` within `scope`, trimmed, in document order.
#[must_use]
pub fn extract_all(scope: ElementRef<'_>, field: &CompiledField) -> Vec<String> {
    values(scope, field).collect()
}

fn values<'a>(
    scope: ElementRef<'a>,
    field: &'a CompiledField,
) -> impl Iterator<Item = String> + 'a {
    let elements: Box<dyn Iterator<Item = ElementRef<'a>> + 'a> = match &field.selector {
        Some(selector) => Box::new(scope.select(selector)),
        None => Box::new(std::iter::once(scope)),
    };

    elements
        .flat_map(move |element| -> Box<dyn Iterator<Item = &'a str> + 'a> {
            match &field.target {
                FieldTarget::Text => Box::new(own_text(element)),
                FieldTarget::Attr(name) => Box::new(element.value().attr(name).into_iter()),
            }
        })
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Direct child text nodes of `element`, untrimmed.
pub(crate) fn own_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
}
