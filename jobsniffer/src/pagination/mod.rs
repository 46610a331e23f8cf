//! Pagination across search-result pages.

mod controller;
mod cursor;

pub use controller::{
    PageOutcome, PaginationController, PaginationPolicy, PaginationState, TerminationReason,
};
pub use cursor::PageCursor;
