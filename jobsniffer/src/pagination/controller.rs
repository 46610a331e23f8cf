//! Pagination state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use super::PageCursor;

/// How a source decides whether to fetch another search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationPolicy {
    /// Continue while the last page had at least one item; the next URL comes
    /// from the source's page template.
    ItemCount,
    /// Continue while the last page exposed a next-page link.
    NextLink,
}

/// Why a source stopped paginating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The page limit was reached.
    MaxPagesReached,
    /// The last page had no listing items.
    NoListings,
    /// The last page had no next-page link.
    NoNextPage,
    /// A listing page could not be fetched or parsed.
    ListingFetchFailed,
    /// The crawl was cancelled.
    Cancelled,
    /// The source's task ended abnormally.
    Aborted,
}

impl TerminationReason {
    /// Stable label for summaries and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxPagesReached => "max_pages_reached",
            Self::NoListings => "no_listings",
            Self::NoNextPage => "no_next_page",
            Self::ListingFetchFailed => "listing_fetch_failed",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a source's pagination stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationState {
    /// Page `page` at `url` is next to be processed.
    Running {
        /// 1-based page number.
        page: u32,
        /// URL of the page.
        url: Url,
    },
    /// No more pages will be fetched.
    Terminal(TerminationReason),
}

/// What the listing stage saw on the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    /// Number of item scopes on the page, including dropped ones.
    pub items_found: usize,
    /// Resolved next-page link, if the page exposed one.
    pub next_page: Option<Url>,
}

/// Drives one source across its search pages.
#[derive(Debug, Clone)]
pub struct PaginationController {
    policy: PaginationPolicy,
    cursor: PageCursor,
    state: PaginationState,
}

impl PaginationController {
    /// Starts on page 1 at `first_url`.
    #[must_use]
    pub fn new(policy: PaginationPolicy, max_pages: u32, first_url: Url) -> Self {
        let cursor = PageCursor::new(max_pages);
        Self {
            policy,
            state: PaginationState::Running {
                page: cursor.page(),
                url: first_url,
            },
            cursor,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// The page to process next, if still running.
    #[must_use]
    pub fn current(&self) -> Option<(u32, &Url)> {
        match &self.state {
            PaginationState::Running { page, url } => Some((*page, url)),
            PaginationState::Terminal(_) => None,
        }
    }

    /// Termination reason, once terminal.
    #[must_use]
    pub fn termination(&self) -> Option<TerminationReason> {
        match self.state {
            PaginationState::Terminal(reason) => Some(reason),
            PaginationState::Running { .. } => None,
        }
    }

    /// Decides what follows the current page.
    ///
    /// `page_url` builds the URL of a page number under the item-count policy.
    pub fn advance(
        &mut self,
        outcome: PageOutcome,
        page_url: impl FnOnce(u32) -> Option<Url>,
    ) -> &PaginationState {
        if self.current().is_none() {
            return &self.state;
        }
        if !self.cursor.has_next() {
            return self.terminate(TerminationReason::MaxPagesReached);
        }

        let next_url = match self.policy {
            PaginationPolicy::ItemCount => {
                if outcome.items_found == 0 {
                    return self.terminate(TerminationReason::NoListings);
                }
                page_url(self.cursor.page() + 1)
            }
            PaginationPolicy::NextLink => outcome.next_page,
        };

        match (next_url, self.cursor.advance()) {
            (Some(url), Some(page)) => {
                self.state = PaginationState::Running { page, url };
                &self.state
            }
            _ => self.terminate(TerminationReason::NoNextPage),
        }
    }

    /// Stops pagination. A terminal state is never overwritten.
    pub fn terminate(&mut self, reason: TerminationReason) -> &PaginationState {
        if matches!(self.state, PaginationState::Running { .. }) {
            self.state = PaginationState::Terminal(reason);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(page: u32) -> Url {
        Url::parse(&format!("https://jobs.test/search?page={page}")).unwrap()
    }

    fn items(n: usize) -> PageOutcome {
        PageOutcome {
            items_found: n,
            next_page: None,
        }
    }

    #[test]
    fn test_item_count_runs_to_max_pages() {
        let mut controller = PaginationController::new(PaginationPolicy::ItemCount, 3, url(1));
        assert_eq!(controller.current().map(|(p, _)| p), Some(1));

        controller.advance(items(20), |p| Some(url(p)));
        assert_eq!(controller.current(), Some((2, &url(2))));

        controller.advance(items(20), |p| Some(url(p)));
        assert_eq!(controller.current(), Some((3, &url(3))));

        let state = controller.advance(items(20), |p| Some(url(p)));
        assert_eq!(state, &PaginationState::Terminal(TerminationReason::MaxPagesReached));
    }

    #[test]
    fn test_item_count_stops_on_empty_page() {
        let mut controller = PaginationController::new(PaginationPolicy::ItemCount, 3, url(1));
        controller.advance(items(0), |p| Some(url(p)));
        assert_eq!(controller.termination(), Some(TerminationReason::NoListings));
    }

    #[test]
    fn test_next_link_follows_link() {
        let mut controller = PaginationController::new(PaginationPolicy::NextLink, 5, url(1));
        let next = Url::parse("https://jobs.test/search?cursor=abc").unwrap();
        controller.advance(
            PageOutcome {
                items_found: 0,
                next_page: Some(next.clone()),
            },
            |_| None,
        );
        assert_eq!(controller.current(), Some((2, &next)));

        controller.advance(items(10), |_| None);
        assert_eq!(controller.termination(), Some(TerminationReason::NoNextPage));
    }

    #[test]
    fn test_max_pages_checked_before_policy() {
        let mut controller = PaginationController::new(PaginationPolicy::ItemCount, 1, url(1));
        controller.advance(items(0), |p| Some(url(p)));
        assert_eq!(controller.termination(), Some(TerminationReason::MaxPagesReached));
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut controller = PaginationController::new(PaginationPolicy::ItemCount, 3, url(1));
        controller.terminate(TerminationReason::Cancelled);
        controller.terminate(TerminationReason::ListingFetchFailed);
        controller.advance(items(5), |p| Some(url(p)));
        assert_eq!(controller.termination(), Some(TerminationReason::Cancelled));
    }

    #[test]
    fn test_termination_reason_labels() {
        assert_eq!(TerminationReason::MaxPagesReached.to_string(), "max_pages_reached");
        assert_eq!(
            serde_json::to_string(&TerminationReason::NoNextPage).unwrap(),
            "\"no_next_page\""
        );
    }
}
