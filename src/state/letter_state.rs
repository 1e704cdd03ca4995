/// Letter state definitions for tracking crawl progress
///
/// This module defines every state a single letter's crawl can be in and the
/// transitions allowed between them.
use std::fmt;

/// Represents the current state of one letter's crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterState {
    // ===== Active States =====
    /// Crawler created, nothing fetched yet
    Init,

    /// Fetching the first listing page and reading its pagination bounds
    DiscoveringPagination,

    /// Fetching a listing page and collecting its detail links
    DiscoveringLinks,

    /// Fanning out over the detail pages of the current listing page
    FetchingDetails,

    /// Appending the current listing page's batch to storage
    Writing,

    // ===== Terminal States =====
    /// Every listing page was processed
    Done,

    /// Discovery or storage failed; no further pages will be processed
    Aborted,
}

impl LetterState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Checks whether moving to `next` is allowed
    ///
    /// The per-page cycle is `DiscoveringLinks -> FetchingDetails -> Writing`,
    /// after which the crawler either starts the next page or finishes.
    /// Any active state may abort.
    pub fn can_transition_to(&self, next: LetterState) -> bool {
        use LetterState::*;

        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (_, Aborted)
                | (Init, DiscoveringPagination)
                | (DiscoveringPagination, DiscoveringLinks)
                | (DiscoveringPagination, Done)
                | (DiscoveringLinks, FetchingDetails)
                | (FetchingDetails, Writing)
                | (Writing, DiscoveringLinks)
                | (Writing, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::DiscoveringPagination => "discovering_pagination",
            Self::DiscoveringLinks => "discovering_links",
            Self::FetchingDetails => "fetching_details",
            Self::Writing => "writing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for LetterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
