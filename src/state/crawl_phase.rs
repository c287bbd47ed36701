/// Phase definitions for tracking harvest progress
///
/// A harvest moves from discovering the listing size, through each listing
/// page in ascending order, to completion.
use std::fmt;

/// Represents where the harvester is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Total page count and checkpoint have not been read yet
    Discovering,

    /// Working through the links of a listing page
    Paging {
        /// The listing page being processed (1-based)
        page: u32,
        /// Total number of listing pages discovered
        total_pages: u32,
    },

    /// Every listing page up to the total has been processed
    Done,
}

impl CrawlPhase {
    /// Returns true once the harvest can produce no more records
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the listing page being processed, if any
    pub fn current_page(&self) -> Option<u32> {
        match self {
            Self::Paging { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Checks whether moving to `next` respects page ordering
    ///
    /// Pages only ever advance one at a time, and `Done` is final.
    pub fn can_transition_to(&self, next: &CrawlPhase) -> bool {
        match (self, next) {
            (Self::Discovering, Self::Paging { .. }) => true,
            (Self::Discovering, Self::Done) => true,
            (
                Self::Paging { page, total_pages },
                Self::Paging {
                    page: next_page,
                    total_pages: next_total,
                },
            ) => *next_page == page + 1 && next_total == total_pages && next_page <= total_pages,
            (Self::Paging { .. }, Self::Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovering => write!(f, "discovering"),
            Self::Paging { page, total_pages } => write!(f, "paging {}/{}", page, total_pages),
            Self::Done => write!(f, "done"),
        }
    }
}
