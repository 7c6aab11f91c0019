//! Pagination types
//!
//! Defines the page links envelope and the traversal state machine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The `links` object of a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// URL of the previous page, if any
    #[serde(default)]
    pub prev: Option<String>,
    /// URL of the next page, if any
    #[serde(default)]
    pub next: Option<String>,
}

impl PageLinks {
    /// Next page URL, treating an empty string as absent
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|s| !s.is_empty())
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this URL next
    Continue {
        /// Absolute URL of the next page
        url: String,
    },
    /// No more pages
    Done,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub pages: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Upper bound on pages, if any
    pub max_pages: Option<u32>,
    /// Is pagination complete?
    pub done: bool,
    /// Set when the traversal stopped because of `max_pages`
    pub truncated: bool,
    visited: HashSet<String>,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state bounded to `max_pages` pages
    pub fn with_max_pages(max_pages: Option<u32>) -> Self {
        Self {
            max_pages,
            ..Default::default()
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Record that `url` is about to be fetched.
    ///
    /// Fails if the same URL was already fetched during this traversal.
    pub fn visit(&mut self, url: &str) -> Result<()> {
        if !self.visited.insert(url.to_string()) {
            self.mark_done();
            return Err(Error::PaginationLoop {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// Account for a fetched page and compute the next step
    pub fn advance(&mut self, links: &PageLinks, records_count: usize) -> NextPage {
        self.pages += 1;
        self.total_fetched += records_count as u64;

        let Some(next) = links.next_url() else {
            self.mark_done();
            return NextPage::Done;
        };

        if self.max_pages.is_some_and(|max| self.pages >= max) {
            self.truncated = true;
            self.mark_done();
            return NextPage::Done;
        }

        NextPage::Continue {
            url: next.to_string(),
        }
    }
}
