//! Pagination module
//!
//! List endpoints return a `links` object alongside `data`. `links.next`
//! holds the absolute URL of the following page and is `null` on the last
//! page. [`PaginationState`] tracks the traversal and decides the next step.

mod types;

pub use types::{NextPage, PageLinks, PaginationState};
