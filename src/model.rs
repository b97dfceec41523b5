use serde::{Deserialize, Serialize};

/// A single block scraped from the wiki list.
///
/// `id` is the position of the list item within the current scrape, not a
/// stable key: it is recomputed on every fetch and skipped items leave gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: usize,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: i64,
    pub next_page: Option<i64>,
    pub prev_page: Option<i64>,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Successful `/api/blocks` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksPage {
    pub pagination: Pagination,
    pub data: Vec<BlockRecord>,
}

/// Validated request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockQuery {
    pub page: i64,
    pub search: String,
    pub id: Option<i64>,
}

impl Default for BlockQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            id: None,
        }
    }
}

impl BlockQuery {
    /// A filter is active when an id was given or the search is non-empty.
    pub fn has_filter(&self) -> bool {
        self.id.is_some() || !self.search.is_empty()
    }
}
