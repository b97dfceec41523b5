use chrono::Local;

use crate::model::{BlockQuery, BlockRecord, BlocksPage, Pagination};
use crate::parse::parse_html;
use crate::request::request_page_html;
use crate::server::AppState;
use crate::{info_time, Error, Result, ITEMS_PER_PAGE};

/// Runs one full scrape for a request: fetch, extract, filter and paginate.
/// Nothing is kept between calls.
pub async fn process_blocks(state: &AppState, query: &BlockQuery) -> Result<BlocksPage> {
    let start_time = Local::now();

    let html = request_page_html(&state.client, &state.source_url).await?;
    let blocks = parse_html(html).await?;
    let blocks = filter_blocks(blocks, query)?;
    let page = paginate(blocks, query.page)?;

    info_time!(
        start_time,
        "Served page {}/{} ({} blocks)",
        page.pagination.current_page,
        page.pagination.total_pages,
        page.data.len()
    );
    Ok(page)
}

/// Applies the id filter, then the case-insensitive name filter, on the same list.
/// Returns `Error::NotFound` when an active filter leaves nothing.
pub fn filter_blocks(mut blocks: Vec<BlockRecord>, query: &BlockQuery) -> Result<Vec<BlockRecord>> {
    if let Some(id) = query.id {
        blocks.retain(|b| i64::try_from(b.id).is_ok_and(|b_id| b_id == id));
    }

    if !query.search.is_empty() {
        let needle = query.search.to_lowercase();
        blocks.retain(|b| b.name.to_lowercase().contains(&needle));
    }

    if query.has_filter() && blocks.is_empty() {
        return Err(Error::NotFound);
    }
    Ok(blocks)
}

/// Cuts out the requested 1-based page.
///
/// An empty list has zero pages, so every page is out of range for it.
pub fn paginate(blocks: Vec<BlockRecord>, page: i64) -> Result<BlocksPage> {
    let total_count = blocks.len();
    let total_pages = total_count.div_ceil(ITEMS_PER_PAGE);

    let page_idx = match usize::try_from(page) {
        Ok(p) if (1..=total_pages).contains(&p) => p - 1,
        _ => return Err(Error::PageOutOfRange { page, total_pages }),
    };

    let data = blocks
        .into_iter()
        .skip(page_idx * ITEMS_PER_PAGE)
        .take(ITEMS_PER_PAGE)
        .collect();

    Ok(BlocksPage {
        pagination: Pagination {
            current_page: page,
            next_page: (page_idx + 1 < total_pages).then_some(page + 1),
            prev_page: (page > 1).then_some(page - 1),
            total_pages,
            total_count,
        },
        data,
    })
}
