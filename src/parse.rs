use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::model::BlockRecord;
use crate::{info_time, Error, Result, BLOCK_SELECTOR, IMAGE_ORIGIN};

const THUMB_SIZE: &str = "/30px-";
const FULL_SIZE: &str = "/300px-";

/// How many list items matched the block selector and how many of them became records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub matched: usize,
    pub kept: usize,
}

impl ExtractStats {
    pub fn dropped(&self) -> usize {
        self.matched - self.kept
    }
}

/// Parses the page on the blocking pool and returns the normalized block records.
pub(crate) async fn parse_html(html: String) -> Result<Vec<BlockRecord>> {
    let (blocks, stats) = spawn_blocking(move || extract_blocks(&html)).await??;

    info_time!(
        "Extracted {} blocks from {} list items ({} dropped)",
        stats.kept,
        stats.matched,
        stats.dropped()
    );
    if stats.kept == 0 {
        tracing::warn!(
            "No blocks extracted with selector {BLOCK_SELECTOR:?}, the wiki markup may have changed"
        );
    }
    Ok(blocks)
}

/// Walks every `li` inside the column containers, in document order.
///
/// Items without a link text or an image `src` are skipped, but they still
/// consume an id, so the resulting ids can have gaps.
pub fn extract_blocks(html: &str) -> Result<(Vec<BlockRecord>, ExtractStats)> {
    let doc = Html::parse_document(html);

    let item_selector = create_selector(BLOCK_SELECTOR)?;
    let link_selector = create_selector("a")?;
    let img_selector = create_selector("img")?;

    let mut stats = ExtractStats::default();
    let mut blocks = Vec::new();
    for (id, item) in doc.select(&item_selector).enumerate() {
        stats.matched += 1;

        let Some(name) = first_text(item, &link_selector) else {
            continue;
        };
        let Some(src) = item
            .select(&img_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .filter(|src| !src.is_empty())
        else {
            continue;
        };

        blocks.push(BlockRecord {
            id,
            name,
            image: normalize_image_url(src),
        });
    }
    stats.kept = blocks.len();

    Ok((blocks, stats))
}

/// Swaps the 30px thumbnail for the 300px variant and makes the path absolute.
pub fn normalize_image_url(src: &str) -> String {
    format!("{IMAGE_ORIGIN}{}", src.replacen(THUMB_SIZE, FULL_SIZE, 1))
}

/// Trimmed text of the first element matching `selector`, if it isn't empty.
fn first_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let el = item.select(selector).next()?;
    let text = el.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}
