//! Minecraft wiki block scraper served as a paginated JSON API.
//!
//! Every request to `GET /api/blocks` fetches the wiki page again, extracts the
//! block list, filters it and returns one page of it. No state survives a request.

mod error;
mod macros;
pub mod model;
pub mod parse;
pub mod process;
mod request;
pub mod server;

pub use error::{Error, Result};

/// Wiki page that lists all the blocks.
pub const SOURCE_URL: &str = "https://minecraft.wiki/w/Blocks";
/// Prepended to the relative image paths found on the page.
pub const IMAGE_ORIGIN: &str = "https://minecraft.wiki";
/// List items inside the multi-column lists.
pub const BLOCK_SELECTOR: &str = ".div-col.columns ul li";
pub const ITEMS_PER_PAGE: usize = 20;
pub const PORT: u16 = 3000;
