use chrono::Local;
use reqwest::Client;

use crate::{info_time, Result};

/// Requests the block list page and returns a `Result<String>` containing the HTML.
/// Non-success statuses are turned into errors.
pub(crate) async fn request_page_html(client: &Client, url: &str) -> Result<String> {
    let start_time = Local::now();
    let res = client.get(url).send().await?.error_for_status()?;
    let html = res.text().await?;
    info_time!(start_time, "Fetched {url}: {} bytes", html.len());
    Ok(html)
}
