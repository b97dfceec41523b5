use std::net::SocketAddr;
use std::num::IntErrorKind;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use reqwest::Client;
use tokio::net::TcpListener;

use crate::model::{BlockQuery, BlocksPage};
use crate::process::process_blocks;
use crate::{info_time, Result, SOURCE_URL};

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    // Client uses Arc so we can clone cheaply
    pub client: Client,
    pub source_url: String,
}

impl AppState {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            source_url: source_url.into(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SOURCE_URL)
    }
}

/// Query string as sent; every field is validated by `BlockQuery::from`.
#[derive(Debug, Default)]
pub struct RawBlockQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub id: Option<String>,
}

/// Repeated keys keep their first value, unknown keys are ignored.
impl FromIterator<(String, String)> for RawBlockQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut raw.page,
                "search" => &mut raw.search,
                "id" => &mut raw.id,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        raw
    }
}

impl From<RawBlockQuery> for BlockQuery {
    fn from(raw: RawBlockQuery) -> Self {
        let page = raw
            .page
            .as_deref()
            .and_then(parse_leading_int)
            .filter(|&p| p != 0)
            .unwrap_or(1);

        Self {
            page,
            search: raw.search.unwrap_or_default(),
            id: raw.id.as_deref().and_then(parse_leading_int),
        }
    }
}

/// Reads an optionally signed integer prefix, ignoring leading whitespace and
/// anything after the digits: `"12abc"` is 12, `"abc"` is `None`.
/// Values that don't fit saturate at `i64::MAX`/`i64::MIN`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let digits_start = usize::from(s.starts_with(['+', '-']));
    let digits_len = s[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    match s[..digits_start + digits_len].parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/blocks", get(get_blocks))
        .with_state(state)
}

async fn get_blocks(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BlocksPage>> {
    let query = BlockQuery::from(pairs.into_iter().collect::<RawBlockQuery>());
    info_time!(
        "GET /api/blocks page={} search={:?} id={:?}",
        query.page,
        query.search,
        query.id
    );
    let page = process_blocks(&state, &query).await?;
    Ok(Json(page))
}

/// Serves the API on `addr` until SIGINT/SIGTERM, letting in-flight requests finish.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info_time!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info_time!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Couldn't listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Couldn't listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info_time!("Received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(page: Option<&str>, search: Option<&str>, id: Option<&str>) -> RawBlockQuery {
        RawBlockQuery {
            page: page.map(String::from),
            search: search.map(String::from),
            id: id.map(String::from),
        }
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7"), Some(7));
        assert_eq!(parse_leading_int("3abc"), Some(3));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_leading_int("-99999999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_leading_int("99999999999999999999abc"), Some(i64::MAX));
    }

    #[test]
    fn defaults_when_nothing_is_given() {
        let q = BlockQuery::from(RawBlockQuery::default());
        assert_eq!(q, BlockQuery::default());
        assert!(!q.has_filter());
    }

    #[test]
    fn page_falls_back_to_one() {
        for page in ["abc", "", "0"] {
            assert_eq!(BlockQuery::from(raw(Some(page), None, None)).page, 1);
        }
        assert_eq!(BlockQuery::from(raw(Some("3"), None, None)).page, 3);
        assert_eq!(BlockQuery::from(raw(Some("-1"), None, None)).page, -1);
    }

    #[test]
    fn id_is_absent_unless_numeric() {
        assert_eq!(BlockQuery::from(raw(None, None, Some("x"))).id, None);
        let q = BlockQuery::from(raw(None, None, Some("5")));
        assert_eq!(q.id, Some(5));
        assert!(q.has_filter());
    }

    #[test]
    fn huge_values_stay_numbers() {
        let huge = Some("99999999999999999999");
        let q = BlockQuery::from(raw(huge, None, huge));
        assert_eq!(q.page, i64::MAX);
        assert_eq!(q.id, Some(i64::MAX));
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        let pairs = [("page", "2"), ("id", "0"), ("page", "5"), ("id", "1"), ("lang", "es")];
        let parsed: RawBlockQuery = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(parsed.page.as_deref(), Some("2"));
        assert_eq!(parsed.id.as_deref(), Some("0"));
        assert_eq!(parsed.search, None);
    }

    #[test]
    fn empty_search_is_not_a_filter() {
        let q = BlockQuery::from(raw(None, Some(""), None));
        assert!(!q.has_filter());
        assert!(BlockQuery::from(raw(None, Some("stone"), None)).has_filter());
    }
}
