use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Bloque no encontrado")]
    NotFound,

    #[error("Página fuera de rango")]
    PageOutOfRange { page: i64, total_pages: usize },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::PageOutOfRange { .. } => StatusCode::BAD_REQUEST,
            Error::ParseMissingSelector(_)
            | Error::Io(_)
            | Error::RuntimeJoin(_)
            | Error::Reqwest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every failure is reported as `{ "error": <message> }`.
/// Internal failures expose the underlying message to the caller.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Error while scraping: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
