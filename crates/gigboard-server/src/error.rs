//! HTTP mapping of catalog errors.
//!
//! NotFound → 404, validation failures → 400, store failures → 500. Store
//! details are logged and never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gigboard_db::CatalogError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The request body or a field in it could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    #[error("no route for {0}")]
    NoRoute(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound { .. }) | Self::NoRoute(_) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::Validation(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Catalog(CatalogError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::BAD_REQUEST => "VALIDATION_ERROR",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            Self::Catalog(CatalogError::Store(e)) => {
                tracing::error!(error = %e, "store failure");
                "Internal server error".to_string()
            }
            other => {
                tracing::warn!(status = status.as_u16(), "{other}");
                other.to_string()
            }
        };

        (
            status,
            Json(ErrorBody {
                error,
                code: self.code(),
            }),
        )
            .into_response()
    }
}
