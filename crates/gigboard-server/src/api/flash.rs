//! One-shot user-facing messages returned by create and delete operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gigboard_db::{CatalogError, CatalogResult};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Flash {
    #[serde(skip)]
    pub status: StatusCode,
    pub category: Category,
    pub message: String,
}

impl Flash {
    pub fn success(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            category: Category::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            category: Category::Error,
            message: message.into(),
        }
    }
}

impl IntoResponse for Flash {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Turn a write's outcome into a flash.
///
/// A store failure during the write becomes an error flash; not-found and
/// validation failures stay errors so the caller gets 404 / 400.
pub fn outcome<T>(
    result: CatalogResult<T>,
    success: impl FnOnce(&T) -> Flash,
    failure: impl FnOnce() -> String,
) -> Result<Flash, ApiError> {
    match result {
        Ok(value) => Ok(success(&value)),
        Err(CatalogError::Store(e)) => {
            tracing::error!(error = %e, "write failed");
            Ok(Flash::error(failure()))
        }
        Err(e) => Err(e.into()),
    }
}
