use axum::{http::Uri, Json};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Serialize)]
pub struct ApiStatus {
    status: &'static str,
    name: &'static str,
    version: &'static str,
}

fn status() -> ApiStatus {
    ApiStatus {
        status: "ok",
        name: "gigboard",
        version: env!("CARGO_PKG_VERSION"),
    }
}

/// GET /
pub async fn index() -> Json<ApiStatus> {
    Json(status())
}

/// GET /healthz
pub async fn healthz() -> Json<ApiStatus> {
    Json(status())
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NoRoute(uri.path().to_string())
}
