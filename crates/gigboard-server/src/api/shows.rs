use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use gigboard_db::catalog::shows::{self, ShowInput, ShowListing};
use gigboard_db::AppState;

use super::flash::{self, Flash};
use super::form::FormFields;
use crate::error::ApiError;

/// Blank show form. Values are submitted as text and parsed on submission.
#[derive(Debug, Default, Serialize)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowListing>>, ApiError> {
    Ok(Json(shows::list(&state.db).await?))
}

/// GET /shows/create
pub async fn create_show_form() -> Json<ShowForm> {
    Json(ShowForm::default())
}

/// POST /shows/create
///
/// A malformed id or start time stops the request with 400 before the
/// store is touched.
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Flash, ApiError> {
    let input = ShowInput::parse(
        &fields.required("artist_id")?,
        &fields.required("venue_id")?,
        &fields.required("start_time")?,
    )?;

    flash::outcome(
        shows::create(&state.db, input).await,
        |_| Flash::success(StatusCode::CREATED, "Show was successfully listed!"),
        || "An error occurred. Show could not be listed.".to_string(),
    )
}
