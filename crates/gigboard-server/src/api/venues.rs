use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use gigboard_db::catalog::venues::{self, VenueDetail, VenueInput};
use gigboard_db::catalog::{self, Area, SearchResults};
use gigboard_db::AppState;

use super::flash::{self, Flash};
use super::form::FormFields;
use super::id::EntityId;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub search_term: String,
    #[serde(flatten)]
    pub results: SearchResults,
}

#[derive(Debug, Serialize)]
pub struct EditVenuePage {
    pub id: i32,
    pub form: VenueInput,
}

/// GET /venues
pub async fn list_venues(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Area>>, ApiError> {
    let areas = venues::list_areas(&state.db, catalog::now()).await?;
    Ok(Json(areas))
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Json<SearchPage>, ApiError> {
    let search_term = fields.optional("search_term").unwrap_or_default();
    let results = venues::search(&state.db, &search_term, catalog::now()).await?;
    Ok(Json(SearchPage {
        search_term,
        results,
    }))
}

/// GET /venues/:id
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<VenueDetail>, ApiError> {
    let detail = venues::detail(&state.db, id, catalog::now()).await?;
    Ok(Json(detail))
}

/// GET /venues/create
pub async fn create_venue_form() -> Json<VenueInput> {
    Json(VenueInput::default())
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Flash, ApiError> {
    let input = fields.venue_input()?;
    let name = input.name.trim().to_string();

    flash::outcome(
        venues::create(&state.db, input).await,
        |v| {
            Flash::success(
                StatusCode::CREATED,
                format!("Venue {} was successfully listed!", v.name),
            )
        },
        || format!("An error occurred. Venue {name} could not be listed."),
    )
}

/// DELETE /venues/:id
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Flash, ApiError> {
    let deleted = venues::delete(&state.db, id).await?;
    Ok(Flash::success(
        StatusCode::OK,
        format!("Venue {} was successfully deleted.", deleted.name),
    ))
}

/// GET /venues/:id/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<EditVenuePage>, ApiError> {
    let venue = venues::find(&state.db, id).await?;
    Ok(Json(EditVenuePage {
        id: venue.id,
        form: VenueInput::from(&venue),
    }))
}

/// POST /venues/:id/edit
pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    fields: FormFields,
) -> Result<Redirect, ApiError> {
    let input = fields.venue_input()?;
    venues::update(&state.db, id, input).await?;
    Ok(Redirect::to(&format!("/venues/{id}")))
}
