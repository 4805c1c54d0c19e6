use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use gigboard_db::catalog::artists::{self, ArtistDetail, ArtistInput, ArtistListItem};
use gigboard_db::catalog;
use gigboard_db::AppState;

use super::flash::{self, Flash};
use super::form::FormFields;
use super::id::EntityId;
use super::venues::SearchPage;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct EditArtistPage {
    pub id: i32,
    pub form: ArtistInput,
}

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistListItem>>, ApiError> {
    Ok(Json(artists::list(&state.db).await?))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Json<SearchPage>, ApiError> {
    let search_term = fields.optional("search_term").unwrap_or_default();
    let results = artists::search(&state.db, &search_term, catalog::now()).await?;
    Ok(Json(SearchPage {
        search_term,
        results,
    }))
}

/// GET /artists/:id
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<ArtistDetail>, ApiError> {
    let detail = artists::detail(&state.db, id, catalog::now()).await?;
    Ok(Json(detail))
}

/// GET /artists/create
pub async fn create_artist_form() -> Json<ArtistInput> {
    Json(ArtistInput::default())
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Flash, ApiError> {
    let input = fields.artist_input()?;
    let name = input.name.trim().to_string();

    flash::outcome(
        artists::create(&state.db, input).await,
        |a| {
            Flash::success(
                StatusCode::CREATED,
                format!("Artist {} was successfully listed!", a.name),
            )
        },
        || format!("An error occurred. Artist {name} could not be listed."),
    )
}

/// GET /artists/:id/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<EditArtistPage>, ApiError> {
    let artist = artists::find(&state.db, id).await?;
    Ok(Json(EditArtistPage {
        id: artist.id,
        form: ArtistInput::from(&artist),
    }))
}

/// POST /artists/:id/edit
pub async fn update_artist(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    fields: FormFields,
) -> Result<Redirect, ApiError> {
    let input = fields.artist_input()?;
    artists::update(&state.db, id, input).await?;
    Ok(Redirect::to(&format!("/artists/{id}")))
}
