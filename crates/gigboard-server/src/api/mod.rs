pub mod artists;
pub mod flash;
pub mod form;
pub mod home;
pub mod id;
pub mod shows;
pub mod venues;

use axum::{
    routing::{get, post},
    Router,
};
use gigboard_db::AppState;
use std::sync::Arc;

/// Every route, without middleware. `crate::app` adds the layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/healthz", get(home::healthz))
        // Venues
        .route("/venues", get(venues::list_venues))
        .route("/venues/search", post(venues::search_venues))
        .route(
            "/venues/create",
            get(venues::create_venue_form).post(venues::create_venue),
        )
        .route(
            "/venues/{id}",
            get(venues::get_venue).delete(venues::delete_venue),
        )
        .route(
            "/venues/{id}/edit",
            get(venues::edit_venue_form).post(venues::update_venue),
        )
        // Artists
        .route("/artists", get(artists::list_artists))
        .route("/artists/search", post(artists::search_artists))
        .route(
            "/artists/create",
            get(artists::create_artist_form).post(artists::create_artist),
        )
        .route("/artists/{id}", get(artists::get_artist))
        .route(
            "/artists/{id}/edit",
            get(artists::edit_artist_form).post(artists::update_artist),
        )
        // Shows
        .route("/shows", get(shows::list_shows))
        .route(
            "/shows/create",
            get(shows::create_show_form).post(shows::create_show),
        )
        .fallback(home::not_found)
        .with_state(state)
}
