use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::aggregate::{format_start_time, parse_start_time};
use super::{artists, venues};
use crate::entities::{artist, show, venue};
use crate::error::{CatalogError, CatalogResult};

/// A validated show submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowInput {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: NaiveDateTime,
}

impl ShowInput {
    /// Parse the raw submitted values. Any malformed field rejects the whole
    /// submission.
    pub fn parse(artist_id: &str, venue_id: &str, start_time: &str) -> CatalogResult<Self> {
        Ok(Self {
            artist_id: parse_id("artist_id", artist_id)?,
            venue_id: parse_id("venue_id", venue_id)?,
            start_time: parse_start_time(start_time)?,
        })
    }
}

fn parse_id(field: &str, raw: &str) -> CatalogResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| CatalogError::validation(format!("{field} must be an integer id")))
}

/// A row of the shows index with both sides denormalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// Every show whose venue and artist both resolve, in id order.
pub async fn list<C: ConnectionTrait>(db: &C) -> CatalogResult<Vec<ShowListing>> {
    let shows = show::Entity::find()
        .order_by_asc(show::Column::Id)
        .all(db)
        .await?;

    if shows.is_empty() {
        return Ok(Vec::new());
    }

    let venue_ids: HashSet<i32> = shows.iter().map(|s| s.venue_id).collect();
    let artist_ids: HashSet<i32> = shows.iter().map(|s| s.artist_id).collect();

    let venues: HashMap<i32, venue::Model> = venue::Entity::find()
        .filter(venue::Column::Id.is_in(venue_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    let artists: HashMap<i32, artist::Model> = artist::Entity::find()
        .filter(artist::Column::Id.is_in(artist_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(shows
        .into_iter()
        .filter_map(|s| {
            let venue = venues.get(&s.venue_id)?;
            let artist = artists.get(&s.artist_id)?;
            Some(ShowListing {
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: format_start_time(s.start_time),
            })
        })
        .collect())
}

/// Book an artist at a venue. Both must already exist; nothing is written
/// otherwise.
pub async fn create<C>(db: &C, input: ShowInput) -> CatalogResult<show::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    artists::find(&txn, input.artist_id).await?;
    venues::find(&txn, input.venue_id).await?;

    let created = show::ActiveModel {
        artist_id: Set(input.artist_id),
        venue_id: Set(input.venue_id),
        start_time: Set(input.start_time),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        show_id = created.id,
        artist_id = created.artist_id,
        venue_id = created.venue_id,
        "show listed"
    );
    Ok(created)
}
