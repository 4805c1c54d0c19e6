use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::aggregate::{
    self, format_start_time, partition_shows, SearchResults, ShowSlot, Summary, Timeline,
};
use super::{name_like, non_blank, require};
use crate::entities::{artist, show, venue};
use crate::error::{CatalogError, CatalogResult};
use crate::genres;

/// Every mutable artist field. Edits overwrite all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

impl ArtistInput {
    pub fn normalized(self) -> CatalogResult<Self> {
        Ok(Self {
            name: require("name", &self.name)?,
            city: require("city", &self.city)?,
            state: require("state", &self.state)?,
            phone: non_blank(self.phone),
            image_link: non_blank(self.image_link),
            facebook_link: non_blank(self.facebook_link),
            website: non_blank(self.website),
            seeking_venue: self.seeking_venue,
            seeking_description: non_blank(self.seeking_description),
            genres: genres::decode(&genres::encode(&self.genres)),
        })
    }

    fn write_to(self, active: &mut artist::ActiveModel) {
        active.name = Set(self.name);
        active.city = Set(self.city);
        active.state = Set(self.state);
        active.phone = Set(self.phone);
        active.image_link = Set(self.image_link);
        active.facebook_link = Set(self.facebook_link);
        active.website = Set(self.website);
        active.seeking_venue = Set(self.seeking_venue);
        active.seeking_description = Set(self.seeking_description);
        active.genres = Set(genres::encode(&self.genres));
    }
}

impl From<&artist::Model> for ArtistInput {
    fn from(a: &artist::Model) -> Self {
        Self {
            name: a.name.clone(),
            city: a.city.clone(),
            state: a.state.clone(),
            phone: a.phone.clone(),
            image_link: a.image_link.clone(),
            facebook_link: a.facebook_link.clone(),
            website: a.website.clone(),
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description.clone(),
            genres: a.genre_list(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistListItem {
    pub id: i32,
    pub name: String,
}

/// A venue the artist plays, as listed on the artist page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueAppearance {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    #[serde(flatten)]
    pub shows: Timeline<VenueAppearance>,
}

impl ArtistDetail {
    fn new(a: artist::Model, shows: Timeline<VenueAppearance>) -> Self {
        Self {
            genres: a.genre_list(),
            id: a.id,
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            website: a.website,
            facebook_link: a.facebook_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
            image_link: a.image_link,
            shows,
        }
    }
}

pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> CatalogResult<artist::Model> {
    artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(CatalogError::artist_not_found(id))
}

pub async fn list<C: ConnectionTrait>(db: &C) -> CatalogResult<Vec<ArtistListItem>> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Id)
        .all(db)
        .await?;

    Ok(artists
        .into_iter()
        .map(|a| ArtistListItem {
            id: a.id,
            name: a.name,
        })
        .collect())
}

/// Case-insensitive substring search on the artist name.
pub async fn search<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: NaiveDateTime,
) -> CatalogResult<SearchResults> {
    let Some(pattern) = aggregate::like_pattern(term) else {
        return Ok(SearchResults::empty());
    };

    let matches = artist::Entity::find()
        .filter(name_like(artist::Column::Name, pattern))
        .order_by_asc(artist::Column::Id)
        .all(db)
        .await?;

    let counts = upcoming_counts(db, matches.iter().map(|a| a.id).collect(), now).await?;

    Ok(SearchResults::from_summaries(
        matches
            .into_iter()
            .map(|a| Summary {
                num_upcoming_shows: counts.get(&a.id).copied().unwrap_or(0),
                id: a.id,
                name: a.name,
            })
            .collect(),
    ))
}

/// Artist page: the artist plus their shows split into past and upcoming.
pub async fn detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
    now: NaiveDateTime,
) -> CatalogResult<ArtistDetail> {
    let artist = find(db, id).await?;

    let rows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .order_by_asc(show::Column::StartTime)
        .order_by_asc(show::Column::Id)
        .find_also_related(venue::Entity)
        .all(db)
        .await?;

    let slots = rows.into_iter().map(|(s, v)| {
        ShowSlot::new(
            s.start_time,
            v.map(|v| VenueAppearance {
                venue_id: v.id,
                venue_name: v.name,
                venue_image_link: v.image_link,
                start_time: format_start_time(s.start_time),
            }),
        )
    });

    Ok(ArtistDetail::new(artist, partition_shows(slots, now)))
}

pub async fn create<C: ConnectionTrait>(db: &C, input: ArtistInput) -> CatalogResult<artist::Model> {
    let input = input.normalized()?;

    let mut active = artist::ActiveModel {
        ..Default::default()
    };
    input.write_to(&mut active);
    let created = active.insert(db).await?;

    tracing::info!(artist_id = created.id, name = %created.name, "artist listed");
    Ok(created)
}

/// Overwrite every mutable field of an existing artist.
pub async fn update<C>(db: &C, id: i32, input: ArtistInput) -> CatalogResult<artist::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let input = input.normalized()?;

    let txn = db.begin().await?;
    let mut active: artist::ActiveModel = find(&txn, id).await?.into();
    input.write_to(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(artist_id = id, "artist updated");
    Ok(updated)
}

async fn upcoming_counts<C: ConnectionTrait>(
    db: &C,
    artist_ids: Vec<i32>,
    now: NaiveDateTime,
) -> CatalogResult<HashMap<i32, u64>> {
    if artist_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = show::Entity::find()
        .filter(show::Column::ArtistId.is_in(artist_ids))
        .find_also_related(venue::Entity)
        .all(db)
        .await?;

    let mut slots: HashMap<i32, Vec<ShowSlot<venue::Model>>> = HashMap::new();
    for (s, v) in rows {
        slots
            .entry(s.artist_id)
            .or_default()
            .push(ShowSlot::new(s.start_time, v));
    }

    Ok(slots
        .into_iter()
        .map(|(id, shows)| (id, aggregate::count_upcoming(&shows, now)))
        .collect())
}
