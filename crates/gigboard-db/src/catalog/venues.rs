use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::aggregate::{
    self, format_start_time, group_by_area, partition_shows, Area, LocatedVenue, SearchResults,
    ShowSlot, Summary, Timeline,
};
use super::{name_like, non_blank, require};
use crate::entities::{artist, show, venue};
use crate::error::{CatalogError, CatalogResult};
use crate::genres;

/// Every mutable venue field. Edits overwrite all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

impl VenueInput {
    /// Trim text, drop blank optionals and reject blank required fields.
    pub fn normalized(self) -> CatalogResult<Self> {
        Ok(Self {
            name: require("name", &self.name)?,
            city: require("city", &self.city)?,
            state: require("state", &self.state)?,
            address: require("address", &self.address)?,
            phone: non_blank(self.phone),
            image_link: non_blank(self.image_link),
            facebook_link: non_blank(self.facebook_link),
            website: non_blank(self.website),
            seeking_talent: self.seeking_talent,
            seeking_description: non_blank(self.seeking_description),
            genres: genres::decode(&genres::encode(&self.genres)),
        })
    }

    fn write_to(self, active: &mut venue::ActiveModel) {
        active.name = Set(self.name);
        active.city = Set(self.city);
        active.state = Set(self.state);
        active.address = Set(self.address);
        active.phone = Set(self.phone);
        active.image_link = Set(self.image_link);
        active.facebook_link = Set(self.facebook_link);
        active.website = Set(self.website);
        active.seeking_talent = Set(self.seeking_talent);
        active.seeking_description = Set(self.seeking_description);
        active.genres = Set(genres::encode(&self.genres));
    }
}

impl From<&venue::Model> for VenueInput {
    fn from(v: &venue::Model) -> Self {
        Self {
            name: v.name.clone(),
            city: v.city.clone(),
            state: v.state.clone(),
            address: v.address.clone(),
            phone: v.phone.clone(),
            image_link: v.image_link.clone(),
            facebook_link: v.facebook_link.clone(),
            website: v.website.clone(),
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description.clone(),
            genres: v.genre_list(),
        }
    }
}

/// An artist booked at the venue, as listed on the venue page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistAppearance {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    #[serde(flatten)]
    pub shows: Timeline<ArtistAppearance>,
}

impl VenueDetail {
    fn new(v: venue::Model, shows: Timeline<ArtistAppearance>) -> Self {
        Self {
            genres: v.genre_list(),
            id: v.id,
            name: v.name,
            address: v.address,
            city: v.city,
            state: v.state,
            phone: v.phone,
            website: v.website,
            facebook_link: v.facebook_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
            image_link: v.image_link,
            shows,
        }
    }
}

pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> CatalogResult<venue::Model> {
    venue::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(CatalogError::venue_not_found(id))
}

/// All venues grouped by city and state, each with its upcoming show count.
pub async fn list_areas<C: ConnectionTrait>(db: &C, now: NaiveDateTime) -> CatalogResult<Vec<Area>> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::State)
        .order_by_asc(venue::Column::City)
        .order_by_asc(venue::Column::Id)
        .all(db)
        .await?;

    let counts = upcoming_counts(db, venues.iter().map(|v| v.id).collect(), now).await?;

    Ok(group_by_area(venues.into_iter().map(|v| LocatedVenue {
        venue: Summary {
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            id: v.id,
            name: v.name,
        },
        city: v.city,
        state: v.state,
    })))
}

/// Case-insensitive substring search on the venue name.
pub async fn search<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: NaiveDateTime,
) -> CatalogResult<SearchResults> {
    let Some(pattern) = aggregate::like_pattern(term) else {
        return Ok(SearchResults::empty());
    };

    let matches = venue::Entity::find()
        .filter(name_like(venue::Column::Name, pattern))
        .order_by_asc(venue::Column::Id)
        .all(db)
        .await?;

    let counts = upcoming_counts(db, matches.iter().map(|v| v.id).collect(), now).await?;

    Ok(SearchResults::from_summaries(
        matches
            .into_iter()
            .map(|v| Summary {
                num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
                id: v.id,
                name: v.name,
            })
            .collect(),
    ))
}

/// Venue page: the venue plus its shows split into past and upcoming.
pub async fn detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
    now: NaiveDateTime,
) -> CatalogResult<VenueDetail> {
    let venue = find(db, id).await?;

    let rows = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .order_by_asc(show::Column::StartTime)
        .order_by_asc(show::Column::Id)
        .find_also_related(artist::Entity)
        .all(db)
        .await?;

    let slots = rows.into_iter().map(|(s, a)| {
        ShowSlot::new(
            s.start_time,
            a.map(|a| ArtistAppearance {
                artist_id: a.id,
                artist_name: a.name,
                artist_image_link: a.image_link,
                start_time: format_start_time(s.start_time),
            }),
        )
    });

    Ok(VenueDetail::new(venue, partition_shows(slots, now)))
}

pub async fn create<C: ConnectionTrait>(db: &C, input: VenueInput) -> CatalogResult<venue::Model> {
    let input = input.normalized()?;

    let mut active = venue::ActiveModel {
        ..Default::default()
    };
    input.write_to(&mut active);
    let created = active.insert(db).await?;

    tracing::info!(venue_id = created.id, name = %created.name, "venue listed");
    Ok(created)
}

/// Overwrite every mutable field of an existing venue.
pub async fn update<C>(db: &C, id: i32, input: VenueInput) -> CatalogResult<venue::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let input = input.normalized()?;

    let txn = db.begin().await?;
    let mut active: venue::ActiveModel = find(&txn, id).await?.into();
    input.write_to(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id = id, "venue updated");
    Ok(updated)
}

/// Delete a venue. Its shows go with it (`ON DELETE CASCADE`).
pub async fn delete<C>(db: &C, id: i32) -> CatalogResult<venue::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let existing = find(&txn, id).await?;
    venue::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id = id, name = %existing.name, "venue deleted");
    Ok(existing)
}

/// Upcoming show counts keyed by venue id. Venues without shows are absent.
async fn upcoming_counts<C: ConnectionTrait>(
    db: &C,
    venue_ids: Vec<i32>,
    now: NaiveDateTime,
) -> CatalogResult<HashMap<i32, u64>> {
    if venue_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = show::Entity::find()
        .filter(show::Column::VenueId.is_in(venue_ids))
        .find_also_related(artist::Entity)
        .all(db)
        .await?;

    let mut slots: HashMap<i32, Vec<ShowSlot<artist::Model>>> = HashMap::new();
    for (s, a) in rows {
        slots
            .entry(s.venue_id)
            .or_default()
            .push(ShowSlot::new(s.start_time, a));
    }

    Ok(slots
        .into_iter()
        .map(|(id, shows)| (id, aggregate::count_upcoming(&shows, now)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use serde_json::json;

    fn musical_hop() -> venue::Model {
        venue::Model {
            id: 1,
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: Some("123-123-1234".into()),
            image_link: None,
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
            website: Some("https://www.themusicalhop.com".into()),
            seeking_talent: true,
            seeking_description: Some("We are on the lookout for a local artist.".into()),
            genres: json!(["Jazz", "Reggae", "Swing", "Classical", "Folk"]),
        }
    }

    fn input() -> VenueInput {
        VenueInput {
            name: "  The Musical Hop ".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: Some("".into()),
            genres: vec!["Jazz".into(), " ".into(), "Folk".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_normalized_trims_and_drops_blanks() {
        let normalized = input().normalized().unwrap();
        assert_eq!(normalized.name, "The Musical Hop");
        assert_eq!(normalized.phone, None);
        assert_eq!(normalized.genres, vec!["Jazz", "Folk"]);
    }

    #[test]
    fn test_normalized_rejects_blank_address() {
        let mut bad = input();
        bad.address = "   ".into();
        let err = bad.normalized().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref m) if m.contains("address")));
    }

    #[test]
    fn test_input_from_model_round_trips_genres() {
        let form = VenueInput::from(&musical_hop());
        assert_eq!(form.genres, vec!["Jazz", "Reggae", "Swing", "Classical", "Folk"]);
        assert!(form.seeking_talent);
    }

    #[test]
    fn test_detail_serialization_flattens_timeline() {
        let detail = VenueDetail::new(
            musical_hop(),
            partition_shows(
                vec![ShowSlot::new(
                    chrono::NaiveDate::from_ymd_opt(2019, 5, 21)
                        .unwrap()
                        .and_hms_opt(21, 30, 0)
                        .unwrap(),
                    Some(ArtistAppearance {
                        artist_id: 4,
                        artist_name: "Guns N Petals".into(),
                        artist_image_link: None,
                        start_time: "2019-05-21 21:30:00".into(),
                    }),
                )],
                super::super::now(),
            ),
        );
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["genres"][0], "Jazz");
        assert_eq!(json["past_shows"][0]["artist_id"], 4);
        assert_eq!(json["past_shows"][0]["start_time"], "2019-05-21 21:30:00");
        assert_eq!(json["past_shows_count"], 1);
        assert_eq!(json["upcoming_shows_count"], 0);
        assert!(json.get("shows").is_none());
    }

    #[tokio::test]
    async fn test_find_missing_venue_is_not_found() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();

        let err = find(&db, 999).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { entity: "venue", id: 999 }));
    }

    #[tokio::test]
    async fn test_list_areas_without_venues_is_empty() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();

        let areas = list_areas(&db, super::super::now()).await.unwrap();
        assert!(areas.is_empty());
    }

    #[tokio::test]
    async fn test_search_blank_term_skips_the_store() {
        let db = DatabaseConnection::Disconnected;
        for term in ["", "   ", "\t\n"] {
            let results = search(&db, term, super::super::now()).await.unwrap();
            assert_eq!(results, SearchResults::empty());
        }
    }

    #[tokio::test]
    async fn test_search_store_failure_surfaces() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("connection lost".into())])
            .into_connection();

        let err = search(&db, "hop", super::super::now()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_before_writing() {
        let db = DatabaseConnection::Disconnected;
        let mut bad = input();
        bad.name = String::new();
        let err = create(&db, bad).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_returns_inserted_row() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![musical_hop()]])
            .into_connection();

        let created = create(&db, input()).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.name, "The Musical Hop");
    }

    #[tokio::test]
    async fn test_update_missing_venue_is_not_found() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();

        let err = update(&db, 42, input()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { entity: "venue", id: 42 }));
    }

    #[tokio::test]
    async fn test_delete_existing_venue() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![musical_hop()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let deleted = delete(&db, 1).await.unwrap();
        assert_eq!(deleted.name, "The Musical Hop");
    }

    #[tokio::test]
    async fn test_delete_missing_venue_is_not_found() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();

        let err = delete(&db, 7).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2026, 1, 1, 12)
    }

    fn venue_at(id: i32, name: &str, city: &str, state: &str) -> venue::Model {
        venue::Model {
            id,
            name: name.into(),
            city: city.into(),
            state: state.into(),
            ..musical_hop()
        }
    }

    fn guns_n_petals() -> artist::Model {
        artist::Model {
            id: 4,
            name: "Guns N Petals".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: None,
            image_link: Some("https://img.example.com/gnp.jpg".into()),
            facebook_link: None,
            website: None,
            seeking_venue: true,
            seeking_description: None,
            genres: json!(["Rock n Roll"]),
        }
    }

    fn booking(id: i32, venue_id: i32, start_time: NaiveDateTime) -> show::Model {
        show::Model {
            id,
            artist_id: 4,
            venue_id,
            start_time,
        }
    }

    #[tokio::test]
    async fn test_list_areas_groups_and_counts_upcoming() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                venue_at(1, "The Musical Hop", "San Francisco", "CA"),
                venue_at(3, "Park Square Live Music & Coffee", "San Francisco", "CA"),
                venue_at(2, "The Dueling Pianos Bar", "New York", "NY"),
            ]])
            .append_query_results([vec![
                // Upcoming, but the artist did not resolve.
                (booking(1, 1, at(2035, 4, 1, 20)), None),
                (booking(2, 3, at(2035, 4, 1, 20)), Some(guns_n_petals())),
                (booking(3, 3, at(2019, 6, 15, 23)), Some(guns_n_petals())),
                (booking(4, 3, now()), Some(guns_n_petals())),
            ]])
            .into_connection();

        let areas = list_areas(&db, now()).await.unwrap();
        assert_eq!(
            areas,
            vec![
                Area {
                    city: "San Francisco".into(),
                    state: "CA".into(),
                    venues: vec![
                        Summary {
                            id: 1,
                            name: "The Musical Hop".into(),
                            num_upcoming_shows: 0,
                        },
                        Summary {
                            id: 3,
                            name: "Park Square Live Music & Coffee".into(),
                            num_upcoming_shows: 1,
                        },
                    ],
                },
                Area {
                    city: "New York".into(),
                    state: "NY".into(),
                    venues: vec![Summary {
                        id: 2,
                        name: "The Dueling Pianos Bar".into(),
                        num_upcoming_shows: 0,
                    }],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_counts_upcoming() {
        for term in ["hop", "HOP"] {
            let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![musical_hop()]])
                .append_query_results([vec![
                    (booking(1, 1, at(2035, 4, 1, 20)), Some(guns_n_petals())),
                    (booking(2, 1, at(2019, 5, 21, 21)), Some(guns_n_petals())),
                ]])
                .into_connection();

            let results = search(&db, term, now()).await.unwrap();
            assert_eq!(results.count, 1);
            assert_eq!(results.data[0].id, 1);
            assert_eq!(results.data[0].num_upcoming_shows, 1);

            let log = format!("{:?}", db.into_transaction_log());
            assert!(log.contains("LOWER"), "{log}");
            assert!(log.contains("LIKE $1"), "{log}");
            assert!(log.contains("%hop%"), "{log}");
        }
    }

    #[tokio::test]
    async fn test_detail_splits_past_and_upcoming() {
        let db: DatabaseConnection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![musical_hop()]])
            .append_query_results([vec![
                (booking(1, 1, at(2019, 5, 21, 21)), Some(guns_n_petals())),
                (booking(2, 1, now()), Some(guns_n_petals())),
                (booking(3, 1, at(2035, 4, 1, 20)), Some(guns_n_petals())),
                (booking(4, 1, at(2035, 4, 8, 20)), None),
            ]])
            .into_connection();

        let detail = detail(&db, 1, now()).await.unwrap();
        assert_eq!(detail.shows.past_shows_count, 2);
        assert_eq!(detail.shows.upcoming_shows_count, 1);
        assert_eq!(detail.shows.past_shows[0].artist_id, 4);
        assert_eq!(detail.shows.past_shows[0].start_time, "2019-05-21 21:00:00");
        assert_eq!(detail.shows.upcoming_shows[0].start_time, "2035-04-01 20:00:00");
        assert_eq!(
            detail.shows.upcoming_shows[0].artist_image_link.as_deref(),
            Some("https://img.example.com/gnp.jpg")
        );
    }
}
