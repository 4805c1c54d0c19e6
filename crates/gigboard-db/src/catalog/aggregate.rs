//! Pure aggregation over query results: upcoming/past classification,
//! per-entity upcoming counts, and the city/state grouping used by the
//! venue index.
//!
//! Nothing here touches the database. "Now" is always passed in so a single
//! response is classified against one instant.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};

/// Fixed wire format of a show's start time, both submitted and rendered.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_start_time(raw: &str) -> CatalogResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), START_TIME_FORMAT).map_err(|e| {
        CatalogError::validation(format!(
            "start_time '{}' is not in YYYY-MM-DD HH:MM:SS format ({e})",
            raw.trim()
        ))
    })
}

pub fn format_start_time(start_time: NaiveDateTime) -> String {
    start_time.format(START_TIME_FORMAT).to_string()
}

/// A show starting exactly at `now` is already past.
pub fn is_upcoming(start_time: NaiveDateTime, now: NaiveDateTime) -> bool {
    start_time > now
}

/// One show as seen from its venue or its artist.
///
/// `counterpart` is the other side of the booking; `None` when it did not
/// resolve, in which case the show is left out of every count and list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowSlot<T> {
    pub start_time: NaiveDateTime,
    pub counterpart: Option<T>,
}

impl<T> ShowSlot<T> {
    pub fn new(start_time: NaiveDateTime, counterpart: Option<T>) -> Self {
        Self {
            start_time,
            counterpart,
        }
    }
}

pub fn count_upcoming<T>(shows: &[ShowSlot<T>], now: NaiveDateTime) -> u64 {
    shows
        .iter()
        .filter(|s| s.counterpart.is_some() && is_upcoming(s.start_time, now))
        .count() as u64
}

/// Shows split into past and upcoming. The counts are always the list
/// lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline<T: Serialize> {
    pub past_shows: Vec<T>,
    pub upcoming_shows: Vec<T>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

pub fn partition_shows<T, I>(shows: I, now: NaiveDateTime) -> Timeline<T>
where
    T: Serialize,
    I: IntoIterator<Item = ShowSlot<T>>,
{
    let mut past_shows = Vec::new();
    let mut upcoming_shows = Vec::new();

    for slot in shows {
        let Some(counterpart) = slot.counterpart else {
            continue;
        };
        if is_upcoming(slot.start_time, now) {
            upcoming_shows.push(counterpart);
        } else {
            past_shows.push(counterpart);
        }
    }

    Timeline {
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    }
}

/// Row shape shared by the venue index and both search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// A venue summary tagged with where it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedVenue {
    pub city: String,
    pub state: String,
    pub venue: Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<Summary>,
}

/// Group venues into areas in a single pass.
///
/// The input must already be sorted by (state, city): a new area starts
/// whenever the pair differs from the previous venue's.
pub fn group_by_area<I>(venues: I) -> Vec<Area>
where
    I: IntoIterator<Item = LocatedVenue>,
{
    let mut areas: Vec<Area> = Vec::new();

    for located in venues {
        match areas.last_mut() {
            Some(area) if area.city == located.city && area.state == located.state => {
                area.venues.push(located.venue);
            }
            _ => areas.push(Area {
                city: located.city,
                state: located.state,
                venues: vec![located.venue],
            }),
        }
    }

    areas
}

/// `{count, data}` search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<Summary>,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self {
            count: 0,
            data: Vec::new(),
        }
    }

    pub fn from_summaries(data: Vec<Summary>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Build a lower-cased `LIKE` pattern for a substring search, or `None` when
/// the term is empty or whitespace only.
///
/// `\`, `%` and `_` are escaped with a backslash so they match literally.
pub fn like_pattern(term: &str) -> Option<String> {
    if term.trim().is_empty() {
        return None;
    }
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2026, 1, 1, 12)
    }

    fn located(id: i32, city: &str, state: &str) -> LocatedVenue {
        LocatedVenue {
            city: city.into(),
            state: state.into(),
            venue: Summary {
                id,
                name: format!("Venue {id}"),
                num_upcoming_shows: 0,
            },
        }
    }

    #[test]
    fn test_parse_start_time_accepts_fixed_format() {
        let parsed = parse_start_time("2019-05-21 21:30:00").unwrap();
        assert_eq!(format_start_time(parsed), "2019-05-21 21:30:00");
    }

    #[test]
    fn test_parse_start_time_trims_whitespace() {
        assert!(parse_start_time("  2035-04-01 20:00:00\n").is_ok());
    }

    #[test]
    fn test_parse_start_time_rejects_other_formats() {
        for raw in ["2019-05-21T21:30:00", "2019-05-21", "21/05/2019 21:30:00", ""] {
            let err = parse_start_time(raw).unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)), "{raw}");
        }
    }

    #[test]
    fn test_is_upcoming_boundary() {
        assert!(!is_upcoming(now(), now()));
        assert!(is_upcoming(now() + chrono::Duration::seconds(1), now()));
        assert!(!is_upcoming(now() - chrono::Duration::seconds(1), now()));
    }

    #[test]
    fn test_count_upcoming_skips_unresolved_counterpart() {
        let shows = vec![
            ShowSlot::new(at(2035, 4, 1, 20), Some(())),
            ShowSlot::new(at(2035, 4, 8, 20), None),
            ShowSlot::new(at(2019, 5, 21, 21), Some(())),
        ];
        assert_eq!(count_upcoming(&shows, now()), 1);
    }

    #[test]
    fn test_count_upcoming_empty() {
        let shows: Vec<ShowSlot<()>> = Vec::new();
        assert_eq!(count_upcoming(&shows, now()), 0);
    }

    #[test]
    fn test_partition_every_resolved_show_lands_in_exactly_one_bucket() {
        let shows: Vec<ShowSlot<i32>> = (0..48)
            .map(|i| ShowSlot::new(at(2025, 12, 31, 0) + chrono::Duration::hours(i), Some(i as i32)))
            .collect();
        let timeline = partition_shows(shows, now());

        let past: HashSet<_> = timeline.past_shows.iter().copied().collect();
        let upcoming: HashSet<_> = timeline.upcoming_shows.iter().copied().collect();
        assert!(past.is_disjoint(&upcoming));
        assert_eq!(past.len() + upcoming.len(), 48);
        // 2025-12-31 00:00 + 36h == now, which counts as past
        assert!(past.contains(&36));
        assert!(upcoming.contains(&37));
    }

    #[test]
    fn test_partition_counts_match_lengths_and_skip_unresolved() {
        let shows = vec![
            ShowSlot::new(at(2019, 6, 15, 23), Some("Matt Quevedo")),
            ShowSlot::new(at(2035, 4, 1, 20), Some("The Wild Sax Band")),
            ShowSlot::new(at(2035, 4, 8, 20), Some("The Wild Sax Band")),
            ShowSlot::new(at(2035, 4, 15, 20), None),
        ];
        let timeline = partition_shows(shows, now());
        assert_eq!(timeline.past_shows, vec!["Matt Quevedo"]);
        assert_eq!(timeline.upcoming_shows.len(), 2);
        assert_eq!(timeline.past_shows_count, 1);
        assert_eq!(timeline.upcoming_shows_count, 2);
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let shows = vec![
            ShowSlot::new(at(2035, 4, 15, 20), Some(3)),
            ShowSlot::new(at(2035, 4, 1, 20), Some(1)),
            ShowSlot::new(at(2035, 4, 8, 20), Some(2)),
        ];
        let timeline = partition_shows(shows, now());
        assert_eq!(timeline.upcoming_shows, vec![3, 1, 2]);
    }

    #[test]
    fn test_group_by_area_empty() {
        assert!(group_by_area(Vec::new()).is_empty());
    }

    #[test]
    fn test_group_by_area_sorted_input() {
        let venues = vec![
            located(1, "San Francisco", "CA"),
            located(3, "San Francisco", "CA"),
            located(2, "New York", "NY"),
        ];
        let areas = group_by_area(venues);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "San Francisco");
        assert_eq!(
            areas[0].venues.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(areas[1].state, "NY");
        assert_eq!(areas[1].venues[0].id, 2);
    }

    #[test]
    fn test_group_by_area_same_state_different_cities() {
        let venues = vec![
            located(1, "Los Angeles", "CA"),
            located(2, "Oakland", "CA"),
            located(3, "Oakland", "CA"),
            located(4, "Austin", "TX"),
        ];
        let areas = group_by_area(venues);
        let keys: Vec<_> = areas
            .iter()
            .map(|a| (a.city.as_str(), a.state.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("Los Angeles", "CA"), ("Oakland", "CA"), ("Austin", "TX")]
        );
    }

    #[test]
    fn test_group_by_area_covers_each_venue_once_with_uniform_location() {
        let mut venues = Vec::new();
        let places = [("Boise", "ID"), ("Chicago", "IL"), ("Peoria", "IL"), ("Reno", "NV")];
        let mut id = 0;
        for (city, state) in places {
            for _ in 0..3 {
                id += 1;
                venues.push(located(id, city, state));
            }
        }
        let areas = group_by_area(venues.clone());

        let mut seen = Vec::new();
        for area in &areas {
            for v in &area.venues {
                let original = venues.iter().find(|l| l.venue.id == v.id).unwrap();
                assert_eq!(original.city, area.city);
                assert_eq!(original.state, area.state);
                seen.push(v.id);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=12).collect::<Vec<_>>());
        assert_eq!(areas.len(), places.len());
    }

    #[test]
    fn test_search_results_empty_shape() {
        let json = serde_json::to_value(SearchResults::empty()).unwrap();
        assert_eq!(json["count"], 0);
        assert!(json["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_like_pattern_blank_terms() {
        assert_eq!(like_pattern(""), None);
        assert_eq!(like_pattern("   \t\n"), None);
    }

    #[test]
    fn test_like_pattern_is_case_folded() {
        assert_eq!(like_pattern("HOP").as_deref(), Some("%hop%"));
        assert_eq!(like_pattern("hop"), like_pattern("Hop"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%").as_deref(), Some("%100\\%%"));
        assert_eq!(like_pattern("a_b").as_deref(), Some("%a\\_b%"));
        assert_eq!(like_pattern("a\\b").as_deref(), Some("%a\\\\b%"));
    }
}
