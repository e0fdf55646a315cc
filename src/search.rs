//! Search over a user's photos.
//!
//! Every search is a linear scan of all photos in all of the user's albums,
//! in album order then photo order. Results are deduplicated by path, so a
//! photo held by several albums (or two photos pointing at the same file)
//! appears once, at the position it was first seen.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::model::{DateSpan, Photo, SharedPhoto, Tag, User};

/// Seconds from midnight to 23:59:59.
const LAST_SECOND_OF_DAY: i64 = 24 * 60 * 60 - 1;

/// How two tags combine in [`search_by_two_tags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// Both tags on the same photo
    And,
    /// At least one of the tags
    Or,
}

impl TagMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagMatch::And => "AND",
            TagMatch::Or => "OR",
        }
    }

    fn matches(&self, first: bool, second: bool) -> bool {
        match self {
            TagMatch::And => first && second,
            TagMatch::Or => first || second,
        }
    }
}

impl fmt::Display for TagMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(TagMatch::And),
            "or" => Ok(TagMatch::Or),
            other => Err(format!("unknown tag condition '{}', expected AND or OR", other)),
        }
    }
}

/// A search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    DateRange { start: NaiveDate, end: NaiveDate },
    Tag(Tag),
    TwoTags { first: Tag, second: Tag, mode: TagMatch },
}

fn trimmed_tag(tag: &Tag) -> Tag {
    Tag::new(tag.key().trim(), tag.value().trim())
}

impl SearchQuery {
    /// The same query with tag keys and values trimmed, as tags are stored.
    pub fn trimmed(&self) -> SearchQuery {
        match self {
            SearchQuery::DateRange { .. } => self.clone(),
            SearchQuery::Tag(tag) => SearchQuery::Tag(trimmed_tag(tag)),
            SearchQuery::TwoTags { first, second, mode } => SearchQuery::TwoTags {
                first: trimmed_tag(first),
                second: trimmed_tag(second),
                mode: *mode,
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SearchQuery::DateRange { start, end } => format!("captured {} to {}", start, end),
            SearchQuery::Tag(tag) => format!("tagged {}", tag),
            SearchQuery::TwoTags { first, second, mode } => {
                format!("tagged {} {} {}", first, mode, second)
            }
        }
    }
}

/// Run any query.
pub fn search(user: &User, query: &SearchQuery) -> Vec<SharedPhoto> {
    let results = match query {
        SearchQuery::DateRange { start, end } => search_by_date_range(user, *start, *end),
        SearchQuery::Tag(tag) => search_by_tag(user, tag),
        SearchQuery::TwoTags { first, second, mode } => {
            search_by_two_tags(user, first, second, *mode)
        }
    };
    tracing::debug!(
        user = %user.username(),
        query = %query.describe(),
        results = results.len(),
        "Search finished"
    );
    results
}

/// Photos captured between 00:00:00 on `start` and 23:59:59 on `end`,
/// both bounds inclusive.
pub fn search_by_date_range(user: &User, start: NaiveDate, end: NaiveDate) -> Vec<SharedPhoto> {
    let (from, to) = day_bounds(start, end);
    scan(user, |photo| {
        let at = photo.captured_at();
        at >= from && at <= to
    })
}

/// Photos carrying a tag structurally equal to `tag`.
pub fn search_by_tag(user: &User, tag: &Tag) -> Vec<SharedPhoto> {
    scan(user, |photo| photo.has_tag(tag))
}

pub fn search_by_two_tags(
    user: &User,
    first: &Tag,
    second: &Tag,
    mode: TagMatch,
) -> Vec<SharedPhoto> {
    scan(user, |photo| mode.matches(photo.has_tag(first), photo.has_tag(second)))
}

/// Keep the first photo seen for each path, preserving order.
pub fn dedup_by_path(photos: Vec<SharedPhoto>) -> Vec<SharedPhoto> {
    let mut seen = HashSet::new();
    photos
        .into_iter()
        .filter(|photo| seen.insert(photo.borrow().path().to_string()))
        .collect()
}

/// Every distinct tag across the user's photos, for choice lists.
pub fn available_tags(user: &User) -> BTreeSet<Tag> {
    user.photos()
        .flat_map(|photo| photo.borrow().tags().iter().cloned().collect::<Vec<_>>())
        .collect()
}

/// `"key: value"` labels of [`available_tags`], for display only.
pub fn available_tag_labels(user: &User) -> Vec<String> {
    available_tags(user).iter().map(Tag::label).collect()
}

/// Capture-time span over all of the user's photos, `None` when they have
/// none. Used as a hint for date-range searches.
pub fn date_bounds(user: &User) -> Option<DateSpan> {
    DateSpan::of(user.photos().map(|p| p.borrow().captured_at()))
}

fn day_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let from = start.and_time(NaiveTime::MIN);
    let to = end
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::seconds(LAST_SECOND_OF_DAY))
        .unwrap_or(NaiveDateTime::MAX);
    (from, to)
}

fn scan(user: &User, mut matches: impl FnMut(&Photo) -> bool) -> Vec<SharedPhoto> {
    let hits = user
        .photos()
        .filter(|photo| matches(&*photo.borrow()))
        .cloned()
        .collect();
    dedup_by_path(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn photo(path: &str, captured_at: NaiveDateTime, tags: &[(&str, &str)]) -> SharedPhoto {
        let mut p = Photo::new(path, captured_at);
        for (k, v) in tags {
            p.add_tag(Tag::new(*k, *v));
        }
        p.into_shared()
    }

    fn user_with(album: &str, photos: Vec<SharedPhoto>) -> User {
        let mut user = User::new("alice");
        user.create_album(album);
        let target = user.album_mut(album).unwrap();
        for p in photos {
            target.add_photo(p);
        }
        user
    }

    fn paths(photos: &[SharedPhoto]) -> Vec<String> {
        photos.iter().map(|p| p.borrow().path().to_string()).collect()
    }

    fn tagged_user() -> User {
        let noon = at(2024, 1, 10, 12, 0, 0);
        user_with(
            "All",
            vec![
                photo("/p1.jpg", noon, &[("Location", "Paris"), ("Person", "Alice")]),
                photo("/p2.jpg", noon, &[("Location", "Paris")]),
                photo("/p3.jpg", noon, &[("Person", "Alice")]),
                photo("/p4.jpg", noon, &[("Person", "Bob")]),
            ],
        )
    }

    #[test]
    fn test_date_range_bounds_are_inclusive_whole_days() {
        let user = user_with(
            "Jan",
            vec![
                photo("/before.jpg", at(2023, 12, 31, 23, 59, 59), &[]),
                photo("/first.jpg", at(2024, 1, 1, 0, 0, 0), &[]),
                photo("/mid.jpg", at(2024, 1, 15, 9, 30, 0), &[]),
                photo("/last.jpg", at(2024, 1, 31, 23, 59, 59), &[]),
                photo("/after.jpg", at(2024, 2, 1, 0, 0, 0), &[]),
            ],
        );

        let results = search_by_date_range(&user, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(paths(&results), vec!["/first.jpg", "/mid.jpg", "/last.jpg"]);
    }

    #[test]
    fn test_date_range_single_day() {
        let user = user_with(
            "Day",
            vec![
                photo("/morning.jpg", at(2024, 6, 1, 6, 0, 0), &[]),
                photo("/next.jpg", at(2024, 6, 2, 6, 0, 0), &[]),
            ],
        );
        let results = search_by_date_range(&user, date(2024, 6, 1), date(2024, 6, 1));
        assert_eq!(paths(&results), vec!["/morning.jpg"]);
    }

    #[test]
    fn test_date_range_reversed_is_empty() {
        let user = user_with("Day", vec![photo("/a.jpg", at(2024, 6, 1, 6, 0, 0), &[])]);
        assert!(search_by_date_range(&user, date(2024, 6, 2), date(2024, 5, 1)).is_empty());
    }

    #[test]
    fn test_single_tag() {
        let user = tagged_user();
        let results = search_by_tag(&user, &Tag::new("Person", "Alice"));
        assert_eq!(paths(&results), vec!["/p1.jpg", "/p3.jpg"]);

        assert!(search_by_tag(&user, &Tag::new("Person", "Carol")).is_empty());
    }

    #[test]
    fn test_two_tags_and() {
        let user = tagged_user();
        let results = search_by_two_tags(
            &user,
            &Tag::new("Location", "Paris"),
            &Tag::new("Person", "Alice"),
            TagMatch::And,
        );
        assert_eq!(paths(&results), vec!["/p1.jpg"]);
    }

    #[test]
    fn test_two_tags_or() {
        let user = tagged_user();
        let results = search_by_two_tags(
            &user,
            &Tag::new("Location", "Paris"),
            &Tag::new("Person", "Alice"),
            TagMatch::Or,
        );
        assert_eq!(paths(&results), vec!["/p1.jpg", "/p2.jpg", "/p3.jpg"]);
    }

    #[test]
    fn test_duplicate_paths_collapse_to_first_seen() {
        let noon = at(2024, 1, 10, 12, 0, 0);
        let first = photo("/img/a.jpg", noon, &[("Person", "Alice")]);
        let second = photo("/img/a.jpg", noon, &[("Person", "Alice")]);

        let mut user = User::new("alice");
        user.create_album("One");
        user.create_album("Two");
        user.album_mut("One").unwrap().add_photo(Rc::clone(&first));
        user.album_mut("Two").unwrap().add_photo(second);

        let results = search_by_tag(&user, &Tag::new("Person", "Alice"));
        assert_eq!(results.len(), 1);
        assert!(Rc::ptr_eq(&results[0], &first));
    }

    #[test]
    fn test_shared_photo_reported_once() {
        let shared = photo("/img/a.jpg", at(2024, 1, 10, 12, 0, 0), &[]);
        let mut user = User::new("alice");
        user.create_album("One");
        user.create_album("Two");
        user.album_mut("One").unwrap().add_photo(Rc::clone(&shared));
        user.album_mut("Two").unwrap().add_photo(shared);

        let results = search_by_date_range(&user, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_available_tags_are_structured_and_distinct() {
        let user = tagged_user();
        let tags: Vec<Tag> = available_tags(&user).into_iter().collect();
        assert_eq!(
            tags,
            vec![
                Tag::new("Location", "Paris"),
                Tag::new("Person", "Alice"),
                Tag::new("Person", "Bob"),
            ]
        );
        assert_eq!(
            available_tag_labels(&user),
            vec!["Location: Paris", "Person: Alice", "Person: Bob"]
        );
    }

    #[test]
    fn test_date_bounds() {
        let user = user_with(
            "Mixed",
            vec![
                photo("/b.jpg", at(2024, 3, 5, 0, 0, 0), &[]),
                photo("/a.jpg", at(2023, 7, 1, 0, 0, 0), &[]),
            ],
        );
        let span = date_bounds(&user).unwrap();
        assert_eq!(span.first_day(), date(2023, 7, 1));
        assert_eq!(span.last_day(), date(2024, 3, 5));
        assert!(date_bounds(&User::new("empty")).is_none());
    }

    #[test]
    fn test_search_dispatch() {
        let user = tagged_user();
        let query = SearchQuery::TwoTags {
            first: Tag::new("Person", "Alice"),
            second: Tag::new("Person", "Bob"),
            mode: TagMatch::Or,
        };
        assert_eq!(paths(&search(&user, &query)), vec!["/p1.jpg", "/p3.jpg", "/p4.jpg"]);
        assert_eq!(query.describe(), "tagged Person: Alice OR Person: Bob");
    }

    #[test]
    fn test_tag_match_parse() {
        assert_eq!("AND".parse::<TagMatch>(), Ok(TagMatch::And));
        assert_eq!("or".parse::<TagMatch>(), Ok(TagMatch::Or));
        assert!("xor".parse::<TagMatch>().is_err());
    }
}
