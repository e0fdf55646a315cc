use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::SharedPhoto;

/// Earliest and latest capture time over a set of photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

impl DateSpan {
    /// Single pass over `times`; `None` when there are none.
    pub fn of(times: impl IntoIterator<Item = NaiveDateTime>) -> Option<Self> {
        let mut times = times.into_iter();
        let first = times.next()?;
        let mut span = DateSpan {
            earliest: first,
            latest: first,
        };
        for at in times {
            if at < span.earliest {
                span.earliest = at;
            }
            if at > span.latest {
                span.latest = at;
            }
        }
        Some(span)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.earliest.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.latest.date()
    }
}

/// A named, ordered collection of photos.
///
/// Two albums are equal when their names are equal, whatever they contain.
#[derive(Debug, Clone)]
pub struct Album {
    name: String,
    photos: Vec<SharedPhoto>,
}

impl Album {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photos: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overwrite the name. The owning user must already have checked that
    /// no sibling album uses `name`.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Photos in display (insertion) order.
    pub fn photos(&self) -> &[SharedPhoto] {
        &self.photos
    }

    pub fn count(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.photos.iter().any(|p| p.borrow().path() == path)
    }

    pub fn find_photo(&self, path: &str) -> Option<SharedPhoto> {
        self.photos
            .iter()
            .find(|p| p.borrow().path() == path)
            .cloned()
    }

    /// Append a photo.
    ///
    /// No duplicate check happens here: callers must reject a photo whose
    /// path is already in the album (see [`Album::contains_path`]).
    pub fn add_photo(&mut self, photo: SharedPhoto) {
        self.photos.push(photo);
    }

    /// Remove this exact photo instance. Returns whether it was held.
    pub fn remove_photo(&mut self, photo: &SharedPhoto) -> bool {
        match self.photos.iter().position(|p| Rc::ptr_eq(p, photo)) {
            Some(index) => {
                self.photos.remove(index);
                true
            }
            None => false,
        }
    }

    /// Capture-time span of the album, `None` when it has no photos.
    pub fn date_range(&self) -> Option<DateSpan> {
        DateSpan::of(self.photos.iter().map(|p| p.borrow().captured_at()))
    }
}

impl PartialEq for Album {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Album {}

impl Hash for Album {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Album Name: {}  ({} photos)", self.name, self.photos.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Photo;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_equality_is_by_name_only() {
        let mut a = Album::new("Trip");
        a.add_photo(Photo::new("/img/a.jpg", at(1, 9)).into_shared());
        let b = Album::new("Trip");
        assert_eq!(a, b);
        assert_ne!(a, Album::new("Home"));
    }

    #[test]
    fn test_date_range_empty_album() {
        assert!(Album::new("Empty").date_range().is_none());
    }

    #[test]
    fn test_date_range_spans_min_and_max() {
        let mut album = Album::new("Trip");
        album.add_photo(Photo::new("/img/b.jpg", at(5, 12)).into_shared());
        album.add_photo(Photo::new("/img/a.jpg", at(2, 8)).into_shared());
        album.add_photo(Photo::new("/img/c.jpg", at(9, 18)).into_shared());

        let span = album.date_range().unwrap();
        assert_eq!(span.earliest, at(2, 8));
        assert_eq!(span.latest, at(9, 18));
        assert_eq!(span.first_day(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut album = Album::new("Trip");
        for path in ["/img/3.jpg", "/img/1.jpg", "/img/2.jpg"] {
            album.add_photo(Photo::new(path, at(1, 0)).into_shared());
        }
        let paths: Vec<String> = album
            .photos()
            .iter()
            .map(|p| p.borrow().path().to_string())
            .collect();
        assert_eq!(paths, vec!["/img/3.jpg", "/img/1.jpg", "/img/2.jpg"]);
        assert_eq!(album.count(), 3);
    }

    #[test]
    fn test_remove_photo_by_instance() {
        let mut album = Album::new("Trip");
        let kept = Photo::new("/img/a.jpg", at(1, 0)).into_shared();
        let removed = Photo::new("/img/b.jpg", at(1, 0)).into_shared();
        album.add_photo(Rc::clone(&kept));
        album.add_photo(Rc::clone(&removed));

        // Same path, different instance: not held by the album.
        let lookalike = Photo::new("/img/b.jpg", at(1, 0)).into_shared();
        assert!(!album.remove_photo(&lookalike));

        assert!(album.remove_photo(&removed));
        assert!(!album.remove_photo(&removed));
        assert_eq!(album.count(), 1);
        assert!(album.contains_path("/img/a.jpg"));
        assert!(!album.contains_path("/img/b.jpg"));
    }

    #[test]
    fn test_display() {
        let mut album = Album::new("Trip");
        album.add_photo(Photo::new("/img/a.jpg", at(1, 0)).into_shared());
        assert_eq!(album.to_string(), "Album Name: Trip  (1 photos)");
    }
}
