use chrono::NaiveDateTime;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

use super::Tag;

/// A photo shared between every album that holds it.
///
/// Copying a photo into a second album clones the `Rc`, so a caption or tag
/// edit made through one album is visible through the other.
pub type SharedPhoto = Rc<RefCell<Photo>>;

/// A photo stored in one or more albums
#[derive(Debug, Clone)]
pub struct Photo {
    path: String,
    captured_at: NaiveDateTime,
    caption: String,
    tags: BTreeSet<Tag>,
}

impl Photo {
    pub fn new(path: impl Into<String>, captured_at: NaiveDateTime) -> Self {
        Self {
            path: path.into(),
            captured_at,
            caption: String::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn into_shared(self) -> SharedPhoto {
        Rc::new(RefCell::new(self))
    }

    /// Path of the image file; identifies the photo for duplicate checks.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.path).file_name().and_then(|n| n.to_str())
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    /// Caption text, empty when none was set.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Add a tag. Returns `false` when an equal tag was already present.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        self.tags.insert(tag)
    }

    /// Remove a tag. Returns whether the tag was present.
    pub fn remove_tag(&mut self, tag: &Tag) -> bool {
        self.tags.remove(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn photo() -> Photo {
        let at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        Photo::new("/img/beach.jpg", at)
    }

    #[test]
    fn test_new_photo_defaults() {
        let p = photo();
        assert_eq!(p.path(), "/img/beach.jpg");
        assert_eq!(p.file_name(), Some("beach.jpg"));
        assert_eq!(p.caption(), "");
        assert!(p.tags().is_empty());
    }

    #[test]
    fn test_add_tag_is_idempotent() {
        let mut p = photo();
        assert!(p.add_tag(Tag::new("Location", "Paris")));
        assert!(!p.add_tag(Tag::new("Location", "Paris")));
        assert_eq!(p.tags().len(), 1);

        p.add_tag(Tag::new("Location", "Rome"));
        assert_eq!(p.tags().len(), 2);
    }

    #[test]
    fn test_remove_tag_reports_presence() {
        let mut p = photo();
        let tag = Tag::new("Person", "Alice");
        assert!(!p.remove_tag(&tag));

        p.add_tag(tag.clone());
        assert!(p.has_tag(&tag));
        assert!(p.remove_tag(&tag));
        assert!(!p.has_tag(&tag));
    }

    #[test]
    fn test_caption_overwrite() {
        let mut p = photo();
        p.set_caption("sunset");
        p.set_caption("sunrise");
        assert_eq!(p.caption(), "sunrise");
    }

    #[test]
    fn test_shared_photo_edits_are_visible_through_aliases() {
        let shared = photo().into_shared();
        let alias = Rc::clone(&shared);
        alias.borrow_mut().set_caption("shared");
        assert_eq!(shared.borrow().caption(), "shared");
    }
}
