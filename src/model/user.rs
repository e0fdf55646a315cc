use std::collections::BTreeSet;

use super::{Album, SharedPhoto};

/// A user and the albums they own, in creation order.
#[derive(Debug, Clone)]
pub struct User {
    username: String,
    albums: Vec<Album>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            albums: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    /// Append an empty album.
    ///
    /// Does not check for an existing album with the same name; callers
    /// must look it up with [`User::album`] first.
    pub fn create_album(&mut self, name: impl Into<String>) {
        self.albums.push(Album::new(name));
    }

    /// Append an already populated album, under the same precondition as
    /// [`User::create_album`].
    pub fn push_album(&mut self, album: Album) {
        self.albums.push(album);
    }

    /// Rename the first album called `old`. Returns `false` if there is none.
    pub fn rename_album(&mut self, old: &str, new: impl Into<String>) -> bool {
        match self.album_mut(old) {
            Some(album) => {
                album.rename(new);
                true
            }
            None => false,
        }
    }

    /// Delete the first album called `name`. Returns `false` if there is none.
    pub fn delete_album(&mut self, name: &str) -> bool {
        match self.albums.iter().position(|a| a.name() == name) {
            Some(index) => {
                self.albums.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn album(&self, name: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.name() == name)
    }

    pub fn album_mut(&mut self, name: &str) -> Option<&mut Album> {
        self.albums.iter_mut().find(|a| a.name() == name)
    }

    /// Every photo of every album in scan order. A photo shared by two
    /// albums is yielded once per album.
    pub fn photos(&self) -> impl Iterator<Item = &SharedPhoto> {
        self.albums.iter().flat_map(|a| a.photos().iter())
    }

    /// Distinct tag keys across all photos (keys only, not key/value pairs).
    pub fn all_tag_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        for photo in self.photos() {
            for tag in photo.borrow().tags() {
                if !keys.contains(tag.key()) {
                    keys.insert(tag.key().to_string());
                }
            }
        }
        keys
    }
}
