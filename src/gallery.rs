//! The caller side of the photo graph.
//!
//! `Gallery` owns the [`Registry`] and enforces every precondition the model
//! leaves to its callers: non-empty and unique album names, unique photo
//! paths within an album, the reserved admin login. Each durable change is
//! followed by a full save of the registry. A failed save is logged and
//! swallowed; the in-memory graph stays authoritative for the session.

use chrono::{Local, NaiveDateTime, Timelike};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::config::Config;
use crate::error::{EntityKind, GalleryError, PersistenceError, Result, ValidationError};
use crate::model::{Album, DateSpan, Photo, SharedPhoto, Tag, User};
use crate::registry::Registry;
use crate::scanner;
use crate::search::{self, SearchQuery};

/// Who logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// The reserved admin login, which manages users.
    Admin,
    User(String),
}

/// Outcome of [`Gallery::import_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    /// Already in the album
    pub duplicates: usize,
    /// Could not be read
    pub failed: usize,
}

pub struct Gallery {
    config: Config,
    registry: Registry,
}

fn required(raw: &str, kind: EntityKind) -> std::result::Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyName(kind))
    } else {
        Ok(trimmed)
    }
}

impl Gallery {
    /// Load the registry from the configured data file and seed the stock
    /// user if it is missing.
    ///
    /// An unreadable or malformed data file is moved aside and the session
    /// starts with no users; see [`Registry::load_or_recover`].
    pub fn open(config: Config) -> Result<Self> {
        let registry = Registry::load_or_recover(&config.data_path)?;
        let mut gallery = Self { config, registry };
        gallery.seed_stock_user();
        Ok(gallery)
    }

    pub fn with_registry(config: Config, registry: Registry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Save now, returning any failure instead of logging it.
    pub fn save(&self) -> std::result::Result<(), PersistenceError> {
        self.registry.save(&self.config.data_path)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::error!(error = %e, "Failed to save users, changes are kept in memory only");
        }
    }

    fn seed_stock_user(&mut self) {
        let stock = self.config.stock.clone();
        if !stock.enabled || self.registry.user(&stock.username).is_some() {
            return;
        }
        if self.config.is_admin(&stock.username) {
            tracing::warn!(user = %stock.username, "Stock username is the admin login, not seeding");
            return;
        }

        self.registry.add_user(&stock.username);
        let Some(user) = self.registry.user_mut(&stock.username) else {
            return;
        };

        let now = Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);
        let mut album = Album::new(stock.album.as_str());
        for path in &stock.photos {
            let path = path.to_string_lossy();
            if !album.contains_path(&path) {
                album.add_photo(Photo::new(path.into_owned(), now).into_shared());
            }
        }
        user.push_album(album);

        tracing::info!(user = %stock.username, photos = stock.photos.len(), "Seeded stock user");
        self.persist();
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Resolve a login name.
    pub fn login(&self, username: &str) -> Result<Session> {
        let username = required(username, EntityKind::User)?;
        if self.config.is_admin(username) {
            return Ok(Session::Admin);
        }
        match self.registry.user(username) {
            Some(user) => Ok(Session::User(user.username().to_string())),
            None => Err(GalleryError::not_found(EntityKind::User, username)),
        }
    }

    pub fn user(&self, username: &str) -> Result<&User> {
        self.registry
            .user(username)
            .ok_or_else(|| GalleryError::not_found(EntityKind::User, username))
    }

    fn user_mut(&mut self, username: &str) -> Result<&mut User> {
        self.registry
            .user_mut(username)
            .ok_or_else(|| GalleryError::not_found(EntityKind::User, username))
    }

    /// Create a user, returning the stored (trimmed) name.
    pub fn create_user(&mut self, username: &str) -> Result<String> {
        let username = required(username, EntityKind::User)?;
        if self.config.is_admin(username) {
            return Err(ValidationError::ReservedUsername(username.to_string()).into());
        }
        if !self.registry.add_user(username) {
            return Err(ValidationError::DuplicateUser(username.to_string()).into());
        }

        tracing::info!(user = %username, "Created user");
        self.persist();
        Ok(username.to_string())
    }

    pub fn delete_user(&mut self, username: &str) -> Result<()> {
        if !self.registry.delete_user(username) {
            return Err(GalleryError::not_found(EntityKind::User, username));
        }

        tracing::info!(user = %username, "Deleted user");
        self.persist();
        Ok(())
    }

    // ========================================================================
    // Albums
    // ========================================================================

    pub fn album(&self, username: &str, name: &str) -> Result<&Album> {
        self.user(username)?
            .album(name)
            .ok_or_else(|| GalleryError::not_found(EntityKind::Album, name))
    }

    fn album_mut(&mut self, username: &str, name: &str) -> Result<&mut Album> {
        self.user_mut(username)?
            .album_mut(name)
            .ok_or_else(|| GalleryError::not_found(EntityKind::Album, name))
    }

    /// Create an empty album, returning the stored (trimmed) name.
    pub fn create_album(&mut self, username: &str, name: &str) -> Result<String> {
        let name = required(name, EntityKind::Album)?;
        let user = self.user_mut(username)?;
        if user.album(name).is_some() {
            return Err(ValidationError::DuplicateAlbum(name.to_string()).into());
        }
        user.create_album(name);

        tracing::info!(user = %username, album = %name, "Created album");
        self.persist();
        Ok(name.to_string())
    }

    pub fn rename_album(&mut self, username: &str, old: &str, new: &str) -> Result<()> {
        let new = required(new, EntityKind::Album)?;
        let user = self.user_mut(username)?;
        if user.album(old).is_none() {
            return Err(GalleryError::not_found(EntityKind::Album, old));
        }
        if new == old {
            return Err(ValidationError::UnchangedName(new.to_string()).into());
        }
        if user.album(new).is_some() {
            return Err(ValidationError::DuplicateAlbum(new.to_string()).into());
        }
        user.rename_album(old, new);

        tracing::info!(user = %username, from = %old, to = %new, "Renamed album");
        self.persist();
        Ok(())
    }

    pub fn delete_album(&mut self, username: &str, name: &str) -> Result<()> {
        if !self.user_mut(username)?.delete_album(name) {
            return Err(GalleryError::not_found(EntityKind::Album, name));
        }

        tracing::info!(user = %username, album = %name, "Deleted album");
        self.persist();
        Ok(())
    }

    /// Create an album holding `photos` (typically search results). The
    /// photos are shared with the albums they came from.
    pub fn create_album_from_results(
        &mut self,
        username: &str,
        name: &str,
        photos: &[SharedPhoto],
    ) -> Result<String> {
        if photos.is_empty() {
            return Err(ValidationError::NoPhotos.into());
        }
        let name = required(name, EntityKind::Album)?;
        let user = self.user_mut(username)?;
        if user.album(name).is_some() {
            return Err(ValidationError::DuplicateAlbum(name.to_string()).into());
        }

        let mut album = Album::new(name);
        for photo in photos {
            if !album.contains_path(photo.borrow().path()) {
                album.add_photo(Rc::clone(photo));
            }
        }
        let count = album.count();
        user.push_album(album);

        tracing::info!(user = %username, album = %name, photos = count, "Created album from results");
        self.persist();
        Ok(name.to_string())
    }

    // ========================================================================
    // Photos
    // ========================================================================

    pub fn photo(&self, username: &str, album: &str, path: &str) -> Result<SharedPhoto> {
        self.album(username, album)?
            .find_photo(path)
            .ok_or_else(|| GalleryError::not_found(EntityKind::Photo, path))
    }

    /// Add a photo with a known capture time.
    pub fn add_photo(
        &mut self,
        username: &str,
        album: &str,
        path: &str,
        captured_at: NaiveDateTime,
    ) -> Result<SharedPhoto> {
        let path = required(path, EntityKind::Photo)?;
        let target = self.album_mut(username, album)?;
        if target.contains_path(path) {
            return Err(ValidationError::DuplicatePhoto {
                path: path.to_string(),
                album: album.to_string(),
            }
            .into());
        }
        let photo = Photo::new(path, captured_at).into_shared();
        target.add_photo(Rc::clone(&photo));

        tracing::info!(user = %username, album = %album, path = %path, "Added photo");
        self.persist();
        Ok(photo)
    }

    /// Add an image file, stored under its absolute path with the capture
    /// time read from the file.
    pub fn add_photo_file(&mut self, username: &str, album: &str, file: &Path) -> Result<SharedPhoto> {
        let absolute = fs::canonicalize(file).map_err(|source| GalleryError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        if !scanner::has_image_extension(&absolute, &self.config.import.image_extensions) {
            return Err(ValidationError::UnsupportedFile(absolute.display().to_string()).into());
        }
        let (captured_at, source) =
            scanner::capture_time(&absolute).map_err(|source| GalleryError::Io {
                path: absolute.clone(),
                source,
            })?;
        tracing::debug!(path = %absolute.display(), ?source, %captured_at, "Read capture time");

        self.add_photo(username, album, &absolute.to_string_lossy(), captured_at)
    }

    /// Add every image under `directory`, skipping paths already in the
    /// album. Saves once at the end.
    pub fn import_directory(
        &mut self,
        username: &str,
        album: &str,
        directory: &Path,
    ) -> Result<ImportSummary> {
        let directory = fs::canonicalize(directory).map_err(|source| GalleryError::Io {
            path: directory.to_path_buf(),
            source,
        })?;
        let images = scanner::discover_images(&directory, &self.config.import.image_extensions);
        let target = self.album_mut(username, album)?;

        let mut summary = ImportSummary::default();
        for image in images {
            let path = image.to_string_lossy();
            if target.contains_path(&path) {
                summary.duplicates += 1;
                continue;
            }
            match scanner::capture_time(&image) {
                Ok((captured_at, _)) => {
                    target.add_photo(Photo::new(path.into_owned(), captured_at).into_shared());
                    summary.added += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %image.display(), error = %e, "Skipping unreadable image");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            user = %username,
            album = %album,
            directory = %directory.display(),
            added = summary.added,
            duplicates = summary.duplicates,
            failed = summary.failed,
            "Imported directory"
        );
        if summary.added > 0 {
            self.persist();
        }
        Ok(summary)
    }

    pub fn remove_photo(&mut self, username: &str, album: &str, path: &str) -> Result<()> {
        let photo = self.photo(username, album, path)?;
        self.album_mut(username, album)?.remove_photo(&photo);

        tracing::info!(user = %username, album = %album, path = %path, "Removed photo");
        self.persist();
        Ok(())
    }

    pub fn set_caption(&mut self, username: &str, album: &str, path: &str, caption: &str) -> Result<()> {
        let photo = self.photo(username, album, path)?;
        photo.borrow_mut().set_caption(caption);

        tracing::info!(user = %username, album = %album, path = %path, "Set caption");
        self.persist();
        Ok(())
    }

    /// Tag a photo. Returns `false` if it already carried the tag.
    pub fn add_tag(
        &mut self,
        username: &str,
        album: &str,
        path: &str,
        key: &str,
        value: &str,
    ) -> Result<bool> {
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(ValidationError::EmptyTag.into());
        }
        let photo = self.photo(username, album, path)?;
        let added = photo.borrow_mut().add_tag(Tag::new(key, value));

        if added {
            tracing::info!(user = %username, path = %path, tag = %format!("{}: {}", key, value), "Added tag");
            self.persist();
        }
        Ok(added)
    }

    pub fn remove_tag(
        &mut self,
        username: &str,
        album: &str,
        path: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let tag = Tag::new(key.trim(), value.trim());
        let photo = self.photo(username, album, path)?;
        if !photo.borrow_mut().remove_tag(&tag) {
            return Err(GalleryError::not_found(EntityKind::Tag, tag.label()));
        }

        tracing::info!(user = %username, path = %path, tag = %tag, "Removed tag");
        self.persist();
        Ok(())
    }

    /// Checks shared by copy and move; returns the photo to transfer.
    fn transfer_source(&self, username: &str, from: &str, path: &str, to: &str) -> Result<SharedPhoto> {
        if from == to {
            return Err(ValidationError::SameAlbum(from.to_string()).into());
        }
        let photo = self.photo(username, from, path)?;
        if self.album(username, to)?.contains_path(path) {
            return Err(ValidationError::DuplicatePhoto {
                path: path.to_string(),
                album: to.to_string(),
            }
            .into());
        }
        Ok(photo)
    }

    /// Put the same photo instance in a second album.
    pub fn copy_photo(&mut self, username: &str, from: &str, path: &str, to: &str) -> Result<()> {
        let photo = self.transfer_source(username, from, path, to)?;
        self.album_mut(username, to)?.add_photo(photo);

        tracing::info!(user = %username, from = %from, to = %to, path = %path, "Copied photo");
        self.persist();
        Ok(())
    }

    /// Transfer a photo from one album to another.
    pub fn move_photo(&mut self, username: &str, from: &str, path: &str, to: &str) -> Result<()> {
        let photo = self.transfer_source(username, from, path, to)?;
        self.album_mut(username, to)?.add_photo(Rc::clone(&photo));
        self.album_mut(username, from)?.remove_photo(&photo);

        tracing::info!(user = %username, from = %from, to = %to, path = %path, "Moved photo");
        self.persist();
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Keys to offer when tagging: keys already in use plus the configured
    /// suggestions, sorted and distinct.
    pub fn tag_key_suggestions(&self, username: &str) -> Result<Vec<String>> {
        let mut keys = self.user(username)?.all_tag_keys();
        keys.extend(self.config.tagging.suggested_keys.iter().cloned());
        Ok(keys.into_iter().collect())
    }

    pub fn available_tags(&self, username: &str) -> Result<BTreeSet<Tag>> {
        Ok(search::available_tags(self.user(username)?))
    }

    pub fn search(&self, username: &str, query: &SearchQuery) -> Result<Vec<SharedPhoto>> {
        Ok(search::search(self.user(username)?, &query.trimmed()))
    }

    pub fn search_date_bounds(&self, username: &str) -> Result<Option<DateSpan>> {
        Ok(search::date_bounds(self.user(username)?))
    }
}
