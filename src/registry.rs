//! The set of users and the persistence boundary.

use std::path::Path;

use crate::error::PersistenceError;
use crate::model::User;
use crate::store;

/// Owns every [`User`], keyed by unique username.
///
/// Constructed explicitly at startup and handed to whatever composes the
/// application; there is no global instance.
#[derive(Debug, Default)]
pub struct Registry {
    users: Vec<User>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the data file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, PersistenceError> {
        let mut registry = Self::new();
        registry.load(path)?;
        Ok(registry)
    }

    /// Like [`Registry::load_from`], but an unusable data file does not stop
    /// the session: the error is logged, the file is moved aside so later
    /// saves cannot overwrite it, and the registry starts empty. Fails only
    /// when the file cannot be moved.
    pub fn load_or_recover(path: &Path) -> Result<Self, PersistenceError> {
        match Self::load_from(path) {
            Ok(registry) => Ok(registry),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Cannot load users, starting empty");
                let moved = store::set_aside(path)?;
                tracing::warn!(moved_to = %moved.display(), "Kept unusable data file");
                Ok(Self::new())
            }
        }
    }

    /// Add a user. Returns `false`, changing nothing, if the name is taken.
    pub fn add_user(&mut self, username: &str) -> bool {
        if self.user(username).is_some() {
            return false;
        }
        self.users.push(User::new(username));
        true
    }

    /// Remove every user called `username`. Returns whether any was removed.
    pub fn delete_user(&mut self, username: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.username() != username);
        self.users.len() != before
    }

    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username() == username)
    }

    pub fn user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.username() == username)
    }

    /// Snapshot of the users. Changing the returned list (adding, removing
    /// or renaming albums) does not touch the registry.
    pub fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    pub fn usernames(&self) -> Vec<String> {
        self.users.iter().map(|u| u.username().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Write the full user graph to `path`.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        store::write_users(path, &self.users)?;
        tracing::debug!(path = %path.display(), users = self.users.len(), "Saved users");
        Ok(())
    }

    /// Replace the in-memory users with those stored at `path`.
    ///
    /// A missing or empty file loads as "no users yet". On error the
    /// current users are left untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), PersistenceError> {
        self.users = store::read_users(path)?;
        tracing::info!(path = %path.display(), users = self.users.len(), "Loaded users");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Photo;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_add_duplicate_user_is_noop() {
        let mut registry = Registry::new();
        assert!(registry.add_user("alice"));
        assert!(!registry.add_user("alice"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_delete_user() {
        let mut registry = Registry::new();
        registry.add_user("alice");
        registry.add_user("bob");

        assert!(!registry.delete_user("carol"));
        assert_eq!(registry.len(), 2);

        assert!(registry.delete_user("alice"));
        assert_eq!(registry.usernames(), vec!["bob".to_string()]);
        assert!(registry.user("alice").is_none());
    }

    #[test]
    fn test_list_users_is_a_snapshot() {
        let mut registry = Registry::new();
        registry.add_user("alice");

        let mut snapshot = registry.list_users();
        snapshot[0].create_album("Sneaky");
        snapshot.clear();

        assert_eq!(registry.len(), 1);
        assert!(registry.user("alice").unwrap().albums().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");

        let mut registry = Registry::new();
        registry.add_user("alice");
        registry.add_user("bob");
        let alice = registry.user_mut("alice").unwrap();
        alice.create_album("Trip");
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        alice
            .album_mut("Trip")
            .unwrap()
            .add_photo(Photo::new("/img/a.jpg", at).into_shared());
        registry.save(&path).unwrap();

        let loaded = Registry::load_from(&path).unwrap();
        assert_eq!(loaded.usernames(), vec!["alice".to_string(), "bob".to_string()]);
        let trip = loaded.user("alice").unwrap().album("Trip").unwrap();
        assert_eq!(trip.count(), 1);
        assert!(trip.contains_path("/img/a.jpg"));
    }

    #[test]
    fn test_load_missing_file_gives_empty_registry() {
        let dir = tempdir().unwrap();
        let registry = Registry::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_or_recover_sets_bad_file_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{ not json").unwrap();

        let registry = Registry::load_or_recover(&path).unwrap();
        assert!(registry.is_empty());
        assert!(!path.exists());

        let kept: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(std::fs::read_to_string(&kept[0]).unwrap(), "{ not json");
    }

    #[test]
    fn test_load_or_recover_reads_good_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let mut registry = Registry::new();
        registry.add_user("alice");
        registry.save(&path).unwrap();

        let loaded = Registry::load_or_recover(&path).unwrap();
        assert_eq!(loaded.usernames(), vec!["alice"]);
        assert!(path.exists());
    }

    #[test]
    fn test_load_replaces_users() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");

        let mut saved = Registry::new();
        saved.add_user("carol");
        saved.save(&path).unwrap();

        let mut registry = Registry::new();
        registry.add_user("alice");
        registry.load(&path).unwrap();
        assert_eq!(registry.usernames(), vec!["carol".to_string()]);
    }
}
