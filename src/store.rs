//! Flat-file persistence of the whole user graph.
//!
//! Photos are written once into a photo table and albums refer to them by a
//! generated id, so a photo copied into several albums is still a single
//! shared instance after a reload. Ids are assigned at save time by pointer
//! identity and are not stable between saves.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::PersistenceError;
use crate::model::{Album, Photo, SharedPhoto, Tag, User};

/// Version of the data file format.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredLibrary {
    version: u32,
    #[serde(default)]
    photos: Vec<StoredPhoto>,
    #[serde(default)]
    users: Vec<StoredUser>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPhoto {
    id: u64,
    path: String,
    captured_at: NaiveDateTime,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    tags: BTreeSet<Tag>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    username: String,
    #[serde(default)]
    albums: Vec<StoredAlbum>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAlbum {
    name: String,
    #[serde(default)]
    photos: Vec<u64>,
}

fn encode(users: &[User]) -> StoredLibrary {
    let mut ids: HashMap<*const _, u64> = HashMap::new();
    let mut photos = Vec::new();

    let users = users
        .iter()
        .map(|user| StoredUser {
            username: user.username().to_string(),
            albums: user
                .albums()
                .iter()
                .map(|album| StoredAlbum {
                    name: album.name().to_string(),
                    photos: album
                        .photos()
                        .iter()
                        .map(|shared| {
                            *ids.entry(Rc::as_ptr(shared)).or_insert_with(|| {
                                let id = photos.len() as u64;
                                let photo = shared.borrow();
                                photos.push(StoredPhoto {
                                    id,
                                    path: photo.path().to_string(),
                                    captured_at: photo.captured_at(),
                                    caption: photo.caption().to_string(),
                                    tags: photo.tags().clone(),
                                });
                                id
                            })
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    StoredLibrary {
        version: FORMAT_VERSION,
        photos,
        users,
    }
}

fn decode(library: StoredLibrary) -> Result<Vec<User>, PersistenceError> {
    if library.version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: library.version,
            expected: FORMAT_VERSION,
        });
    }

    let photos: HashMap<u64, SharedPhoto> = library
        .photos
        .into_iter()
        .map(|stored| {
            let mut photo = Photo::new(stored.path, stored.captured_at);
            photo.set_caption(stored.caption);
            for tag in stored.tags {
                photo.add_tag(tag);
            }
            (stored.id, photo.into_shared())
        })
        .collect();

    let mut users = Vec::with_capacity(library.users.len());
    for stored_user in library.users {
        let mut user = User::new(stored_user.username);
        for stored_album in stored_user.albums {
            let mut album = Album::new(stored_album.name);
            for id in stored_album.photos {
                let photo = photos.get(&id).ok_or_else(|| PersistenceError::UnknownPhoto {
                    album: album.name().to_string(),
                    id,
                })?;
                album.add_photo(Rc::clone(photo));
            }
            user.push_album(album);
        }
        users.push(user);
    }

    Ok(users)
}

/// Write every user, album, photo and tag to `path`.
pub fn write_users(path: &Path, users: &[User]) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(&encode(users))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, json).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read users from `path`. A missing or empty file yields no users.
pub fn read_users(path: &Path) -> Result<Vec<User>, PersistenceError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let library: StoredLibrary =
        serde_json::from_str(&content).map_err(|source| PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    decode(library)
}

/// Rename an unusable data file to `<name>.corrupt-<timestamp>` next to it,
/// so the next save starts a fresh file. Returns the new path.
pub fn set_aside(path: &Path) -> Result<PathBuf, PersistenceError> {
    let stamp = Local::now().format("%Y%m%dT%H%M%S");
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".corrupt-{}", stamp));
    let mut target = PathBuf::from(&name);
    let mut attempt = 1;
    while target.exists() {
        let mut numbered = name.clone();
        numbered.push(format!("-{}", attempt));
        target = PathBuf::from(numbered);
        attempt += 1;
    }

    fs::rename(path, &target).map_err(|source| PersistenceError::SetAside {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(target)
}
