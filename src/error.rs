//! Error types shared by the library layers.
//!
//! Validation failures are raised before any state is touched, so a caller
//! that receives one can assume the photo graph is unchanged.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The kind of entity an operation referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Album,
    Photo,
    Tag,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Album => "album",
            EntityKind::Photo => "photo",
            EntityKind::Tag => "tag",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input rejected before mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} name cannot be empty")]
    EmptyName(EntityKind),

    #[error("username '{0}' is reserved")]
    ReservedUsername(String),

    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    #[error("an album named '{0}' already exists, choose a different name")]
    DuplicateAlbum(String),

    #[error("album is already named '{0}'")]
    UnchangedName(String),

    #[error("photo '{path}' already exists in album '{album}'")]
    DuplicatePhoto { path: String, album: String },

    #[error("tag key and value cannot be empty")]
    EmptyTag,

    #[error("source and target album are both '{0}'")]
    SameAlbum(String),

    #[error("there are no photos to add to a new album")]
    NoPhotos,

    #[error("'{0}' is not a supported image file")]
    UnsupportedFile(String),
}

/// Failure reading or writing the data file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {} aside: {source}", .path.display())]
    SetAside {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed data file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode users: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unsupported data file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("album '{album}' refers to unknown photo id {id}")]
    UnknownPhoto { album: String, id: u64 },
}

/// Errors surfaced by [`Gallery`](crate::gallery::Gallery) operations.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GalleryError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        GalleryError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GalleryError::NotFound { .. })
    }
}

pub type Result<T, E = GalleryError> = std::result::Result<T, E>;
