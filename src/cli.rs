//! Command-line definition.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Tag;
use crate::search::{SearchQuery, TagMatch};

#[derive(Debug, Parser)]
#[command(name = "albumist")]
#[command(about = "Photo albums for several users, with tags and search")]
#[command(long_about = "\
Photo albums for several users, with tags and search

Every user owns albums; albums hold photos identified by file path. A photo
can sit in several albums at once (photo copy) and carries a caption and
key/value tags. Log in as the admin name to manage users.

Environment:
  ALBUMIST_CONFIG   Path to config file (overrides default location)
  ALBUMIST_LOG      Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/albumist/config.toml")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List users
    Users,
    /// Add or delete a user
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Check a login name
    Login { name: String },
    /// List a user's albums
    Albums { user: String },
    /// Create, delete, rename or show one of a user's albums
    Album {
        user: String,
        #[command(subcommand)]
        action: AlbumAction,
    },
    /// Work with the photos of an album
    Photo {
        user: String,
        album: String,
        #[command(subcommand)]
        action: PhotoAction,
    },
    /// List the tags in use
    Tags {
        user: String,
        /// List tag keys to choose from instead, including suggested keys
        #[arg(long)]
        keys: bool,
    },
    /// Search a user's photos
    Search {
        user: String,
        #[command(subcommand)]
        by: SearchBy,
        /// Save the results as a new album
        #[arg(long, global = true, value_name = "NAME")]
        save_as: Option<String>,
        /// Write the results to FILE (.json or .csv)
        #[arg(long, global = true, value_name = "FILE")]
        export: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum UserAction {
    Add { name: String },
    Delete { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum AlbumAction {
    Create { name: String },
    Delete { name: String },
    Rename { old: String, new: String },
    /// Print the album and its photos
    Show {
        name: String,
        /// Write the photos to FILE (.json or .csv)
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum PhotoAction {
    /// Add an image file; the capture time is read from it unless given
    Add {
        #[arg(allow_hyphen_values = true)]
        path: PathBuf,
        /// YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD
        #[arg(value_parser = parse_datetime)]
        captured_at: Option<NaiveDateTime>,
    },
    /// Add every image under a directory
    Import {
        #[arg(allow_hyphen_values = true)]
        directory: PathBuf,
    },
    Remove {
        #[arg(allow_hyphen_values = true)]
        path: String,
    },
    Caption {
        #[arg(allow_hyphen_values = true)]
        path: String,
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    Tag {
        #[arg(allow_hyphen_values = true)]
        path: String,
        #[arg(allow_hyphen_values = true)]
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    Untag {
        #[arg(allow_hyphen_values = true)]
        path: String,
        #[arg(allow_hyphen_values = true)]
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Put the same photo in another album as well
    Copy {
        #[arg(allow_hyphen_values = true)]
        path: String,
        target: String,
    },
    /// Move the photo to another album
    Move {
        #[arg(allow_hyphen_values = true)]
        path: String,
        target: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum SearchBy {
    /// Photos captured between two dates (YYYY-MM-DD), both inclusive
    Dates {
        #[arg(value_parser = parse_date)]
        start: NaiveDate,
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Photos carrying one tag
    Tag {
        #[arg(allow_hyphen_values = true)]
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Photos carrying both tags (and) or either tag (or)
    Tags {
        #[arg(allow_hyphen_values = true)]
        first_key: String,
        #[arg(allow_hyphen_values = true)]
        first_value: String,
        mode: TagMatch,
        #[arg(allow_hyphen_values = true)]
        second_key: String,
        #[arg(allow_hyphen_values = true)]
        second_value: String,
    },
}

impl SearchBy {
    pub fn query(&self) -> SearchQuery {
        match self {
            SearchBy::Dates { start, end } => SearchQuery::DateRange {
                start: *start,
                end: *end,
            },
            SearchBy::Tag { key, value } => SearchQuery::Tag(Tag::new(key.trim(), value.trim())),
            SearchBy::Tags {
                first_key,
                first_value,
                mode,
                second_key,
                second_value,
            } => SearchQuery::TwoTags {
                first: Tag::new(first_key.trim(), first_value.trim()),
                second: Tag::new(second_key.trim(), second_value.trim()),
                mode: *mode,
            },
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", raw))
}

/// Accepts `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` or a bare date
/// (midnight).
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(at);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| {
            format!(
                "invalid date and time '{}', expected YYYY-MM-DDTHH:MM:SS",
                raw
            )
        })
}
