//! Albumist: users, albums and tagged photos, stored in one JSON file.
//!
//! The core graph lives in [`model`] and [`registry`]; [`search`] answers
//! queries over one user's photos. [`gallery::Gallery`] is the session layer
//! that validates requests and saves after each change.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod logging;
pub mod model;
pub mod registry;
pub mod scanner;
pub mod search;
pub mod store;

pub use config::Config;
pub use error::{GalleryError, PersistenceError, ValidationError};
pub use gallery::{Gallery, ImportSummary, Session};
pub use registry::Registry;
