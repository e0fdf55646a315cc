//! The user → album → photo → tag hierarchy.

pub mod album;
pub mod photo;
pub mod tag;
pub mod user;

pub use album::{Album, DateSpan};
pub use photo::{Photo, SharedPhoto};
pub use tag::Tag;
pub use user::User;
