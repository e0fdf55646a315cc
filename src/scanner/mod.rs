//! Finding image files and reading their capture time.

pub mod discovery;
pub mod metadata;

pub use discovery::{discover_images, has_image_extension};
pub use metadata::{capture_time, CaptureSource};
