//! Persistence for the preset catalog.
//!
//! - [`CatalogFile`]: the JSON array document that is the catalog of record.
//! - [`CatalogStore`]: single-writer handle that serializes every catalog
//!   read and mutation through one background task.
//! - [`MediaStore`]: uploaded image and preset files under the public root.

pub mod catalog;
pub mod error;
pub mod media;
pub mod models;

pub use catalog::{CatalogFile, CatalogStore};
pub use error::StoreError;
pub use media::MediaStore;
