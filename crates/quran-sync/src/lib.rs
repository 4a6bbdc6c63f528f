//! Cache-or-sync-on-read orchestration over a [`QuranStore`] and a
//! [`ContentSource`].
//!
//! [`Catalog`] answers every read from the local store, first pulling from
//! the upstream whatever the store is missing. Writes go through
//! [`QuranStore::apply`] so each sync lands in one transaction.
//!
//! [`QuranStore`]: quran_core::store::QuranStore
//! [`QuranStore::apply`]: quran_core::store::QuranStore::apply
//! [`ContentSource`]: quran_core::source::ContentSource

mod bulk;
mod catalog;
mod chapters;
mod languages;

pub mod error;

pub use bulk::{BulkOptions, BulkReport};
pub use catalog::{Catalog, CatalogConfig, SyncAction};
pub use error::{Error, Result};

/// Minimum length of a search term.
pub const MIN_SEARCH_LEN: usize = 2;
