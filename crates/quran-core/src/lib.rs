//! Core types and trait definitions for the Quran chapter proxy.
//!
//! No HTTP or database code lives here.
//! Storage backends implement [`store::QuranStore`], upstream clients implement
//! [`source::ContentSource`], and payload caches implement
//! [`cache::ResponseCache`].

// Impls use native `async fn`; the traits spell out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod chapter;
pub mod error;
pub mod language;
pub mod source;
pub mod store;

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use error::{InvalidChapterId, SourceError};
