//! JSON REST API for the Quran chapter proxy.
//!
//! Exposes an axum [`Router`] backed by a [`quran_sync::Catalog`]. TLS and
//! transport concerns are the caller's responsibility; admin routes check
//! HTTP Basic credentials when [`auth::AdminAuth`] is configured.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1/quran", quran_api::api_router(catalog.clone(), admin))
//! ```

pub mod auth;
pub mod chapters;
pub mod envelope;
pub mod error;
pub mod languages;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use quran_core::{source::ContentSource, store::QuranStore};
use quran_sync::Catalog;

pub use auth::AdminAuth;
pub use envelope::Envelope;
pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S, A> {
  pub catalog: Arc<Catalog<S, A>>,
  pub admin:   Option<Arc<AdminAuth>>,
}

impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self { catalog: Arc::clone(&self.catalog), admin: self.admin.clone() }
  }
}

/// Build the API router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A>(catalog: Arc<Catalog<S, A>>, admin: Option<AdminAuth>) -> Router<()>
where
  S: QuranStore + 'static,
  A: ContentSource + 'static,
{
  let state = AppState { catalog, admin: admin.map(Arc::new) };

  Router::new()
    // Chapters
    .route("/chapters", get(chapters::list::<S, A>))
    .route("/chapters/search", get(chapters::search::<S, A>))
    .route("/chapters/revelation-order", get(chapters::by_revelation_order::<S, A>))
    .route("/chapters/revelation-place/{place}", get(chapters::by_place::<S, A>))
    .route("/chapters/sync", post(chapters::sync_all::<S, A>))
    .route("/chapters/{id}", get(chapters::get_one::<S, A>))
    .route("/chapters/{id}/info", get(chapters::info::<S, A>))
    .route("/chapters/{id}/refresh", post(chapters::refresh::<S, A>))
    // Languages
    .route("/languages", get(languages::list::<S, A>))
    .route("/languages/search", get(languages::search::<S, A>))
    .route("/languages/direction/{direction}", get(languages::by_direction::<S, A>))
    .route("/languages/sync", post(languages::sync::<S, A>))
    .route("/languages/{iso}", get(languages::get_one::<S, A>))
    .with_state(state)
}
