//! HTTP client for the upstream Quran content API.
//!
//! Layers, leaf to root:
//!
//! - [`token::TokenCache`]: OAuth2 client-credentials token with TTL.
//! - [`remote::RemoteClient`]: authenticated GET, one re-auth retry on 401.
//! - [`cache::MemoryCache`] / [`cache::get_or_fetch`]: bounded payload memoisation.
//! - [`content::ContentApi`]: typed façade implementing
//!   [`quran_core::source::ContentSource`].

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod remote;
pub mod token;

mod dto;
mod ttl;

pub use config::{TtlConfig, UpstreamConfig};
pub use content::ContentApi;
pub use error::{Error, Result};
pub use remote::RemoteClient;
pub use token::TokenCache;
