//! # Apple Music Integration Module
//!
//! Reads the complete track list of a public Apple Music playlist. Apple Music
//! has no public API for this, so the module talks to the internal catalog API
//! used by the web player:
//!
//! ```text
//! playlist page (HTML) ──▶ token   (TokenProvider)
//!                            │
//!                            ▼
//! GET {base}/catalog/{storefront}/playlists/{id}/tracks?offset=N   (CatalogApi)
//!                            │
//!                            ▼
//!                 SourceEnumerator ──▶ Vec<SourceTrack>
//! ```
//!
//! ## Submodules
//!
//! - [`token`] - Obtains the bearer token the web player embeds in its pages.
//!   Token scraping is fragile, so it sits behind the [`token::TokenProvider`]
//!   trait and can be replaced by a statically configured token.
//! - [`catalog`] - A single page request against the catalog API, behind the
//!   [`catalog::CatalogApi`] trait.
//! - [`enumerator`] - The paging loop: offset pagination, page parsing,
//!   bounded retry per page and the JSON snapshot written after every page.
//!
//! ## Pagination
//!
//! Each page carries its songs under `resources.songs` plus an optional
//! `next` pointer whose `offset` query parameter addresses the next page. A
//! page without `resources` means the playlist has been read completely.

pub mod catalog;
pub mod enumerator;
pub mod token;

pub use catalog::{CatalogApi, HttpCatalogApi};
pub use enumerator::{SourceEnumerator, parse_page};
pub use token::{StaticTokenProvider, TokenProvider, WebPageTokenProvider, extract_bearer_token};

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) Gecko/20100101 Firefox/131.0";
pub(crate) const WEB_ORIGIN: &str = "https://music.apple.com";
