//! # CLI Module
//!
//! User-facing commands. Each command takes the loaded [`crate::config::Settings`],
//! reports progress with the coloured output macros and exits with an error
//! message on fatal failures; detailed diagnostics go to the tracing log.
//!
//! ## Commands
//!
//! - [`convert`] - Reads an Apple Music playlist and rebuilds it on Spotify.
//!   Without `--access-token` the interactive authorization flow is started
//!   in the browser. Tracks that could not be added are listed in a table and
//!   written to `<data dir>/unmatched/<playlist id>.json`.
//! - [`fetch`] - Reads an Apple Music playlist only and writes the track list
//!   as JSON.
//! - [`serve`] - Runs the REST surface for the web frontend.
//!
//! ## Usage Patterns
//!
//! ```bash
//! playlist-bridge convert \
//!     --url https://music.apple.com/us/playlist/gymbro/pl.u-55D6X8qU63EXGbj \
//!     --name GymBro
//! playlist-bridge fetch \
//!     --url https://music.apple.com/us/playlist/gymbro/pl.u-55D6X8qU63EXGbj \
//!     --output gymbro.json
//! playlist-bridge serve
//! ```

mod convert;
mod fetch;
mod serve;

pub use convert::convert;
pub use fetch::fetch;
pub use serve::serve;
