//! Apple Music to Spotify playlist converter library
//!
//! This library reads the track list of a public Apple Music playlist and
//! rebuilds it as a Spotify playlist, matching tracks one by one through the
//! Spotify search API. It includes modules for both catalog integrations, the
//! conversion pipeline, the local HTTP surface and the CLI commands.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local server (login, callback, playlist creation)
//! - `apple_music` - Source catalog token scraping and playlist enumeration
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `convert` - The end-to-end conversion pipeline
//! - `error` - Crate error type
//! - `logging` - Tracing subscriber setup
//! - `management` - JSON artifacts written during a run
//! - `retry` - Bounded retry policy shared by the paging loops
//! - `server` - Local HTTP server for OAuth callbacks and the REST surface
//! - `spotify` - Spotify Web API client and playlist reconciliation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use playlist_bridge::{config, config::Settings};
//!
//! #[tokio::main]
//! async fn main() -> playlist_bridge::Res<()> {
//!     config::load_env().await?;
//!     let settings = Settings::from_env()?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod apple_music;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod management;
pub mod retry;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate reports a [`error::Error`], so the
/// alias only fixes the error side.
///
/// # Example
///
/// ```
/// use playlist_bridge::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, error::Error>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Fetching playlist {}", playlist_id);
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Added {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Snapshot could not be written");
/// warning!("{} tracks had no match", unmatched);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
