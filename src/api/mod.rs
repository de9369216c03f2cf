//! # API Module
//!
//! HTTP handlers for the local web server. Two routers use them (see
//! [`crate::server`]):
//!
//! - the **callback router**, started by the CLI while it waits for the
//!   OAuth redirect of the interactive authorization flow
//! - the **app router**, the REST surface used by the web frontend
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /login`, redirects to Spotify's authorization page
//! - [`callback`] - `GET /callback`, exchanges the authorization code and
//!   redirects to the frontend with the access token
//! - [`authorization_callback`] - `GET /callback` of the CLI flow; checks the
//!   `state` parameter and stores the token for the waiting command
//!
//! ### Conversion
//!
//! - [`create_playlist`] - `POST /create_playlist`, validates the request and
//!   runs the conversion as a background task. The response is an immediate
//!   acknowledgement, never a completion status.
//!
//! ### Monitoring
//!
//! - [`health`] - status and version information

mod callback;
mod health;
mod login;
mod playlist;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub use callback::{authorization_callback, callback};
pub use health::health;
pub use login::login;
pub use playlist::create_playlist;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}
