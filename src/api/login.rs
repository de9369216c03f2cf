use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{Res, server::AppState, spotify::auth};

/// `GET /login`: sends the browser to Spotify's authorization page.
pub async fn login(State(state): State<AppState>) -> Response {
    match login_url(&state) {
        Ok(url) => {
            tracing::debug!(%url, "redirecting to authorization page");
            Redirect::to(&url).into_response()
        }
        Err(e) => super::error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn login_url(state: &AppState) -> Res<String> {
    let settings = &state.settings;
    auth::authorize_url(
        &settings.spotify_auth_url,
        settings.client_id()?,
        settings.redirect_uri()?,
        &settings.scope_param(),
        None,
    )
}
