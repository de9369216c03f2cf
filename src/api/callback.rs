use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;
use tokio::sync::Mutex;
use url::Url;

use crate::{server::AppState, spotify::auth, types::PendingAuthorization, warning};

/// Redirect target of the interactive CLI flow.
///
/// The shared state is never locked across the code exchange.
pub async fn authorization_callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PendingAuthorization>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        warning!("Authorization was denied: {}", error);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let (expected_state, exchange) = {
        let state = shared_state.lock().await;
        match state.as_ref() {
            Some(pending) => (pending.state.clone(), pending.exchange.clone()),
            None => return Html("<h4>No authorization in progress.</h4>"),
        }
    };

    if params.get("state") != Some(&expected_state) {
        warning!("Callback state does not match the authorization request");
        return Html("<h4>State mismatch.</h4>");
    }

    match auth::exchange_code(&exchange, code).await {
        Ok(token) => {
            let mut state = shared_state.lock().await;
            match state.as_mut().filter(|p| p.state == expected_state) {
                Some(pending) => {
                    pending.access_token = Some(token);
                    Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
                }
                None => Html("<h4>No authorization in progress.</h4>"),
            }
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}

/// `GET /callback`: swaps the code for tokens and hands the access token to
/// the frontend.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(code) = params.get("code").filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Authorization failed" })),
        )
            .into_response();
    };

    let settings = &state.settings;
    let exchange = match settings.code_exchange() {
        Ok(exchange) => exchange,
        Err(e) => return super::error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let token = match auth::exchange_code(&exchange, code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "token exchange failed");
            return super::error_response(StatusCode::BAD_GATEWAY, e.to_string());
        }
    };
    tracing::debug!("exchanged code for tokens");

    match Url::parse(&settings.frontend_url) {
        Ok(mut frontend) => {
            frontend.query_pairs_mut().append_pair("access_token", &token);
            Redirect::to(frontend.as_str()).into_response()
        }
        Err(e) => super::error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("invalid FRONTEND_URL: {e}"),
        ),
    }
}
