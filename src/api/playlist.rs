use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    convert::{self, ConversionRequest},
    server::AppState,
    spotify::DestinationCredentials,
    types::PlaylistCreateRequest,
};

/// `POST /create_playlist`: starts a conversion in the background.
///
/// The response only acknowledges the request; the outcome of the conversion
/// is visible in the logs.
pub async fn create_playlist(
    State(state): State<AppState>,
    Json(payload): Json<PlaylistCreateRequest>,
) -> Response {
    let missing: Vec<&str> = [
        ("apple_playlist_url", &payload.apple_playlist_url),
        ("playlist_name", &payload.playlist_name),
        ("access_token", &payload.access_token),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return super::error_response(
            StatusCode::BAD_REQUEST,
            format!("missing fields: {}", missing.join(", ")),
        );
    }

    let settings = state.settings.clone();
    let request = ConversionRequest {
        source_url: payload.apple_playlist_url,
        playlist_name: payload.playlist_name.clone(),
        description: payload
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| settings.default_description.clone()),
        public: payload.public,
    };
    let credentials = DestinationCredentials::BearerToken {
        token: payload.access_token,
    };

    tracing::info!(
        playlist_name = %request.playlist_name,
        source_url = %request.source_url,
        "queued conversion"
    );
    tokio::spawn(async move {
        match convert::from_settings(&settings, &credentials, &request, None).await {
            Ok(report) => tracing::info!(
                playlist_id = %report.playlist_id,
                added = report.added_count(),
                unmatched = report.unmatched().len(),
                "background conversion finished"
            ),
            Err(e) => tracing::error!(error = %e, "background conversion failed"),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "message": format!(
                "Playlist creation for '{}' has been started in the background.",
                payload.playlist_name
            )
        })),
    )
        .into_response()
}
