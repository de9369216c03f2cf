use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{Res, api, config::Settings, error::Error, types::PendingAuthorization};

/// State shared by the REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

pub async fn bind(address: &str) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| Error::Config(format!("invalid server address '{address}': {e}")))?;
    Ok(TcpListener::bind(&addr).await?)
}

/// Routes served while the CLI waits for the OAuth redirect.
pub fn callback_router(state: Arc<Mutex<Option<PendingAuthorization>>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/callback",
            get(api::authorization_callback).layer(Extension(state)),
        )
}

/// The REST surface used by the web frontend.
pub fn app_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = [
        state.settings.frontend_url.as_str(),
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ]
    .iter()
    .filter_map(|o| HeaderValue::from_str(o.trim_end_matches('/')).ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/create_playlist", post(api::create_playlist))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(settings: Settings) -> Res<()> {
    let listener = bind(&settings.server_address).await?;
    tracing::info!(address = %settings.server_address, "serving REST API");

    axum::serve(listener, app_router(AppState::new(settings))).await?;
    Ok(())
}
