use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue, ORIGIN, REFERER},
};
use serde_json::Value;

use crate::{
    Res,
    apple_music::{USER_AGENT, WEB_ORIGIN},
    error::Error,
};

/// One page request against the source catalog.
///
/// Implementations return the raw JSON body; interpreting it is left to
/// [`crate::apple_music::parse_page`] so that a malformed page counts as a
/// failed attempt of the paging loop.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_page(&self, token: &str, playlist_id: &str, offset: u32) -> Res<Value>;
}

pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
    storefront: String,
}

impl HttpCatalogApi {
    pub fn new(
        base_url: impl Into<String>,
        storefront: impl Into<String>,
        timeout: Duration,
    ) -> Res<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(ORIGIN, HeaderValue::from_static(WEB_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static("https://music.apple.com/"));
        headers.insert(COOKIE, HeaderValue::from_static("geo=US"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storefront: storefront.into(),
        })
    }

    fn tracks_url(&self, playlist_id: &str) -> String {
        format!(
            "{base}/catalog/{storefront}/playlists/{id}/tracks",
            base = self.base_url,
            storefront = self.storefront,
            id = playlist_id
        )
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_page(&self, token: &str, playlist_id: &str, offset: u32) -> Res<Value> {
        let offset = offset.to_string();
        let response = self
            .client
            .get(self.tracks_url(playlist_id))
            .bearer_auth(token)
            .query(&[
                ("l", "en-US"),
                ("offset", offset.as_str()),
                ("art[url]", "f"),
                ("format[resources]", "map"),
                ("platform", "web"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                service: "Apple Music",
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
