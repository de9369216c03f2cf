use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{Res, apple_music::USER_AGENT, error::Error};

const TOKEN_MARKER: &str = "devToken";
const TOKEN_WINDOW: usize = 300;

/// Source of the bearer token required by every catalog request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Res<String>;
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Box<T> {
    async fn token(&self) -> Res<String> {
        (**self).token().await
    }
}

/// A token supplied up front, e.g. through `APPLE_MUSIC_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Res<String> {
        if self.token.trim().is_empty() {
            return Err(Error::SourceToken("configured token is empty".to_string()));
        }
        Ok(self.token.clone())
    }
}

/// Downloads the playlist page and pulls the token out of its markup.
pub struct WebPageTokenProvider {
    client: Client,
    page_url: String,
}

impl WebPageTokenProvider {
    pub fn new(page_url: impl Into<String>, timeout: Duration) -> Res<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            page_url: page_url.into(),
        })
    }
}

#[async_trait]
impl TokenProvider for WebPageTokenProvider {
    async fn token(&self) -> Res<String> {
        tracing::debug!(url = %self.page_url, "loading playlist page for token");
        let html = self
            .client
            .get(&self.page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_bearer_token(&html)
    }
}

/// Extracts the web player token from page markup.
///
/// The token follows the `devToken` marker and ends at the next `;` within a
/// short window; HTML entity remnants are stripped.
pub fn extract_bearer_token(html: &str) -> Res<String> {
    let start = html
        .find(TOKEN_MARKER)
        .ok_or_else(|| Error::SourceToken(format!("{TOKEN_MARKER} not in page")))?;

    let mut window_end = (start + TOKEN_WINDOW).min(html.len());
    while !html.is_char_boundary(window_end) {
        window_end -= 1;
    }
    let window = &html[start..window_end];

    let end = window.find(';').ok_or_else(|| {
        Error::SourceToken(format!(
            "{TOKEN_MARKER} is not terminated within {TOKEN_WINDOW} characters"
        ))
    })?;

    let token = window[..end]
        .replace("&amp", "")
        .replace(&format!("{TOKEN_MARKER}="), "");
    let token = token.trim();

    if token.is_empty() || token == TOKEN_MARKER {
        return Err(Error::SourceToken(format!("{TOKEN_MARKER} has no value")));
    }
    Ok(token.to_string())
}
