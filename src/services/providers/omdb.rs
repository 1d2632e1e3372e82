/// OMDb API provider
///
/// API Flow:
/// GET /?t={title}&apikey={key} → `{"Response": "True", "Poster": "<url>"}`
/// or `{"Response": "False", "Error": "Movie not found!"}`.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::OmdbResponse,
    services::providers::{MetadataProvider, PosterLookup},
};

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbProvider {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    fn interpret(&self, title: &str, body: OmdbResponse) -> PosterLookup {
        if !body.is_found() {
            let reason = body.error.unwrap_or_else(|| "Movie not found!".to_string());
            return PosterLookup::NotFound(reason);
        }

        match body.poster_url() {
            Some(url) => PosterLookup::Found(url.to_string()),
            None => {
                tracing::debug!(title = %title, provider = "omdb", "Title has no poster");
                PosterLookup::NoPoster
            }
        }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for OmdbProvider {
    async fn lookup_poster(&self, title: &str) -> AppResult<PosterLookup> {
        // reqwest percent-encodes query values
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("t", title), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let body: OmdbResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(
                error = %e,
                response = %response_text,
                "Failed to deserialize OMDb response"
            );
            AppError::ExternalApi(format!("Failed to parse OMDb response: {}", e))
        })?;

        Ok(self.interpret(title, body))
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
