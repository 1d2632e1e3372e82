/// Remote artifact sources
///
/// The similarity matrix and catalog are published as files on Google Drive.
/// Small files download directly; large ones are answered with an HTML
/// "can't scan for viruses" interstitial that links to the real download
/// through a `confirm` token, which is followed once.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::error::{AppError, AppResult};

use super::artifacts::has_pickle_signature;

/// Trait for places artifacts can be downloaded from
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Download the raw bytes identified by `remote_id`
    async fn fetch(&self, remote_id: &str) -> AppResult<Vec<u8>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct GoogleDriveSource {
    http_client: HttpClient,
    base_url: String,
}

impl GoogleDriveSource {
    /// Creates a source whose connections give up after `connect_timeout` and
    /// whose downloads, body included, give up after `timeout`
    pub fn new(base_url: String, connect_timeout: Duration, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    async fn download(&self, remote_id: &str, confirm: Option<&str>) -> AppResult<Vec<u8>> {
        let mut query = vec![("id", remote_id), ("export", "download")];
        if let Some(token) = confirm {
            query.push(("confirm", token));
        }

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Artifact download returned status {}",
                status
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl ArtifactSource for GoogleDriveSource {
    async fn fetch(&self, remote_id: &str) -> AppResult<Vec<u8>> {
        let body = self.download(remote_id, None).await?;

        if has_pickle_signature(&body) || !looks_like_html(&body) {
            tracing::debug!(remote_id = %remote_id, bytes = body.len(), "Artifact downloaded");
            return Ok(body);
        }

        match extract_confirm_token(&String::from_utf8_lossy(&body)) {
            Some(token) => {
                tracing::info!(
                    remote_id = %remote_id,
                    "Download interstitial received, following confirm token"
                );
                self.download(remote_id, Some(&token)).await
            }
            None => Ok(body),
        }
    }

    fn name(&self) -> &'static str {
        "google_drive"
    }
}

fn looks_like_html(body: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&body[..body.len().min(512)]).to_ascii_lowercase();
    let head = head.trim_start();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Finds the download confirmation token in a Drive interstitial page
///
/// Handles both the `confirm=<token>` link form and the hidden
/// `<input name="confirm" value="<token>">` form.
pub(crate) fn extract_confirm_token(html: &str) -> Option<String> {
    let is_token_char = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

    if let Some(start) = html.find("confirm=") {
        let token: String = html[start + "confirm=".len()..]
            .chars()
            .take_while(|c| is_token_char(*c))
            .collect();
        if !token.is_empty() {
            return Some(token);
        }
    }

    let input = html.find("name=\"confirm\"")?;
    let rest = &html[input..];
    let value = rest.find("value=\"")? + "value=\"".len();
    let token: String = rest[value..].chars().take_while(|c| is_token_char(*c)).collect();

    (!token.is_empty()).then_some(token)
}
