use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::services::recommendations::DEFAULT_RECOMMENDATION_COUNT;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OMDb API key used for poster lookups
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Image shown when no poster can be resolved
    #[serde(default = "default_poster_url")]
    pub default_poster_url: String,

    /// Total poster lookup attempts per title
    #[serde(default = "default_poster_max_retries")]
    pub poster_max_retries: u32,

    /// Base delay between poster lookup attempts, doubled after each attempt
    #[serde(default = "default_poster_retry_delay_ms")]
    pub poster_retry_delay_ms: u64,

    /// Per-request read timeout for poster lookups
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Number of neighbours returned per recommendation
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Directory holding the mirrored artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Download endpoint for remote artifacts
    #[serde(default = "default_artifact_base_url")]
    pub artifact_base_url: String,

    /// Remote identifier of the movie catalog artifact
    pub movies_remote_id: String,

    /// Remote identifier of the similarity matrix artifact
    pub similarity_remote_id: String,

    /// Connect timeout for artifact downloads
    #[serde(default = "default_artifact_connect_timeout_secs")]
    pub artifact_connect_timeout_secs: u64,

    /// Total time allowed for one artifact download, body included
    #[serde(default = "default_artifact_timeout_secs")]
    pub artifact_timeout_secs: u64,

    /// Largest accepted manual upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_omdb_api_url() -> String {
    "http://www.omdbapi.com/".to_string()
}

fn default_poster_url() -> String {
    "https://via.placeholder.com/500x750?text=No+Poster".to_string()
}

fn default_poster_max_retries() -> u32 {
    3
}

fn default_poster_retry_delay_ms() -> u64 {
    500
}

fn default_poster_timeout_secs() -> u64 {
    10
}

fn default_recommendation_count() -> usize {
    DEFAULT_RECOMMENDATION_COUNT
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_artifact_base_url() -> String {
    "https://drive.google.com/uc".to_string()
}

fn default_artifact_connect_timeout_secs() -> u64 {
    10
}

fn default_artifact_timeout_secs() -> u64 {
    600
}

fn default_max_upload_bytes() -> usize {
    512 * 1024 * 1024
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn poster_retry_delay(&self) -> Duration {
        Duration::from_millis(self.poster_retry_delay_ms)
    }

    pub fn poster_timeout(&self) -> Duration {
        Duration::from_secs(self.poster_timeout_secs)
    }

    pub fn artifact_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.artifact_connect_timeout_secs)
    }

    pub fn artifact_timeout(&self) -> Duration {
        Duration::from_secs(self.artifact_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
