use crate::error::AppResult;

/// Movie metadata provider abstraction
///
/// Providers answer poster lookups keyed by movie title. The poster resolver
/// owns retries and fallbacks; a provider reports a single attempt.
pub mod omdb;

/// Outcome of one poster lookup attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosterLookup {
    /// The title was found and has a poster
    Found(String),
    /// The title was found but has no poster
    NoPoster,
    /// The provider says it does not know the title
    NotFound(String),
}

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up the poster for a title
    ///
    /// Transport failures and unexpected responses are returned as errors.
    async fn lookup_poster(&self, title: &str) -> AppResult<PosterLookup>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
