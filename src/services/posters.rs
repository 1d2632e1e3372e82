use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::{
    error::AppError,
    services::providers::{MetadataProvider, PosterLookup},
};

/// Sleep strategy between poster lookup attempts
///
/// Swapped for a non-sleeping implementation in tests.
#[async_trait::async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait::async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry schedule for poster lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per title, including the first
    pub max_attempts: u32,
    /// Wait after the first failed attempt; doubles after each further failure
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Resolves display posters for movie titles
///
/// Never fails: every path ends in either a provider URL or the placeholder.
#[derive(Clone)]
pub struct PosterResolver {
    provider: Arc<dyn MetadataProvider>,
    delay: Arc<dyn Delay>,
    policy: RetryPolicy,
    placeholder: String,
}

impl PosterResolver {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        delay: Arc<dyn Delay>,
        policy: RetryPolicy,
        placeholder: String,
    ) -> Self {
        Self {
            provider,
            delay,
            policy,
            placeholder,
        }
    }

    /// Resolves a poster using the configured retry policy
    pub async fn resolve(&self, title: &str) -> String {
        self.resolve_poster(title, self.policy.max_attempts).await
    }

    /// Resolves a poster with at most `max_retries` attempts
    ///
    /// Transport errors, error statuses and "not found" answers are retried.
    /// A found title without a usable poster falls back immediately.
    pub async fn resolve_poster(&self, title: &str, max_retries: u32) -> String {
        let attempts = max_retries.max(1);

        for attempt in 1..=attempts {
            let failure = match self.provider.lookup_poster(title).await {
                Ok(PosterLookup::Found(url)) => {
                    if is_displayable_url(&url) {
                        return url;
                    }
                    tracing::warn!(title = %title, poster = %url, "Provider returned an unusable poster URL");
                    return self.placeholder.clone();
                }
                Ok(PosterLookup::NoPoster) => return self.placeholder.clone(),
                Ok(PosterLookup::NotFound(reason)) => AppError::MetadataUnavailable(reason),
                Err(e) => e,
            };

            tracing::debug!(
                title = %title,
                attempt = attempt,
                max_attempts = attempts,
                provider = self.provider.name(),
                error = %failure,
                "Poster lookup failed"
            );

            if attempt < attempts {
                self.delay.sleep(self.policy.delay_after(attempt)).await;
            }
        }

        tracing::info!(
            title = %title,
            attempts = attempts,
            "Poster lookup exhausted retries, using placeholder"
        );

        self.placeholder.clone()
    }

    /// Resolves posters for several titles concurrently, preserving input order
    pub async fn resolve_all(&self, titles: &[String]) -> Vec<String> {
        let tasks: Vec<_> = titles
            .iter()
            .cloned()
            .map(|title| {
                let resolver = self.clone();
                tokio::spawn(async move { resolver.resolve(&title).await })
            })
            .collect();

        let mut posters = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(url) => posters.push(url),
                Err(e) => {
                    tracing::error!(error = %e, "Poster task join error");
                    posters.push(self.placeholder.clone());
                }
            }
        }

        posters
    }
}

fn is_displayable_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
