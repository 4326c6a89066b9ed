//! Shared resolution context
//!
//! A [`Context`] owns everything resolvers borrow from their surroundings:
//! the user configuration, one HTTP client, the response cache and the lock
//! registry. Resolvers hold an `Arc<Context>` and never reach for global
//! state.

use crate::cache::{DiskCache, MemoryCache, ResponseCache};
use crate::locks::LockRegistry;
use crate::{Config, Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub struct Context {
    pub config: Config,
    pub client: reqwest::Client,
    pub cache: Arc<dyn ResponseCache>,
    pub locks: LockRegistry,
}

impl Context {
    /// Build a context from configuration, picking the cache it asks for
    pub fn new(config: Config) -> Result<Self> {
        let cache: Arc<dyn ResponseCache> = if config.cache.enabled {
            Arc::new(DiskCache::new(config.cache_dir()?))
        } else {
            Arc::new(MemoryCache::new())
        };
        Self::with_cache(config, cache)
    }

    /// Build a context around an explicit cache
    pub fn with_cache(config: Config, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.clone())
            .build()?;

        Ok(Self {
            config,
            client,
            cache,
            locks: LockRegistry::new(),
        })
    }

    /// Issue a GET, mapping connection problems to readable errors
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!(url, "GET");
        self.client.get(url).send().await.map_err(|e| {
            if e.is_connect() {
                Error::Other(format!(
                    "Cannot connect to {}\n\
                        Please check your network connection and the configured endpoint.",
                    url
                ))
            } else if e.is_timeout() {
                Error::Other(format!("Request to {} timed out. Please try again.", url))
            } else {
                Error::Http(e)
            }
        })
    }

    /// Fetch JSON from `url`, reusing a cached copy younger than `ttl`
    ///
    /// The cache key is the URL itself. Non-success responses are returned
    /// as [`Error::Upstream`] and never cached.
    pub async fn cache_response<T: DeserializeOwned>(
        &self,
        url: &str,
        ttl: Duration,
        label: &str,
    ) -> Result<T> {
        if let Some(value) = self.cache.get(url, ttl).await? {
            tracing::debug!(url, "using cached response");
            return Ok(serde_json::from_value(value)?);
        }

        tracing::info!("{}", label);
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let value: Value = response.json().await?;
        self.cache.put(url, &value).await?;
        Ok(serde_json::from_value(value)?)
    }
}
