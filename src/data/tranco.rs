//! Tranco list client
//!
//! Fetches the daily Tranco top-sites list for a date. Resolving a date takes
//! two requests: one to look up the list id published for that day, and one
//! to download the list itself. Both are persisted through `CacheManager`
//! since a published list never changes.

use std::time::Duration;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use reqwest::Client;
use tracing::{debug, warn};

use super::{DailyRanking, ProviderError, RankingProvider};
use crate::cache::CacheManager;

/// Base URL of the public Tranco service
pub const TRANCO_BASE_URL: &str = "https://tranco-list.eu";

/// Number of entries in a full Tranco list
pub const DEFAULT_LIST_SIZE: u32 = 1_000_000;

/// Timeout applied to each HTTP request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("rankwatch/", env!("CARGO_PKG_VERSION"));

/// Client for fetching daily lists from the Tranco service
#[derive(Debug, Clone)]
pub struct TrancoClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Disk cache for list ids and list bodies
    cache_manager: Option<CacheManager>,
    /// Base URL for the API (allows override for testing)
    base_url: String,
    /// Number of entries requested per list
    list_size: u32,
}

impl TrancoClient {
    pub fn builder() -> TrancoClientBuilder {
        TrancoClientBuilder::default()
    }

    fn list_id_key(date: NaiveDate) -> String {
        format!("list_id_{}", date.format("%Y-%m-%d"))
    }

    fn list_file(list_id: &str) -> String {
        format!("list_{}.csv", list_id)
    }

    /// Fetches and parses the list published for `date`
    ///
    /// # Behavior
    /// - The list id is read from the disk cache, otherwise requested
    /// - The list body is read from the disk cache, otherwise downloaded
    /// - Failures to write the disk cache are logged and ignored
    /// - Disk access and parsing run on the blocking pool, so a full list
    ///   never stalls the runtime threads
    pub async fn fetch_list(&self, date: NaiveDate) -> Result<DailyRanking, ProviderError> {
        let list_id = self.list_id(date).await?;
        let body = self.list_body(&list_id).await?;
        tokio::task::spawn_blocking(move || DailyRanking::from_csv(date, &body)).await?
    }

    async fn list_id(&self, date: NaiveDate) -> Result<String, ProviderError> {
        let key = Self::list_id_key(date);

        if let Some(ref cache_manager) = self.cache_manager {
            if let Some(cached) = cache_manager.read::<String>(&key) {
                debug!(%date, cached_at = %cached.cached_at, "list id from disk cache");
                return Ok(cached.data);
            }
        }

        let url = format!(
            "{}/daily_list_id?date={}&subdomains=false",
            self.base_url,
            date.format("%Y-%m-%d")
        );
        let list_id = self.get_text(&url).await?.trim().to_string();
        if list_id.is_empty() {
            return Err(ProviderError::MissingListId(date));
        }
        debug!(%date, %list_id, "resolved list id");

        if let Some(ref cache_manager) = self.cache_manager {
            if let Err(e) = cache_manager.write(&key, &list_id) {
                warn!(%date, error = %e, "failed to cache list id");
            }
        }
        Ok(list_id)
    }

    async fn list_body(&self, list_id: &str) -> Result<String, ProviderError> {
        let file = Self::list_file(list_id);

        if let Some(ref cache_manager) = self.cache_manager {
            let cache_manager = cache_manager.clone();
            let name = file.clone();
            if let Some(body) =
                tokio::task::spawn_blocking(move || cache_manager.read_raw(&name)).await?
            {
                return Ok(body);
            }
        }

        let url = format!("{}/download/{}/{}", self.base_url, list_id, self.list_size);
        let body = self.get_text(&url).await?;
        debug!(%list_id, bytes = body.len(), "downloaded list");

        let Some(ref cache_manager) = self.cache_manager else {
            return Ok(body);
        };
        let cache_manager = cache_manager.clone();
        let (body, written) = tokio::task::spawn_blocking(move || {
            let written = cache_manager.write_raw(&file, &body);
            (body, written)
        })
        .await?;
        if let Err(e) = written {
            warn!(%list_id, error = %e, "failed to cache list body");
        }
        Ok(body)
    }

    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

impl RankingProvider for TrancoClient {
    fn fetch(&self, date: NaiveDate) -> BoxFuture<'_, Result<DailyRanking, ProviderError>> {
        Box::pin(self.fetch_list(date))
    }
}

/// Builder for [`TrancoClient`]
#[derive(Debug)]
pub struct TrancoClientBuilder {
    cache_manager: Option<CacheManager>,
    base_url: String,
    list_size: u32,
    timeout: Duration,
}

impl Default for TrancoClientBuilder {
    fn default() -> Self {
        Self {
            cache_manager: None,
            base_url: TRANCO_BASE_URL.to_string(),
            list_size: DEFAULT_LIST_SIZE,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl TrancoClientBuilder {
    pub fn cache_manager(mut self, cache_manager: Option<CacheManager>) -> Self {
        self.cache_manager = cache_manager;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn list_size(mut self, list_size: u32) -> Self {
        self.list_size = list_size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> TrancoClient {
        // Building only fails if the TLS backend cannot initialise.
        let http_client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client");
                Client::new()
            });

        TrancoClient {
            http_client,
            cache_manager: self.cache_manager,
            base_url: self.base_url,
            list_size: self.list_size,
        }
    }
}
