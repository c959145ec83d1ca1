//! Source of daily ranking lists

use chrono::NaiveDate;
use futures::future::BoxFuture;
use thiserror::Error;

use super::DailyRanking;

/// Errors that can occur when fetching a day's ranking list
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Provider returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// No list exists for the requested date
    #[error("No list available for {0}")]
    MissingListId(NaiveDate),

    /// The list body could not be parsed
    #[error("Malformed list at line {line}: {reason}")]
    MalformedList { line: usize, reason: String },

    /// A blocking disk read or parse task panicked or was cancelled
    #[error("List loading task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Anything that can produce the ranking list for a calendar date
///
/// Implementations may do network I/O and keep their own caches; callers
/// treat every error as "no data for that day".
pub trait RankingProvider: Send + Sync {
    fn fetch(&self, date: NaiveDate) -> BoxFuture<'_, Result<DailyRanking, ProviderError>>;
}

impl<P: RankingProvider + ?Sized> RankingProvider for std::sync::Arc<P> {
    fn fetch(&self, date: NaiveDate) -> BoxFuture<'_, Result<DailyRanking, ProviderError>> {
        (**self).fetch(date)
    }
}
