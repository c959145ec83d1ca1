//! Core data models for rankwatch
//!
//! This module contains the types that flow between the validator, the
//! resolver, and the HTTP layer: date ranges, queries, per-day results, and
//! the daily ranking lists fetched from the provider.

pub mod provider;
pub mod ranking;
pub mod tranco;

pub use provider::{ProviderError, RankingProvider};
pub use ranking::DailyRanking;
pub use tranco::TrancoClient;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Largest allowed distance in days between the start and end of a range
pub const MAX_RANGE_DAYS: i64 = 365;

/// An inclusive range of calendar dates
///
/// Only constructible through [`DateRange::new`], which guarantees
/// `start <= end` and a span of at most [`MAX_RANGE_DAYS`] days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Reasons a pair of dates cannot form a [`DateRange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// The start date comes after the end date
    Inverted,
    /// The span exceeds [`MAX_RANGE_DAYS`]
    TooLarge,
}

impl DateRange {
    /// Creates a range, checking ordering and span
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted);
        }
        if (end - start).num_days() > MAX_RANGE_DAYS {
            return Err(RangeError::TooLarge);
        }
        Ok(Self { start, end })
    }

    /// First date of the range
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the range (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// A valid range always covers at least one day
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates every date from start to end inclusive, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len() as i64).map(move |offset| start + Duration::days(offset))
    }
}

/// A validated request for a domain's ranks over a date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankQuery {
    /// Domain to look up, passed through verbatim
    pub domain: String,
    /// Dates to resolve
    pub range: DateRange,
}

/// Why a day resolved the way it did
///
/// Not part of the JSON output: both `NotRanked` and `Unavailable` serialize
/// as `"rank": null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankStatus {
    /// The domain appears in that day's list
    Ranked,
    /// The list was available but the domain is not in it
    NotRanked,
    /// The list for that day could not be fetched
    Unavailable,
}

/// The rank of a domain on a single day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayResult {
    /// Calendar date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Rank on that date, or `None` if unknown
    pub rank: Option<u32>,
    /// How the rank was determined
    #[serde(skip)]
    pub status: RankStatus,
}

impl DayResult {
    pub fn ranked(date: NaiveDate, rank: u32) -> Self {
        Self {
            date,
            rank: Some(rank),
            status: RankStatus::Ranked,
        }
    }

    pub fn not_ranked(date: NaiveDate) -> Self {
        Self {
            date,
            rank: None,
            status: RankStatus::NotRanked,
        }
    }

    pub fn unavailable(date: NaiveDate) -> Self {
        Self {
            date,
            rank: None,
            status: RankStatus::Unavailable,
        }
    }
}

/// Successful body of `GET /api/ranks`
#[derive(Debug, Clone, Serialize)]
pub struct RanksResponse {
    pub domain: String,
    pub ranks: Vec<DayResult>,
}

/// Body of every JSON error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
