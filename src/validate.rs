//! Request validation for `GET /api/ranks`
//!
//! Turns raw query parameters into a [`RankQuery`], rejecting malformed or
//! oversized requests before any list is fetched. Checks run in a fixed order
//! and the first failure wins.

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::{DateRange, RangeError, RankQuery};

/// Reasons a rank request is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDateFormat,

    #[error("Start date must be before end date")]
    InvalidRange,

    #[error("Date range too large. Please limit to 1 year.")]
    RangeTooLarge,
}

/// Query parameters as they arrive, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pub domain: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RawParams {
    /// Decodes a URL query string; the first occurrence of each key wins
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "domain" => &mut params.domain,
                "start_date" => &mut params.start_date,
                "end_date" => &mut params.end_date,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ValidationError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingParameter(name)),
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    // chrono accepts unpadded fields and short years, so pin the shape first
    let well_formed = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(ValidationError::InvalidDateFormat);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDateFormat)
}

/// Validates raw parameters into a [`RankQuery`]
pub fn validate(params: &RawParams) -> Result<RankQuery, ValidationError> {
    let domain = required(&params.domain, "domain")?;
    let start = required(&params.start_date, "start_date")?;
    let end = required(&params.end_date, "end_date")?;

    let start = parse_date(start)?;
    let end = parse_date(end)?;

    let range = DateRange::new(start, end).map_err(|e| match e {
        RangeError::Inverted => ValidationError::InvalidRange,
        RangeError::TooLarge => ValidationError::RangeTooLarge,
    })?;

    Ok(RankQuery {
        domain: domain.to_string(),
        range,
    })
}
