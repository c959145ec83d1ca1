//! A single day's ranked list of domains

use std::collections::HashMap;

use chrono::NaiveDate;

use super::ProviderError;

/// Domain ranks for one calendar date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRanking {
    date: NaiveDate,
    ranks: HashMap<String, u32>,
}

impl DailyRanking {
    /// Creates a ranking from already-parsed `(domain, rank)` pairs
    pub fn new<I, S>(date: NaiveDate, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            date,
            ranks: entries
                .into_iter()
                .map(|(domain, rank)| (domain.into(), rank))
                .collect(),
        }
    }

    /// Parses the provider's CSV form, one `rank,domain` pair per line
    ///
    /// Blank lines are skipped. If a domain appears more than once the best
    /// (lowest) rank is kept.
    pub fn from_csv(date: NaiveDate, csv: &str) -> Result<Self, ProviderError> {
        let mut ranks = HashMap::new();

        for (index, line) in csv.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (rank, domain) = line.split_once(',').ok_or_else(|| ProviderError::MalformedList {
                line: index + 1,
                reason: "expected `rank,domain`".to_string(),
            })?;

            let rank: u32 = rank.trim().parse().map_err(|e| ProviderError::MalformedList {
                line: index + 1,
                reason: format!("invalid rank '{}': {}", rank.trim(), e),
            })?;
            let domain = domain.trim();
            if rank == 0 || domain.is_empty() {
                return Err(ProviderError::MalformedList {
                    line: index + 1,
                    reason: "rank must be positive and domain non-empty".to_string(),
                });
            }

            ranks
                .entry(domain.to_string())
                .and_modify(|existing: &mut u32| *existing = (*existing).min(rank))
                .or_insert(rank);
        }

        Ok(Self { date, ranks })
    }

    /// Date this list was published for
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Rank of `domain`, matched exactly as given
    pub fn rank(&self, domain: &str) -> Option<u32> {
        self.ranks.get(domain).copied()
    }

    /// Number of ranked domains
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    #[test]
    fn test_parse_tranco_csv() {
        let csv = "1,google.com\r\n2,facebook.com\n3,example.com\n\n";
        let ranking = DailyRanking::from_csv(day(), csv).unwrap();

        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking.date(), day());
        assert_eq!(ranking.rank("google.com"), Some(1));
        assert_eq!(ranking.rank("example.com"), Some(3));
    }

    #[test]
    fn test_absent_domain_is_none() {
        let ranking = DailyRanking::new(day(), [("example.com", 500)]);
        assert_eq!(ranking.rank("missing.org"), None);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let ranking = DailyRanking::new(day(), [("example.com", 500)]);
        assert_eq!(ranking.rank("Example.com"), None);
    }

    #[test]
    fn test_duplicate_domain_keeps_best_rank() {
        let ranking = DailyRanking::from_csv(day(), "7,dup.com\n3,dup.com\n").unwrap();
        assert_eq!(ranking.rank("dup.com"), Some(3));
    }

    #[test]
    fn test_line_without_comma_is_malformed() {
        let err = DailyRanking::from_csv(day(), "1,google.com\nnot a csv line\n").unwrap_err();
        match err {
            ProviderError::MalformedList { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_rank_is_malformed() {
        let err = DailyRanking::from_csv(day(), "first,google.com\n").unwrap_err();
        assert!(err.to_string().contains("invalid rank"));
    }

    #[test]
    fn test_zero_rank_is_malformed() {
        assert!(DailyRanking::from_csv(day(), "0,google.com\n").is_err());
    }
}
