//! Caches for ranking lists
//!
//! `RankingCache` keeps recently used daily lists in memory for the lifetime
//! of the process. `CacheManager` persists provider responses to disk so a
//! restarted server does not download the same lists again.

mod manager;
mod ranking;

pub use manager::{CacheManager, CachedData};
pub use ranking::{RankingCache, MAX_ENTRIES};
