//! In-memory cache of daily ranking lists
//!
//! Holds at most `capacity` lists keyed by date and evicts the least recently
//! used one when a new date would overflow it. Shared across requests behind
//! a mutex; the lock is never held across an await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::debug;

use crate::data::DailyRanking;

/// Default number of daily lists kept in memory
pub const MAX_ENTRIES: usize = 50;

#[derive(Debug)]
struct Slot {
    ranking: Arc<DailyRanking>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct LruState {
    slots: HashMap<NaiveDate, Slot>,
    clock: u64,
}

impl LruState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_oldest(&mut self) -> Option<NaiveDate> {
        let victim = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(date, _)| *date)?;
        self.slots.remove(&victim);
        Some(victim)
    }
}

/// Capacity-bounded, least-recently-used map of date to ranking list
#[derive(Debug)]
pub struct RankingCache {
    capacity: usize,
    state: Mutex<LruState>,
}

impl Default for RankingCache {
    fn default() -> Self {
        Self::new(MAX_ENTRIES)
    }
}

impl RankingCache {
    /// Creates an empty cache; a capacity of zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LruState::default()),
        }
    }

    // A panic while holding the lock cannot leave a slot half-written.
    fn lock(&self) -> MutexGuard<'_, LruState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the list for `date`, marking it as most recently used
    pub fn get(&self, date: NaiveDate) -> Option<Arc<DailyRanking>> {
        let mut state = self.lock();
        let now = state.tick();
        let slot = state.slots.get_mut(&date)?;
        slot.last_used = now;
        Some(Arc::clone(&slot.ranking))
    }

    /// Stores the list for `date`, evicting the least recently used entry if full
    pub fn insert(&self, date: NaiveDate, ranking: Arc<DailyRanking>) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.lock();
        let now = state.tick();

        if !state.slots.contains_key(&date) {
            while state.slots.len() >= self.capacity {
                match state.evict_oldest() {
                    Some(evicted) => debug!(%evicted, %date, "evicted ranking list from cache"),
                    None => break,
                }
            }
        }

        state.slots.insert(
            date,
            Slot {
                ranking,
                last_used: now,
            },
        );
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.lock().slots.contains_key(&date)
    }

    /// Number of cached lists
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
