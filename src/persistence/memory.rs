//! In-memory result store

use super::{Clock, NewResult, ResultStore, RoundResult, SystemClock, best, rank};
use crate::config::Difficulty;
use crate::error::StoreError;

/// Keeps results for the lifetime of the process
pub struct MemoryStore<C: Clock = SystemClock> {
    records: Vec<RoundResult>,
    next_id: u64,
    clock: C,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<C: Clock> ResultStore for MemoryStore<C> {
    fn add_result(&mut self, result: NewResult) -> Result<(), StoreError> {
        let record = RoundResult::new(self.next_id, self.clock.now_unix_ms(), result);
        self.next_id += 1;
        self.records.push(record);
        Ok(())
    }

    fn top_results(
        &self,
        limit: usize,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<RoundResult>, StoreError> {
        Ok(rank(&self.records, limit, difficulty))
    }

    fn best_rating(&self, difficulty: Option<Difficulty>) -> Result<f64, StoreError> {
        Ok(best(&self.records, difficulty))
    }
}
