//! Completion records
//!
//! One record per puzzle: when each difficulty was last completed. Used to show
//! "recently completed" badges in the gallery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::RECENT_COMPLETION_MS;
use crate::error::Result;
use crate::platform::KeyValueStore;

const KEY_PREFIX: &str = "drag_jigsaw_completions";

/// Completion timestamps for one puzzle, keyed by piece count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Completions {
    /// Piece count -> Unix timestamp (ms) of the latest completion
    pub entries: BTreeMap<u32, f64>,
}

impl Completions {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    fn storage_key(puzzle_id: &str) -> String {
        format!("{}:{}", KEY_PREFIX, puzzle_id)
    }

    /// Record a completion, replacing any older timestamp for that difficulty
    pub fn record(&mut self, item_count: u32, timestamp: f64) {
        self.entries.insert(item_count, timestamp);
    }

    pub fn completed_at(&self, item_count: u32) -> Option<f64> {
        self.entries.get(&item_count).copied()
    }

    /// Completed at this difficulty within `RECENT_COMPLETION_MS` of `now`
    pub fn is_recent(&self, item_count: u32, now: f64) -> bool {
        self.completed_at(item_count)
            .is_some_and(|at| now - at <= RECENT_COMPLETION_MS)
    }

    /// Largest piece count ever completed
    pub fn best_item_count(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the record for a puzzle; missing or corrupt data yields an empty record
    pub fn load(store: &dyn KeyValueStore, puzzle_id: &str) -> Self {
        if let Ok(Some(json)) = store.get(&Self::storage_key(puzzle_id)) {
            match serde_json::from_str::<Completions>(&json) {
                Ok(completions) => {
                    log::info!(
                        "Loaded {} completions for {}",
                        completions.entries.len(),
                        puzzle_id
                    );
                    return completions;
                }
                Err(err) => log::warn!("Ignoring corrupt completions for {}: {}", puzzle_id, err),
            }
        }
        Self::new()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore, puzzle_id: &str) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(&Self::storage_key(puzzle_id), &json)?;
        log::info!("Completions saved for {} ({} entries)", puzzle_id, self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

    #[test]
    fn test_record_and_recent() {
        let mut completions = Completions::new();
        assert!(completions.is_empty());
        assert_eq!(completions.best_item_count(), None);

        completions.record(9, 1000.0);
        completions.record(25, 2000.0);
        completions.record(9, 3000.0);

        assert_eq!(completions.completed_at(9), Some(3000.0));
        assert_eq!(completions.best_item_count(), Some(25));
        assert!(completions.is_recent(9, 3000.0 + 6.0 * DAY_MS));
        assert!(!completions.is_recent(9, 3000.0 + 8.0 * DAY_MS));
        assert!(!completions.is_recent(16, 3000.0));
    }

    #[test]
    fn test_save_and_load_per_puzzle() {
        let mut store = MemoryStore::new();
        let mut completions = Completions::new();
        completions.record(16, 42.0);
        completions.save(&mut store, "harbor").unwrap();

        assert_eq!(Completions::load(&store, "harbor"), completions);
        assert!(Completions::load(&store, "forest").is_empty());
    }

    #[test]
    fn test_corrupt_record_is_empty() {
        let mut store = MemoryStore::new();
        store.set("drag_jigsaw_completions:harbor", "[1,2").unwrap();
        assert!(Completions::load(&store, "harbor").is_empty());
    }
}
