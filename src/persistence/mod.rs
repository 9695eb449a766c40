//! Saved puzzle progress
//!
//! Features:
//! - Versioned JSON record per `(puzzle id, piece count)`
//! - Maps each piece's correct cell (`"x-y"`) to the grid cell it currently occupies
//! - Keeps elapsed play time and the hint set so a restored session looks the same
//! - Unknown versions and corrupt JSON are treated as "no saved progress"

use std::collections::BTreeMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::KeyValueStore;
use crate::session::PuzzleSession;

/// Current record layout version
pub const PROGRESS_VERSION: u32 = 1;

const KEY_PREFIX: &str = "drag_jigsaw_progress";

/// Storage key for a puzzle at a given difficulty
pub fn progress_key(puzzle_id: &str, item_count: u32) -> String {
    format!("{}:{}:{}", KEY_PREFIX, puzzle_id, item_count)
}

/// Key under which a piece is recorded: its correct position as `"x-y"`
pub fn piece_key(correct: IVec2) -> String {
    format!("{}-{}", correct.x, correct.y)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub version: u32,
    /// Correct position key -> current grid-local position. Pieces in the holding
    /// area have no entry.
    pub positions: BTreeMap<String, IVec2>,
    pub play_time_secs: u64,
    /// Correct positions of the pieces shown as hints
    pub placeholders: Vec<IVec2>,
}

impl Default for SavedProgress {
    fn default() -> Self {
        Self {
            version: PROGRESS_VERSION,
            positions: BTreeMap::new(),
            play_time_secs: 0,
            placeholders: Vec::new(),
        }
    }
}

impl SavedProgress {
    /// Snapshot the placed pieces, clock and hints of a live session
    pub fn capture(session: &PuzzleSession) -> Self {
        let positions = session
            .board
            .pieces()
            .filter_map(|piece| {
                piece
                    .position
                    .map(|pos| (piece_key(piece.correct_position), pos))
            })
            .collect();
        Self {
            version: PROGRESS_VERSION,
            positions,
            play_time_secs: session.play_time_secs(),
            placeholders: session.placeholders.iter().map(|p| p.position).collect(),
        }
    }

    /// Saved grid position for the piece that belongs at `correct`
    pub fn position_of(&self, correct: IVec2) -> Option<IVec2> {
        self.positions.get(&piece_key(correct)).copied()
    }

    /// Load saved progress. Missing, corrupt or foreign-version records yield `None`.
    pub fn load(store: &dyn KeyValueStore, puzzle_id: &str, item_count: u32) -> Option<Self> {
        let key = progress_key(puzzle_id, item_count);
        let json = match store.get(&key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("Could not read progress {}: {}", key, err);
                return None;
            }
        };
        match serde_json::from_str::<SavedProgress>(&json) {
            Ok(progress) if progress.version == PROGRESS_VERSION => {
                log::info!(
                    "Loaded progress for {} ({} pieces placed)",
                    key,
                    progress.positions.len()
                );
                Some(progress)
            }
            Ok(progress) => {
                log::warn!("Ignoring progress {} with version {}", key, progress.version);
                None
            }
            Err(err) => {
                log::warn!("Ignoring corrupt progress {}: {}", key, err);
                None
            }
        }
    }

    pub fn save(
        &self,
        store: &mut dyn KeyValueStore,
        puzzle_id: &str,
        item_count: u32,
    ) -> Result<()> {
        let key = progress_key(puzzle_id, item_count);
        let json = serde_json::to_string(self)?;
        store.set(&key, &json)?;
        log::debug!("Progress saved ({} pieces placed)", self.positions.len());
        Ok(())
    }

    pub fn clear(store: &mut dyn KeyValueStore, puzzle_id: &str, item_count: u32) -> Result<()> {
        store.remove(&progress_key(puzzle_id, item_count))
    }
}
