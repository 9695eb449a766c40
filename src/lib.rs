//! Drag Jigsaw - a sliding/drag jigsaw puzzle engine
//!
//! Core modules:
//! - `sim`: Deterministic puzzle core (geometry, spiral layout, placement rules)
//! - `session`: Session building (slice, shuffle, place, restore progress)
//! - `loader`: Background session builds with stale-result dropping
//! - `game`: Event-driven controller that owns the live session
//! - `persistence`: Saved progress per puzzle and difficulty
//! - `platform`: Time and key/value storage backends

pub mod completions;
pub mod error;
pub mod game;
pub mod loader;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod slicer;
pub mod view;

pub use completions::Completions;
pub use error::{PuzzleError, Result};
pub use game::{DropOutcome, Game};
pub use session::{PuzzleSession, SessionBuilder, SessionPhase};
pub use settings::{Locale, Settings};

/// Game configuration constants
pub mod consts {
    /// Piece id multiplier: `id = row * PIECE_ID_STRIDE + col`
    pub const PIECE_ID_STRIDE: u32 = 10_000;

    /// Item counts offered in the difficulty picker (3x3 through 16x16)
    pub const PUZZLE_SIZES: [u32; 14] = [
        9, 16, 25, 36, 49, 64, 81, 100, 121, 144, 169, 196, 225, 256,
    ];
    pub const DEFAULT_ITEM_COUNT: u32 = 9;

    /// Opacity of the faint hint image drawn in empty cells
    pub const HINT_OPACITY: f32 = 0.4;

    /// Completions newer than this earn a "recently completed" badge (7 days)
    pub const RECENT_COMPLETION_MS: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;
}

/// Format whole seconds of play time as `MM:SS`, or `H:MM:SS` past the hour
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}
