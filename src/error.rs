//! Crate error type

/// Everything that can go wrong while building or persisting a puzzle.
///
/// Placement itself never fails: a drop that cannot be resolved is a no-op.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error("invalid configuration: {item_count} pieces is not a non-zero perfect square")]
    InvalidConfiguration { item_count: u32 },

    #[error("coordinates ({x}, {y}) out of bounds for a {rows}x{cols} grid")]
    OutOfBounds { x: i32, y: i32, rows: u32, cols: u32 },

    #[error("failed to load puzzle image: {0}")]
    AssetLoadFailure(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PuzzleError>;
