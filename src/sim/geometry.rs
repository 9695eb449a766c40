//! Grid geometry: index/coordinate conversion and grid membership
//!
//! Board cells are stored row-major. Two coordinate spaces are in use:
//! - board coordinates: (0, 0) is the top-left cell of the full board, padding included
//! - grid-local coordinates: (0, 0) is the top-left cell of the play grid
//!
//! Converting grid-local to board coordinates adds the padding. Every other module
//! goes through these functions rather than doing the arithmetic itself.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};

/// Size of a rectangular area in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dims {
    pub rows: u32,
    pub cols: u32,
}

impl Dims {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells
    #[inline]
    pub fn area(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Asymmetric margin (in cells) needed on each side to hold every outside slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Offset {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

/// Symmetric padding actually reserved around the play grid so it stays centered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPadding {
    pub x: u32,
    pub y: u32,
}

impl GridPadding {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub fn as_ivec2(&self) -> IVec2 {
        IVec2::new(self.x as i32, self.y as i32)
    }
}

/// Play-area dimensions for a piece count. The count must be a non-zero perfect square.
pub fn puzzle_dims(item_count: u32) -> Result<Dims> {
    let dim = item_count.isqrt();
    if item_count == 0 || dim * dim != item_count {
        return Err(PuzzleError::InvalidConfiguration { item_count });
    }
    Ok(Dims::new(dim, dim))
}

pub fn grid_padding(offset: &Offset) -> GridPadding {
    GridPadding {
        x: offset.left.max(offset.right),
        y: offset.top.max(offset.bottom),
    }
}

/// Full board dimensions: the play area plus padding on both sides of each axis
pub fn grid_dims(puzzle: Dims, padding: GridPadding) -> Dims {
    Dims {
        rows: puzzle.rows + 2 * padding.y,
        cols: puzzle.cols + 2 * padding.x,
    }
}

#[inline]
pub fn coords_from_index(index: usize, cols: u32) -> IVec2 {
    let cols = cols as usize;
    IVec2::new((index % cols) as i32, (index / cols) as i32)
}

pub fn index_from_coords(x: i32, y: i32, rows: u32, cols: u32) -> Result<usize> {
    if x < 0 || y < 0 || x >= cols as i32 || y >= rows as i32 {
        return Err(PuzzleError::OutOfBounds { x, y, rows, cols });
    }
    Ok(y as usize * cols as usize + x as usize)
}

/// True when board cell (x, y) lies in the centered play area rather than the padding ring
#[inline]
pub fn is_inside_grid(x: i32, y: i32, padding: GridPadding, puzzle: Dims) -> bool {
    let pad = padding.as_ivec2();
    x >= pad.x && x < pad.x + puzzle.cols as i32 && y >= pad.y && y < pad.y + puzzle.rows as i32
}
