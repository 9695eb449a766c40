//! Deterministic puzzle core
//!
//! All board logic lives here. This module must stay pure:
//! - No I/O, clocks or global state
//! - Seeded RNG only (used by the session builder)
//! - Coordinate math only through `geometry`

pub mod board;
pub mod geometry;
pub mod layout;
pub mod placement;

pub use board::{Board, GridGeometry, Piece, Region};
pub use geometry::{
    Dims, GridPadding, Offset, coords_from_index, grid_dims, grid_padding, index_from_coords,
    is_inside_grid, puzzle_dims,
};
pub use layout::{OutsideLayout, layout_outside_positions};
pub use placement::{DragEnd, Transition, apply_drag};
