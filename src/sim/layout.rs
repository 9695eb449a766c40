//! Spiral layout of outside (holding) positions
//!
//! Pieces start in a ring of cells around the play grid. The ring is grown as a
//! square spiral, clockwise, one ring at a time:
//!
//! ```text
//!   b 0 1 2      ring 1 around a 2x2 grid (#), slots in emit order
//!   a # # 3
//!   9 # # 4
//!   8 7 6 5
//! ```
//!
//! Ring `k` is the border of the rectangle `[-k, cols-1+k] x [-k, rows-1+k]`. Each ring
//! begins one cell right of its top-left corner and ends on that corner, so the next
//! ring can start without revisiting a cell. The walk stops as soon as every piece has
//! a slot, which means the last ring is usually partial and the margin is asymmetric.

use glam::IVec2;

use super::geometry::Offset;

/// Outside slots for every piece plus the margin they require
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutsideLayout {
    pub offset: Offset,
    /// Grid-local positions, all outside `[0, cols) x [0, rows)`
    pub positions: Vec<IVec2>,
}

/// Compute `rows * cols` distinct outside positions and the per-side offset.
///
/// Deterministic in `(rows, cols)`. `offset.top` is always at least 1 because the first
/// slot sits directly above the grid's top-left cell.
pub fn layout_outside_positions(rows: u32, cols: u32) -> OutsideLayout {
    let mut walk = SpiralWalk::new(rows, cols);
    let (rows, cols) = (rows as i32, cols as i32);

    let mut ring = 1;
    while !walk.is_full() {
        let top = -ring;
        let left = -ring;
        let right = cols - 1 + ring;
        let bottom = rows - 1 + ring;

        // Right along the row above, down the right column, left along the row
        // below, then up the left column back to the corner.
        walk.leg((left + 1..=right).map(|x| IVec2::new(x, top)));
        walk.leg((top + 1..=bottom).map(|y| IVec2::new(right, y)));
        walk.leg((left..right).rev().map(|x| IVec2::new(x, bottom)));
        walk.leg((top..bottom).rev().map(|y| IVec2::new(left, y)));

        ring += 1;
    }

    walk.finish()
}

struct SpiralWalk {
    rows: i32,
    cols: i32,
    capacity: usize,
    positions: Vec<IVec2>,
    offset: Offset,
}

impl SpiralWalk {
    fn new(rows: u32, cols: u32) -> Self {
        let capacity = rows as usize * cols as usize;
        Self {
            rows: rows as i32,
            cols: cols as i32,
            capacity,
            positions: Vec::with_capacity(capacity),
            offset: Offset {
                top: 1,
                ..Offset::default()
            },
        }
    }

    fn is_full(&self) -> bool {
        self.positions.len() >= self.capacity
    }

    /// Emit positions along one leg until the walk is full, then record how far
    /// past each grid edge the leg reached.
    fn leg(&mut self, cells: impl Iterator<Item = IVec2>) {
        let start = self.positions.len();
        for pos in cells {
            if self.is_full() {
                break;
            }
            self.positions.push(pos);
        }

        for pos in &self.positions[start..] {
            let offset = &mut self.offset;
            offset.top = offset.top.max((-pos.y).max(0) as u32);
            offset.left = offset.left.max((-pos.x).max(0) as u32);
            offset.right = offset.right.max((pos.x - (self.cols - 1)).max(0) as u32);
            offset.bottom = offset.bottom.max((pos.y - (self.rows - 1)).max(0) as u32);
        }
    }

    fn finish(self) -> OutsideLayout {
        OutsideLayout {
            offset: self.offset,
            positions: self.positions,
        }
    }
}
