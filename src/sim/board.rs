//! Pieces and the board they sit on

use std::sync::Arc;

use glam::IVec2;

use super::geometry::{
    Dims, GridPadding, Offset, coords_from_index, grid_dims, grid_padding, index_from_coords,
    is_inside_grid,
};
use crate::error::Result;
use crate::slicer::PieceBitmap;

/// Where a board cell sits relative to the play grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Inside the play grid
    Inside,
    /// In the padding ring (holding area)
    Outside,
}

/// One square piece of the image
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// `row * PIECE_ID_STRIDE + col` of the slice it was cut from
    pub id: u32,
    pub image: Arc<PieceBitmap>,
    /// Grid-local cell this piece belongs in
    pub correct_position: IVec2,
    /// Grid-local cell it occupies inside the grid, `None` while in the holding area
    pub position: Option<IVec2>,
    /// Grid-local holding slot this piece returns to
    pub outside_position: IVec2,
}

impl Piece {
    #[inline]
    pub fn is_placed_correctly(&self) -> bool {
        self.position == Some(self.correct_position)
    }
}

/// Derived board geometry: play area, padding and full board size.
///
/// Recomputed from the offset whenever the piece count changes; never mutated on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridGeometry {
    pub puzzle: Dims,
    pub padding: GridPadding,
    pub grid: Dims,
}

impl GridGeometry {
    pub fn new(puzzle: Dims, offset: &Offset) -> Self {
        let padding = grid_padding(offset);
        Self {
            puzzle,
            padding,
            grid: grid_dims(puzzle, padding),
        }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.grid.area()
    }

    /// Board coordinates of a cell index
    #[inline]
    pub fn coords(&self, index: usize) -> IVec2 {
        coords_from_index(index, self.grid.cols)
    }

    pub fn region(&self, index: usize) -> Region {
        let coords = self.coords(index);
        if is_inside_grid(coords.x, coords.y, self.padding, self.puzzle) {
            Region::Inside
        } else {
            Region::Outside
        }
    }

    /// Convert board coordinates to grid-local
    #[inline]
    pub fn to_local(&self, board: IVec2) -> IVec2 {
        board - self.padding.as_ivec2()
    }

    /// Board index of a grid-local cell (inside or in the holding ring)
    pub fn index_of_local(&self, local: IVec2) -> Result<usize> {
        let board = local + self.padding.as_ivec2();
        index_from_coords(board.x, board.y, self.grid.rows, self.grid.cols)
    }

    /// True when a grid-local cell lies in the play area
    #[inline]
    pub fn contains_local(&self, local: IVec2) -> bool {
        local.x >= 0
            && local.y >= 0
            && local.x < self.puzzle.cols as i32
            && local.y < self.puzzle.rows as i32
    }
}

/// Row-major board cells, each empty or holding one piece
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Board {
    pub geometry: GridGeometry,
    pub cells: Vec<Option<Piece>>,
}

impl Board {
    /// An empty board sized for `geometry`
    pub fn empty(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            cells: vec![None; geometry.cell_count()],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Piece> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten()
    }

    pub fn index_of_piece(&self, id: u32) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.as_ref().is_some_and(|p| p.id == id))
    }

    /// Number of pieces sitting on their correct cell
    pub fn placed_count(&self) -> usize {
        self.pieces().filter(|p| p.is_placed_correctly()).count()
    }

    /// A board is complete when it holds pieces and every one of them is on its
    /// correct cell. An uninitialized (empty) board is never complete.
    pub fn is_complete(&self) -> bool {
        !self.is_empty() && self.pieces().all(Piece::is_placed_correctly)
    }

    /// Check that each piece occupies the cell its `position`/`outside_position` names
    /// and that no piece id appears twice.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.cells.iter().enumerate().all(|(index, cell)| {
            let Some(piece) = cell else {
                return true;
            };
            let local = self.geometry.to_local(self.geometry.coords(index));
            let expected = match self.geometry.region(index) {
                Region::Inside => piece.position,
                Region::Outside => piece.position.is_none().then_some(piece.outside_position),
            };
            seen.insert(piece.id) && expected == Some(local)
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::parked_board;
    use super::*;

    #[test]
    fn test_geometry_regions() {
        let board = parked_board(3);
        let g = board.geometry;
        assert_eq!(g.padding, GridPadding { x: 1, y: 1 });
        assert_eq!(g.grid, Dims::new(5, 5));
        assert_eq!(g.region(0), Region::Outside);
        assert_eq!(g.region(6), Region::Inside);
        assert_eq!(g.to_local(g.coords(6)), IVec2::ZERO);
        assert_eq!(g.index_of_local(IVec2::new(0, -1)).unwrap(), 1);
    }

    #[test]
    fn test_parked_board_is_consistent_and_incomplete() {
        let board = parked_board(3);
        assert_eq!(board.pieces().count(), 9);
        assert!(board.is_consistent());
        assert!(!board.is_complete());
        assert_eq!(board.placed_count(), 0);
    }

    #[test]
    fn test_empty_board_is_not_complete() {
        assert!(!Board::default().is_complete());
    }

    #[test]
    fn test_complete_board_and_single_flip() {
        let mut board = parked_board(2);
        let g = board.geometry;
        let pieces: Vec<Piece> = board.cells.iter_mut().filter_map(Option::take).collect();
        for mut piece in pieces {
            piece.position = Some(piece.correct_position);
            let index = g.index_of_local(piece.correct_position).unwrap();
            board.cells[index] = Some(piece);
        }
        assert!(board.is_consistent());
        assert!(board.is_complete());

        // Point one piece at the wrong cell
        let index = g.index_of_local(IVec2::ZERO).unwrap();
        board.cells[index].as_mut().unwrap().position = Some(IVec2::new(1, 1));
        assert!(!board.is_complete());
    }

    #[test]
    fn test_index_of_piece() {
        let board = parked_board(3);
        let index = board.index_of_piece(10_001).unwrap();
        assert_eq!(board.get(index).unwrap().correct_position, IVec2::new(1, 1));
        assert_eq!(board.index_of_piece(42), None);
    }
}
