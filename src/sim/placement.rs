//! Drag-and-drop placement rules
//!
//! A drop is classified by the region of its source and destination cell, and the
//! pair selects exactly one rule:
//!
//! | from    | to      | rule                                                        |
//! |---------|---------|-------------------------------------------------------------|
//! | outside | inside  | place; an occupant is evicted to its own holding slot       |
//! | inside  | inside  | move into an empty cell, or swap with the occupant           |
//! | inside  | outside | return the piece to its own holding slot                     |
//! | outside | outside | nothing happens                                              |
//!
//! Holding cells are never addressed directly: a piece that leaves the grid always
//! goes back to the slot it was given when the session was built.

use glam::IVec2;

use super::board::{Board, Piece, Region};

/// A finished drag from the gesture layer, as board cell indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    pub active: usize,
    /// `None` when the drag was cancelled or released over nothing
    pub over: Option<usize>,
}

impl DragEnd {
    pub fn new(active: usize, over: usize) -> Self {
        Self {
            active,
            over: Some(over),
        }
    }

    pub fn cancelled(active: usize) -> Self {
        Self { active, over: None }
    }
}

/// What a drop did to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Piece moved into an empty grid cell
    Placed { piece: u32, at: IVec2 },
    /// Piece placed on an occupied cell; the occupant went back to its holding slot
    Evicted { piece: u32, at: IVec2, evicted: u32 },
    /// Two grid pieces traded cells
    Swapped { piece: u32, other: u32 },
    /// Piece left the grid for its holding slot
    Returned { piece: u32 },
    /// Board unchanged (cancelled, same cell, outside to outside, or invalid indices)
    Unchanged,
}

impl Transition {
    #[inline]
    pub fn changed_board(&self) -> bool {
        !matches!(self, Transition::Unchanged)
    }
}

/// Apply one drop to the board.
///
/// Never fails: a drop that references an empty source, an index past the end of the
/// board, or a holding slot that is not on the board leaves the board untouched.
pub fn apply_drag(board: &mut Board, drag: DragEnd) -> Transition {
    let Some(over) = drag.over else {
        return Transition::Unchanged;
    };
    let active = drag.active;
    if active >= board.len() || over >= board.len() || board.get(active).is_none() {
        log::debug!("Ignoring drop {} -> {}: no piece to move", active, over);
        return Transition::Unchanged;
    }

    let g = board.geometry;
    let transition = match (g.region(active), g.region(over)) {
        (Region::Outside, Region::Inside) => place_from_holding(board, active, over),
        (Region::Inside, Region::Inside) => move_within_grid(board, active, over),
        (Region::Inside, Region::Outside) => return_to_holding(board, active),
        (Region::Outside, Region::Outside) => Transition::Unchanged,
    };

    log::debug!("Drop {} -> {}: {:?}", active, over, transition);
    transition
}

/// Board index of the holding slot owned by `piece`
fn holding_index(board: &Board, piece: &Piece) -> Option<usize> {
    match board.geometry.index_of_local(piece.outside_position) {
        Ok(index) => Some(index),
        Err(err) => {
            log::error!("Piece {} has no holding cell: {}", piece.id, err);
            debug_assert!(false, "holding slot off the board: {err}");
            None
        }
    }
}

fn place_from_holding(board: &mut Board, active: usize, over: usize) -> Transition {
    let at = board.geometry.to_local(board.geometry.coords(over));

    // Resolve the eviction target before touching any cell
    let eviction = match board.get(over) {
        Some(occupant) => match holding_index(board, occupant) {
            Some(home) => Some(home),
            None => return Transition::Unchanged,
        },
        None => None,
    };

    let Some(mut piece) = board.cells[active].take() else {
        return Transition::Unchanged;
    };
    piece.position = Some(at);
    let id = piece.id;

    let evicted = match eviction {
        Some(home) => {
            let mut occupant = board.cells[over].take();
            if let Some(occupant) = occupant.as_mut() {
                occupant.position = None;
            }
            let evicted = occupant.as_ref().map(|p| p.id);
            board.cells[home] = occupant;
            evicted
        }
        None => None,
    };
    board.cells[over] = Some(piece);

    match evicted {
        Some(evicted) => Transition::Evicted {
            piece: id,
            at,
            evicted,
        },
        None => Transition::Placed { piece: id, at },
    }
}

fn move_within_grid(board: &mut Board, active: usize, over: usize) -> Transition {
    if active == over {
        return Transition::Unchanged;
    }
    let g = board.geometry;
    let from = g.to_local(g.coords(active));
    let to = g.to_local(g.coords(over));

    let Some(mut piece) = board.cells[active].take() else {
        return Transition::Unchanged;
    };
    piece.position = Some(to);
    let id = piece.id;

    match board.cells[over].take() {
        Some(mut other) => {
            other.position = Some(from);
            let other_id = other.id;
            board.cells[active] = Some(other);
            board.cells[over] = Some(piece);
            Transition::Swapped {
                piece: id,
                other: other_id,
            }
        }
        None => {
            board.cells[over] = Some(piece);
            Transition::Placed { piece: id, at: to }
        }
    }
}

fn return_to_holding(board: &mut Board, active: usize) -> Transition {
    let Some(home) = board.get(active).and_then(|piece| holding_index(board, piece)) else {
        return Transition::Unchanged;
    };
    let Some(mut piece) = board.cells[active].take() else {
        return Transition::Unchanged;
    };
    piece.position = None;
    let id = piece.id;
    board.cells[home] = Some(piece);
    Transition::Returned { piece: id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::test_support::parked_board;
    use proptest::prelude::*;

    /// Board index of the grid-local cell (x, y)
    fn cell(board: &Board, x: i32, y: i32) -> usize {
        board.geometry.index_of_local(IVec2::new(x, y)).unwrap()
    }

    fn holding_of(board: &Board, id: u32) -> usize {
        let piece = board.get(board.index_of_piece(id).unwrap()).unwrap();
        board.geometry.index_of_local(piece.outside_position).unwrap()
    }

    #[test]
    fn test_outside_to_empty_inside_places_piece() {
        let mut board = parked_board(3);
        let from = holding_of(&board, 0);
        let to = cell(&board, 1, 2);

        let t = apply_drag(&mut board, DragEnd::new(from, to));
        assert_eq!(
            t,
            Transition::Placed {
                piece: 0,
                at: IVec2::new(1, 2)
            }
        );
        assert!(board.get(from).is_none());
        assert_eq!(board.get(to).unwrap().position, Some(IVec2::new(1, 2)));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_outside_to_occupied_inside_evicts_to_own_slot() {
        let mut board = parked_board(3);
        let target = cell(&board, 0, 0);
        let first_home = holding_of(&board, 1);
        apply_drag(&mut board, DragEnd::new(first_home, target));

        let second_home = holding_of(&board, 2);
        let t = apply_drag(&mut board, DragEnd::new(second_home, target));
        assert_eq!(
            t,
            Transition::Evicted {
                piece: 2,
                at: IVec2::ZERO,
                evicted: 1
            }
        );
        // The evicted piece is back in its own slot, not the dragged piece's slot
        let evicted = board.get(first_home).unwrap();
        assert_eq!(evicted.id, 1);
        assert_eq!(evicted.position, None);
        assert!(board.get(second_home).is_none());
        assert_eq!(board.get(target).unwrap().id, 2);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_inside_to_empty_inside_moves() {
        let mut board = parked_board(3);
        let a = cell(&board, 0, 0);
        let b = cell(&board, 2, 2);
        let home = holding_of(&board, 0);
        apply_drag(&mut board, DragEnd::new(home, a));

        let t = apply_drag(&mut board, DragEnd::new(a, b));
        assert_eq!(
            t,
            Transition::Placed {
                piece: 0,
                at: IVec2::new(2, 2)
            }
        );
        assert!(board.get(a).is_none());
        assert!(board.is_consistent());
    }

    #[test]
    fn test_inside_to_occupied_inside_swaps() {
        let mut board = parked_board(3);
        let a = cell(&board, 0, 0);
        let b = cell(&board, 1, 0);
        let home = holding_of(&board, 0);
        apply_drag(&mut board, DragEnd::new(home, a));
        let home = holding_of(&board, 1);
        apply_drag(&mut board, DragEnd::new(home, b));

        let t = apply_drag(&mut board, DragEnd::new(a, b));
        assert_eq!(t, Transition::Swapped { piece: 0, other: 1 });
        assert_eq!(board.get(a).unwrap().id, 1);
        assert_eq!(board.get(a).unwrap().position, Some(IVec2::new(0, 0)));
        assert_eq!(board.get(b).unwrap().id, 0);
        assert_eq!(board.get(b).unwrap().position, Some(IVec2::new(1, 0)));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_drop_on_same_cell_is_noop() {
        let mut board = parked_board(3);
        let a = cell(&board, 1, 1);
        let home = holding_of(&board, 0);
        apply_drag(&mut board, DragEnd::new(home, a));
        let before = board.clone();
        assert_eq!(apply_drag(&mut board, DragEnd::new(a, a)), Transition::Unchanged);
        assert_eq!(board, before);
    }

    #[test]
    fn test_inside_to_outside_returns_home_regardless_of_target() {
        let mut board = parked_board(3);
        let home = holding_of(&board, 10_002);
        let a = cell(&board, 2, 1);
        apply_drag(&mut board, DragEnd::new(home, a));

        // Drop onto another piece's holding slot
        let foreign = holding_of(&board, 0);
        let t = apply_drag(&mut board, DragEnd::new(a, foreign));
        assert_eq!(t, Transition::Returned { piece: 10_002 });
        assert_eq!(board.get(home).unwrap().id, 10_002);
        assert_eq!(board.get(foreign).unwrap().id, 0);
        assert!(board.get(a).is_none());
        assert!(board.is_consistent());
    }

    #[test]
    fn test_cancelled_and_invalid_drops_are_noops() {
        let mut board = parked_board(3);
        let before = board.clone();
        let from = holding_of(&board, 0);

        assert_eq!(apply_drag(&mut board, DragEnd::cancelled(from)), Transition::Unchanged);
        assert_eq!(apply_drag(&mut board, DragEnd::new(9_999, 6)), Transition::Unchanged);
        assert_eq!(apply_drag(&mut board, DragEnd::new(from, 9_999)), Transition::Unchanged);
        // Empty source cell
        let empty = cell(&board, 1, 1);
        assert_eq!(apply_drag(&mut board, DragEnd::new(empty, from)), Transition::Unchanged);
        assert_eq!(board, before);
    }

    #[test]
    fn test_three_by_three_solves_by_placing_from_holding() {
        let mut board = parked_board(3);
        let ids: Vec<u32> = board.pieces().map(|p| p.id).collect();
        for id in ids {
            let from = board.index_of_piece(id).unwrap();
            let correct = board.get(from).unwrap().correct_position;
            let to = cell(&board, correct.x, correct.y);
            apply_drag(&mut board, DragEnd::new(from, to));
        }
        assert!(board.is_complete());
        assert!(board.is_consistent());
    }

    /// Scatter a few pieces into the grid so inside rules have something to act on
    fn scattered_board(moves: &[(usize, usize)]) -> Board {
        let mut board = parked_board(4);
        let n = board.len();
        for &(a, b) in moves {
            apply_drag(&mut board, DragEnd::new(a % n, b % n));
        }
        board
    }

    fn cells_where(board: &Board, region: Region, occupied: bool) -> Vec<usize> {
        (0..board.len())
            .filter(|&i| board.geometry.region(i) == region && board.get(i).is_some() == occupied)
            .collect()
    }

    fn outside_cells(board: &Board) -> Vec<usize> {
        (0..board.len())
            .filter(|&i| board.geometry.region(i) == Region::Outside)
            .collect()
    }

    fn moves() -> impl Strategy<Value = Vec<(usize, usize)>> {
        proptest::collection::vec((0usize..64, 0usize..64), 0..40)
    }

    proptest! {
        #[test]
        fn prop_outside_to_outside_is_identity(moves in moves(), a in 0usize..64, b in 0usize..64) {
            let mut board = scattered_board(&moves);
            let outside = outside_cells(&board);
            let (a, b) = (outside[a % outside.len()], outside[b % outside.len()]);
            let before = board.clone();
            prop_assert_eq!(apply_drag(&mut board, DragEnd::new(a, b)), Transition::Unchanged);
            prop_assert_eq!(board, before);
        }

        #[test]
        fn prop_swap_twice_restores(moves in moves(), a in 0usize..64, b in 0usize..64) {
            let mut board = scattered_board(&moves);
            let placed = cells_where(&board, Region::Inside, true);
            if placed.len() < 2 {
                return Ok(());
            }
            let (a, b) = (placed[a % placed.len()], placed[b % placed.len()]);
            if a == b {
                return Ok(());
            }

            let before = board.clone();
            apply_drag(&mut board, DragEnd::new(a, b));
            apply_drag(&mut board, DragEnd::new(a, b));
            prop_assert_eq!(board, before);
        }

        #[test]
        fn prop_every_drop_keeps_board_consistent(moves in moves()) {
            let board = scattered_board(&moves);
            prop_assert!(board.is_consistent());
            prop_assert_eq!(board.pieces().count(), 16);
        }

        #[test]
        fn prop_inside_to_outside_goes_home(moves in moves(), a in 0usize..64, b in 0usize..64) {
            let mut board = scattered_board(&moves);
            let placed = cells_where(&board, Region::Inside, true);
            if placed.is_empty() {
                return Ok(());
            }
            let outside = outside_cells(&board);
            let (a, b) = (placed[a % placed.len()], outside[b % outside.len()]);
            let piece = board.get(a).cloned().unwrap();

            apply_drag(&mut board, DragEnd::new(a, b));
            let home = board.geometry.index_of_local(piece.outside_position).unwrap();
            prop_assert_eq!(board.get(home).map(|p| p.id), Some(piece.id));
            prop_assert_eq!(board.get(home).unwrap().position, None);
            prop_assert!(board.get(a).is_none());
        }
    }
}
