//! Render snapshot handed to the presentation layer
//!
//! The presentation layer only reads this; it never touches the board directly.

use std::fmt;

use glam::IVec2;

use crate::consts::HINT_OPACITY;
use crate::session::PuzzleSession;
use crate::sim::{Dims, GridPadding, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceView {
    pub id: u32,
    pub correct_position: IVec2,
    /// On its correct cell (drawn without the drag affordance once complete)
    pub placed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HintView {
    /// Id of the piece whose image is shown faintly
    pub piece_id: u32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub index: usize,
    /// Board coordinates
    pub coords: IVec2,
    pub inside: bool,
    pub piece: Option<PieceView>,
    pub hint: Option<HintView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub puzzle_dims: Dims,
    pub grid_dims: Dims,
    pub grid_padding: GridPadding,
    pub cells: Vec<CellView>,
    pub complete: bool,
}

impl BoardView {
    /// Snapshot a session. Hints are only attached when `show_hints` is on.
    pub fn capture(session: &PuzzleSession, show_hints: bool) -> Self {
        let g = session.geometry();
        let hint_id = |local: IVec2| {
            session
                .placeholder_at(local)
                .and_then(|_| {
                    session
                        .board
                        .pieces()
                        .find(|p| p.correct_position == local)
                })
                .map(|p| p.id)
        };

        let cells = session
            .board
            .cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let coords = g.coords(index);
                let inside = g.region(index) == Region::Inside;
                let hint = if cell.is_none() && inside && show_hints {
                    hint_id(g.to_local(coords)).map(|piece_id| HintView {
                        piece_id,
                        opacity: HINT_OPACITY,
                    })
                } else {
                    None
                };
                CellView {
                    index,
                    coords,
                    inside,
                    piece: cell.as_ref().map(|p| PieceView {
                        id: p.id,
                        correct_position: p.correct_position,
                        placed: p.is_placed_correctly(),
                    }),
                    hint,
                }
            })
            .collect();

        Self {
            puzzle_dims: g.puzzle,
            grid_dims: g.grid,
            grid_padding: g.padding,
            cells,
            complete: session.is_complete(),
        }
    }

    pub fn row(&self, y: u32) -> &[CellView] {
        let cols = self.grid_dims.cols as usize;
        let start = y as usize * cols;
        &self.cells[start..start + cols]
    }
}

/// Text grid: pieces as their correct `xy`, `..` for empty grid cells, `~~` for hints
impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.grid_dims.rows {
            for cell in self.row(y) {
                match (&cell.piece, &cell.hint) {
                    (Some(piece), _) => {
                        let c = piece.correct_position;
                        if piece.placed {
                            write!(f, "[{:x}{:x}]", c.x, c.y)?;
                        } else {
                            write!(f, " {:x}{:x} ", c.x, c.y)?;
                        }
                    }
                    (None, Some(_)) => write!(f, " ~~ ")?,
                    (None, None) if cell.inside => write!(f, " .. ")?,
                    (None, None) => write!(f, "    ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionBuilder;
    use crate::sim::DragEnd;
    use crate::slicer::{TileSlicer, gradient_image};

    fn session() -> PuzzleSession {
        SessionBuilder::new("view", 9)
            .seed(2)
            .build(&TileSlicer, &gradient_image(30, 30))
            .unwrap()
    }

    #[test]
    fn test_capture_dimensions_and_regions() {
        let view = BoardView::capture(&session(), true);
        assert_eq!(view.grid_dims, Dims::new(5, 5));
        assert_eq!(view.grid_padding, GridPadding { x: 1, y: 1 });
        assert_eq!(view.cells.len(), 25);
        assert_eq!(view.cells.iter().filter(|c| c.inside).count(), 9);
        assert_eq!(view.cells.iter().filter(|c| c.piece.is_some()).count(), 9);
        assert!(!view.complete);
    }

    #[test]
    fn test_hints_respect_setting_and_occupancy() {
        let mut session = session();
        let hinted = session.placeholders[0].position;

        let view = BoardView::capture(&session, true);
        let index = session.geometry().index_of_local(hinted).unwrap();
        let hint = view.cells[index].hint.unwrap();
        assert_eq!(hint.opacity, HINT_OPACITY);
        assert_eq!(view.cells.iter().filter(|c| c.hint.is_some()).count(), 1);

        assert!(BoardView::capture(&session, false)
            .cells
            .iter()
            .all(|c| c.hint.is_none()));

        // Once the hinted cell is filled the hint disappears
        let from = session.board.index_of_piece(hint.piece_id).unwrap();
        session.drop_piece(DragEnd::new(from, index));
        let view = BoardView::capture(&session, true);
        assert!(view.cells[index].hint.is_none());
        assert!(view.cells[index].piece.unwrap().placed);
    }

    #[test]
    fn test_text_rendering_shape() {
        let text = BoardView::capture(&session(), true).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.len() == 20));
        assert!(text.contains("~~"));
    }
}
