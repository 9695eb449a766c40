//! Puzzle sessions: building a shuffled board and playing it
//!
//! A session is built once per (image, piece count) and rebuilt wholesale on a
//! difficulty change, a new level or a restart. Pieces are only ever relocated.

use std::sync::Arc;

use glam::IVec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use crate::consts::PIECE_ID_STRIDE;
use crate::error::{PuzzleError, Result};
use crate::persistence::SavedProgress;
use crate::sim::{
    Board, DragEnd, GridGeometry, Offset, Piece, Transition, apply_drag,
    layout_outside_positions, puzzle_dims,
};
use crate::slicer::{ImageSlicer, PieceBitmap, SourceImage};

/// Faint hint image drawn in the empty cell a piece belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Grid-local correct position of the hinted piece
    pub position: IVec2,
    pub image: Arc<PieceBitmap>,
}

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Board dealt, clock not running until the first drag
    NotStarted,
    /// Active play
    Playing,
    /// Paused by the player
    Paused,
    /// Every piece is on its correct cell
    Complete,
}

/// Builds a session: slice, shuffle, deal to holding slots, restore saved progress
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    puzzle_id: String,
    item_count: u32,
    seed: u64,
    generation: u64,
    saved: Option<SavedProgress>,
}

impl SessionBuilder {
    pub fn new(puzzle_id: impl Into<String>, item_count: u32) -> Self {
        Self {
            puzzle_id: puzzle_id.into(),
            item_count,
            seed: 0,
            generation: 0,
            saved: None,
        }
    }

    /// Shuffle seed; the same seed always deals the same board
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn saved_progress(mut self, saved: Option<SavedProgress>) -> Self {
        self.saved = saved;
        self
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn puzzle_id(&self) -> &str {
        &self.puzzle_id
    }

    pub fn build(&self, slicer: &dyn ImageSlicer, image: &SourceImage) -> Result<PuzzleSession> {
        let puzzle = puzzle_dims(self.item_count)?;
        let layout = layout_outside_positions(puzzle.rows, puzzle.cols);
        let geometry = GridGeometry::new(puzzle, &layout.offset);

        log::info!(
            "Building {} ({} pieces, seed {}, generation {})",
            self.puzzle_id,
            self.item_count,
            self.seed,
            self.generation
        );

        let tiles = slicer.slice(image, puzzle.rows, puzzle.cols)?;
        if tiles.len() != puzzle.area() {
            return Err(PuzzleError::AssetLoadFailure(format!(
                "slicer returned {} tiles for {} pieces",
                tiles.len(),
                puzzle.area()
            )));
        }

        let mut pieces: Vec<Piece> = tiles
            .into_iter()
            .enumerate()
            .map(|(i, tile)| {
                let row = i as u32 / puzzle.cols;
                let col = i as u32 % puzzle.cols;
                Piece {
                    id: row * PIECE_ID_STRIDE + col,
                    image: Arc::new(tile),
                    correct_position: IVec2::new(col as i32, row as i32),
                    position: None,
                    outside_position: IVec2::ZERO,
                }
            })
            .collect();

        let mut rng = Pcg32::seed_from_u64(self.seed);
        pieces.shuffle(&mut rng);

        for (piece, slot) in pieces.iter_mut().zip(&layout.positions) {
            piece.outside_position = *slot;
        }

        let placeholders = self.select_placeholders(&pieces, puzzle.cols);

        let mut board = Board::empty(geometry);
        for piece in pieces {
            let index = geometry.index_of_local(piece.outside_position)?;
            board.cells[index] = Some(piece);
        }

        let mut play_time = 0.0;
        if let Some(saved) = &self.saved {
            restore_positions(&mut board, saved)?;
            play_time = saved.play_time_secs as f64;
        }

        Ok(PuzzleSession {
            puzzle_id: self.puzzle_id.clone(),
            item_count: self.item_count,
            seed: self.seed,
            generation: self.generation,
            offset: layout.offset,
            board,
            placeholders,
            phase: SessionPhase::NotStarted,
            play_time,
        })
    }

    /// Hints come from saved progress when present, otherwise the first `dim - 2`
    /// shuffled pieces.
    fn select_placeholders(&self, shuffled: &[Piece], dim: u32) -> Vec<Placeholder> {
        let hint = |piece: &Piece| Placeholder {
            position: piece.correct_position,
            image: piece.image.clone(),
        };
        match &self.saved {
            Some(saved) => shuffled
                .iter()
                .filter(|p| saved.placeholders.contains(&p.correct_position))
                .map(hint)
                .collect(),
            None => shuffled
                .iter()
                .take(dim.saturating_sub(2) as usize)
                .map(hint)
                .collect(),
        }
    }
}

/// Move pieces from their holding slots to the grid cells recorded in `saved`
fn restore_positions(board: &mut Board, saved: &SavedProgress) -> Result<()> {
    let geometry = board.geometry;
    let mut restored = 0;
    for home in 0..board.len() {
        let Some(target) = board
            .get(home)
            .filter(|p| p.position.is_none())
            .and_then(|p| saved.position_of(p.correct_position))
        else {
            continue;
        };
        if !geometry.contains_local(target) {
            log::warn!("Saved position ({}, {}) is off the grid", target.x, target.y);
            continue;
        }
        let index = geometry.index_of_local(target)?;
        if board.cells[index].is_some() {
            log::warn!("Saved position ({}, {}) is already taken", target.x, target.y);
            continue;
        }
        if let Some(mut piece) = board.cells[home].take() {
            piece.position = Some(target);
            board.cells[index] = Some(piece);
            restored += 1;
        }
    }
    log::debug!("Restored {} pieces from saved progress", restored);
    Ok(())
}

/// A live puzzle: the board plus everything derived from the build
#[derive(Debug, Clone)]
pub struct PuzzleSession {
    pub puzzle_id: String,
    pub item_count: u32,
    pub seed: u64,
    /// Build generation this session came from
    pub generation: u64,
    pub offset: Offset,
    pub board: Board,
    pub placeholders: Vec<Placeholder>,
    pub phase: SessionPhase,
    /// Accumulated play time in seconds
    play_time: f64,
}

impl PuzzleSession {
    #[inline]
    pub fn geometry(&self) -> GridGeometry {
        self.board.geometry
    }

    pub fn play_time_secs(&self) -> u64 {
        self.play_time as u64
    }

    pub fn is_complete(&self) -> bool {
        self.board.is_complete()
    }

    /// Hint for a grid-local cell, if one was selected for it
    pub fn placeholder_at(&self, local: IVec2) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.position == local)
    }

    /// A drag began; the first one starts the clock
    pub fn begin_drag(&mut self) {
        if matches!(self.phase, SessionPhase::NotStarted | SessionPhase::Paused) {
            self.phase = SessionPhase::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            SessionPhase::Playing => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Playing,
            other => other,
        };
    }

    /// Accumulate play time while playing. `running` is false when the view is
    /// hidden or an overlay covers the board.
    pub fn advance_clock(&mut self, dt: f64, running: bool) {
        if running && self.phase == SessionPhase::Playing && dt > 0.0 {
            self.play_time += dt;
        }
    }

    /// Apply a drop. Drops after completion are ignored.
    pub fn drop_piece(&mut self, drag: DragEnd) -> Transition {
        if self.phase == SessionPhase::Complete {
            return Transition::Unchanged;
        }
        let transition = apply_drag(&mut self.board, drag);
        if transition.changed_board() && self.board.is_complete() {
            self.phase = SessionPhase::Complete;
            log::info!(
                "Puzzle {} ({} pieces) complete in {}s",
                self.puzzle_id,
                self.item_count,
                self.play_time_secs()
            );
        }
        transition
    }
}
