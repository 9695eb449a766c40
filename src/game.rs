//! Game controller
//!
//! Owns everything a running game needs (settings, the live session, the background
//! loader and storage) and turns UI events into explicit calls on the session.
//! Nothing here is global: the UI holds a `Game` and calls into it.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::completions::Completions;
use crate::error::{PuzzleError, Result};
use crate::loader::SessionLoader;
use crate::persistence::SavedProgress;
use crate::platform::{KeyValueStore, now_ms};
use crate::session::{PuzzleSession, SessionBuilder, SessionPhase};
use crate::settings::Settings;
use crate::sim::{DragEnd, Transition};
use crate::slicer::{ImageSlicer, SourceImage};
use crate::view::BoardView;

/// Result of a drop, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOutcome {
    pub transition: Transition,
    /// Play the drop sound
    pub play_sound: bool,
    /// This drop finished the puzzle
    pub completed: bool,
}

impl DropOutcome {
    fn unchanged() -> Self {
        Self {
            transition: Transition::Unchanged,
            play_sound: false,
            completed: false,
        }
    }
}

pub struct Game {
    pub settings: Settings,
    store: Box<dyn KeyValueStore>,
    loader: SessionLoader,
    session: Option<PuzzleSession>,
    puzzle_id: String,
    image: Option<Arc<SourceImage>>,
    /// Image behind the installed session, which outlives a failed newer build
    live_image: Option<Arc<SourceImage>>,
    completions: Completions,
    level: u32,
    visible: bool,
    overlay_open: bool,
    notice: Option<String>,
    seeds: Pcg32,
}

impl Game {
    pub fn new(store: Box<dyn KeyValueStore>, slicer: Arc<dyn ImageSlicer>) -> Self {
        Self::with_seed(store, slicer, now_ms() as u64)
    }

    /// Deterministic shuffles: every build draws its seed from this one
    pub fn with_seed(
        store: Box<dyn KeyValueStore>,
        slicer: Arc<dyn ImageSlicer>,
        seed: u64,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        Self {
            settings,
            store,
            loader: SessionLoader::new(slicer),
            session: None,
            puzzle_id: String::new(),
            image: None,
            live_image: None,
            completions: Completions::new(),
            level: 0,
            visible: true,
            overlay_open: false,
            notice: None,
            seeds: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn session(&self) -> Option<&PuzzleSession> {
        self.session.as_ref()
    }

    pub fn completions(&self) -> &Completions {
        &self.completions
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn puzzle_id(&self) -> &str {
        &self.puzzle_id
    }

    /// True while a build for the current configuration is still running
    pub fn is_loading(&self) -> bool {
        self.loader.is_pending()
    }

    /// User-facing notice from the last failed build, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Start (or resume) a puzzle with the current difficulty. Returns the build generation.
    pub fn start_level(&mut self, puzzle_id: impl Into<String>, image: Arc<SourceImage>) -> u64 {
        self.puzzle_id = puzzle_id.into();
        self.image = Some(image.clone());
        self.completions = Completions::load(self.store.as_ref(), &self.puzzle_id);
        let item_count = self.settings.item_count;
        let saved = SavedProgress::load(self.store.as_ref(), &self.puzzle_id, item_count);
        self.queue_build(item_count, image, saved)
    }

    pub fn next_level(&mut self, puzzle_id: impl Into<String>, image: Arc<SourceImage>) -> u64 {
        self.level += 1;
        self.start_level(puzzle_id, image)
    }

    /// Change difficulty and rebuild the current puzzle
    pub fn set_item_count(&mut self, item_count: u32) -> Result<()> {
        self.settings.set_item_count(item_count)?;
        if let Err(err) = self.settings.save(self.store.as_mut()) {
            log::warn!("Could not save settings: {}", err);
        }
        if let Some(image) = self.image.clone() {
            let saved = SavedProgress::load(self.store.as_ref(), &self.puzzle_id, item_count);
            self.queue_build(item_count, image, saved);
        }
        Ok(())
    }

    /// Throw away progress and deal a fresh shuffle of the board being played. Without a
    /// live session the last requested puzzle is dealt instead.
    pub fn restart(&mut self) {
        let (puzzle_id, item_count, image) = match (&self.session, &self.live_image) {
            (Some(session), Some(image)) => {
                (session.puzzle_id.clone(), session.item_count, image.clone())
            }
            _ => match &self.image {
                Some(image) => (
                    self.puzzle_id.clone(),
                    self.settings.item_count,
                    image.clone(),
                ),
                None => return,
            },
        };
        if let Err(err) = SavedProgress::clear(self.store.as_mut(), &puzzle_id, item_count) {
            log::warn!("Could not clear progress: {}", err);
        }
        self.puzzle_id = puzzle_id;
        self.image = Some(image.clone());
        self.queue_build(item_count, image, None);
    }

    fn queue_build(
        &mut self,
        item_count: u32,
        image: Arc<SourceImage>,
        saved: Option<SavedProgress>,
    ) -> u64 {
        let builder = SessionBuilder::new(self.puzzle_id.clone(), item_count)
            .seed(self.seeds.random())
            .saved_progress(saved);
        self.loader.request(builder, image)
    }

    /// Install the newest finished build, if any. Returns true when a new session
    /// replaced the board.
    pub fn poll_loader(&mut self) -> bool {
        match self.loader.poll() {
            Some(result) => self.install(result),
            None => false,
        }
    }

    /// Block until the newest build finishes, then install it
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_for_session(&mut self) -> bool {
        match self.loader.wait() {
            Some(result) => self.install(result),
            None => false,
        }
    }

    fn install(&mut self, result: Result<PuzzleSession>) -> bool {
        match result {
            Ok(session) => {
                log::info!(
                    "Session ready: {} ({} pieces, generation {})",
                    session.puzzle_id,
                    session.item_count,
                    session.generation
                );
                self.session = Some(session);
                self.live_image = self.image.clone();
                true
            }
            Err(PuzzleError::AssetLoadFailure(reason)) => {
                log::error!("Failed to load puzzle image: {}", reason);
                self.notice = Some("Failed to load puzzle image".to_string());
                false
            }
            Err(err) => {
                log::error!("Session build failed: {}", err);
                self.notice = Some(err.to_string());
                false
            }
        }
    }

    /// A drag began on `index`
    pub fn drag_start(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut() {
            if session.board.get(index).is_some() {
                session.begin_drag();
            }
        }
    }

    /// A drag ended over `over` (`None` when released over nothing)
    pub fn drag_end(&mut self, active: usize, over: Option<usize>) -> DropOutcome {
        let Some(session) = self.session.as_mut() else {
            return DropOutcome::unchanged();
        };
        let was_complete = session.phase == SessionPhase::Complete;
        let transition = session.drop_piece(DragEnd { active, over });
        if !transition.changed_board() {
            return DropOutcome::unchanged();
        }

        let completed = !was_complete && session.phase == SessionPhase::Complete;
        if completed {
            self.on_complete();
        } else {
            self.save_progress();
        }

        DropOutcome {
            transition,
            play_sound: self.settings.play_sound,
            completed,
        }
    }

    fn on_complete(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.completions.record(session.item_count, now_ms());
        if let Err(err) = self.completions.save(self.store.as_mut(), &session.puzzle_id) {
            log::warn!("Could not save completion: {}", err);
        }
        if let Err(err) =
            SavedProgress::clear(self.store.as_mut(), &session.puzzle_id, session.item_count)
        {
            log::warn!("Could not clear progress: {}", err);
        }
    }

    fn save_progress(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let progress = SavedProgress::capture(session);
        if let Err(err) =
            progress.save(self.store.as_mut(), &session.puzzle_id, session.item_count)
        {
            log::warn!("Could not save progress: {}", err);
        }
    }

    pub fn toggle_pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.toggle_pause();
        if session.phase == SessionPhase::Paused {
            self.save_progress();
        }
    }

    /// Page/tab visibility changed
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Help, settings or difficulty picker opened/closed over the board
    pub fn set_overlay_open(&mut self, open: bool) {
        self.overlay_open = open;
    }

    pub fn advance_clock(&mut self, dt: f64) {
        let running = self.visible && !self.overlay_open;
        if let Some(session) = self.session.as_mut() {
            session.advance_clock(dt, running);
        }
    }

    pub fn view(&self) -> Option<BoardView> {
        self.session
            .as_ref()
            .map(|s| BoardView::capture(s, self.settings.show_hints))
    }
}
