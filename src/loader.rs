//! Background session builds
//!
//! Slicing a large image is slow, so builds run off the interactive thread. Each
//! request is tagged with a generation number; when the player changes difficulty
//! faster than builds finish, only the newest generation is ever installed and late
//! results from older requests are dropped.
//!
//! A worker only produces a new session from a snapshot of its inputs. It never
//! touches the board that is currently being played.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::{PuzzleError, Result};
use crate::session::{PuzzleSession, SessionBuilder};
use crate::slicer::{ImageSlicer, SourceImage};

struct BuildOutcome {
    generation: u64,
    result: Result<PuzzleSession>,
}

pub struct SessionLoader {
    slicer: Arc<dyn ImageSlicer>,
    latest: u64,
    pending: bool,
    stale_dropped: u64,
    tx: Sender<BuildOutcome>,
    rx: Receiver<BuildOutcome>,
}

impl SessionLoader {
    pub fn new(slicer: Arc<dyn ImageSlicer>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            slicer,
            latest: 0,
            pending: false,
            stale_dropped: 0,
            tx,
            rx,
        }
    }

    /// Queue a build and return its generation. Any build still in flight becomes stale.
    pub fn request(&mut self, builder: SessionBuilder, image: Arc<SourceImage>) -> u64 {
        self.latest += 1;
        self.pending = true;
        let generation = self.latest;
        let builder = builder.generation(generation);
        let slicer = self.slicer.clone();
        let tx = self.tx.clone();

        log::debug!(
            "Queued build {} ({} pieces)",
            generation,
            builder.item_count()
        );
        spawn_build(move || {
            // A panicking slicer still reports back, so `wait` never blocks forever
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                builder.build(slicer.as_ref(), &image)
            }))
            .unwrap_or_else(|_| {
                log::error!("Build {} panicked", generation);
                Err(PuzzleError::AssetLoadFailure(format!(
                    "build {} panicked",
                    generation
                )))
            });
            // The loader may be gone by the time a build finishes
            let _ = tx.send(BuildOutcome { generation, result });
        });
        generation
    }

    /// Newest generation handed out so far
    pub fn latest_generation(&self) -> u64 {
        self.latest
    }

    /// True while the newest request has not produced a result
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of late results discarded because a newer build had been requested
    pub fn stale_dropped(&self) -> u64 {
        self.stale_dropped
    }

    /// Non-blocking: the newest build's result if it has arrived
    pub fn poll(&mut self) -> Option<Result<PuzzleSession>> {
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => {
                    if let Some(result) = self.accept(outcome) {
                        return Some(result);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Block until the newest build finishes. Returns `None` when nothing is pending.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait(&mut self) -> Option<Result<PuzzleSession>> {
        while self.pending {
            let outcome = self.rx.recv().ok()?;
            if let Some(result) = self.accept(outcome) {
                return Some(result);
            }
        }
        None
    }

    fn accept(&mut self, outcome: BuildOutcome) -> Option<Result<PuzzleSession>> {
        if outcome.generation != self.latest {
            self.stale_dropped += 1;
            log::info!(
                "Dropping stale build {} (latest is {})",
                outcome.generation,
                self.latest
            );
            return None;
        }
        self.pending = false;
        Some(outcome.result)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_build(job: impl FnOnce() + Send + 'static) {
    std::thread::spawn(job);
}

/// No threads on the web target; the build runs on the browser's task queue and is
/// picked up by the next `poll`
#[cfg(target_arch = "wasm32")]
fn spawn_build(job: impl FnOnce() + Send + 'static) {
    wasm_bindgen_futures::spawn_local(async move { job() });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::{PieceBitmap, TileSlicer, gradient_image};
    use std::time::Duration;

    /// Slices normally, but takes longer for bigger grids
    struct SlowSlicer;

    impl ImageSlicer for SlowSlicer {
        fn slice(&self, image: &SourceImage, rows: u32, cols: u32) -> Result<Vec<PieceBitmap>> {
            if rows > 3 {
                std::thread::sleep(Duration::from_millis(150));
            }
            TileSlicer.slice(image, rows, cols)
        }
    }

    fn image() -> Arc<SourceImage> {
        Arc::new(gradient_image(64, 64))
    }

    #[test]
    fn test_single_build() {
        let mut loader = SessionLoader::new(Arc::new(TileSlicer));
        assert!(loader.wait().is_none());

        let generation = loader.request(SessionBuilder::new("a", 9), image());
        let session = loader.wait().unwrap().unwrap();
        assert_eq!(session.generation, generation);
        assert_eq!(session.item_count, 9);
        assert!(!loader.is_pending());
    }

    #[test]
    fn test_stale_build_is_dropped() {
        let mut loader = SessionLoader::new(Arc::new(SlowSlicer));
        loader.request(SessionBuilder::new("a", 16), image());
        let newest = loader.request(SessionBuilder::new("a", 9), image());

        let session = loader.wait().unwrap().unwrap();
        assert_eq!(session.generation, newest);
        assert_eq!(session.item_count, 9);

        // The slow 16-piece build arrives later and must not be installed
        std::thread::sleep(Duration::from_millis(500));
        assert!(loader.poll().is_none());
        assert_eq!(loader.stale_dropped(), 1);
    }

    struct PanickingSlicer;

    impl ImageSlicer for PanickingSlicer {
        fn slice(&self, _: &SourceImage, _: u32, _: u32) -> Result<Vec<PieceBitmap>> {
            panic!("decoder crashed");
        }
    }

    #[test]
    fn test_panicking_build_is_reported() {
        let mut loader = SessionLoader::new(Arc::new(PanickingSlicer));
        loader.request(SessionBuilder::new("a", 9), image());

        // Wait on a helper thread so a hang fails the test instead of stalling the suite
        let (done_tx, done_rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = loader.wait();
            let _ = done_tx.send((result, loader.is_pending()));
        });
        let (result, pending) = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, Some(Err(PuzzleError::AssetLoadFailure(_)))));
        assert!(!pending);
    }

    #[test]
    fn test_failed_build_is_reported() {
        let mut loader = SessionLoader::new(Arc::new(TileSlicer));
        loader.request(SessionBuilder::new("a", 12), image());
        assert!(matches!(
            loader.wait(),
            Some(Err(PuzzleError::InvalidConfiguration { item_count: 12 }))
        ));
    }
}
