//! Drag Jigsaw entry point
//!
//! Native: deals a puzzle, prints the board, solves it with drag/drop events and
//! prints the result. Usage: `drag-jigsaw [ITEM_COUNT] [SEED] [IMAGE_PATH]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Drag Jigsaw (native) starting...");

    if let Err(err) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build drives `Game` from the page, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;
    use std::sync::Arc;

    use drag_jigsaw::consts::DEFAULT_ITEM_COUNT;
    use drag_jigsaw::platform::{MemoryStore, now_ms};
    use drag_jigsaw::sim::Transition;
    use drag_jigsaw::slicer::{TileSlicer, gradient_image, load_image};
    use drag_jigsaw::{Game, PuzzleError, Result, format_duration};

    const USAGE: &str = "usage: drag-jigsaw [ITEM_COUNT] [SEED] [IMAGE_PATH]";

    fn parse_arg<T: std::str::FromStr>(arg: Option<&String>, what: &str) -> Option<T> {
        arg.map(|s| {
            s.parse().unwrap_or_else(|_| {
                eprintln!("invalid {}: {}\n{}", what, s, USAGE);
                std::process::exit(2)
            })
        })
    }

    pub fn run(args: Vec<String>) -> Result<()> {
        let item_count = parse_arg(args.first(), "item count").unwrap_or(DEFAULT_ITEM_COUNT);
        let seed = parse_arg(args.get(1), "seed").unwrap_or(now_ms() as u64);

        let (puzzle_id, image) = match args.get(2) {
            Some(path) => {
                let id = Path::new(path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                (id, load_image(path)?)
            }
            None => ("gradient".to_string(), gradient_image(512, 512)),
        };

        let mut game = Game::with_seed(Box::new(MemoryStore::new()), Arc::new(TileSlicer), seed);
        game.set_item_count(item_count)?;
        game.start_level(puzzle_id, Arc::new(image));
        if !game.wait_for_session() {
            let notice = game
                .take_notice()
                .unwrap_or_else(|| "no session was built".to_string());
            return Err(PuzzleError::AssetLoadFailure(notice));
        }

        let Some(view) = game.view() else {
            return Ok(());
        };
        println!("Dealt {} pieces (seed {}):\n{}", item_count, seed, view);

        let (mut drops, mut evictions) = (0, 0);
        let mut last = now_ms();
        loop {
            // Next piece still waiting in the holding area, dropped onto its own cell
            let Some((from, to)) = game.session().and_then(|session| {
                let board = &session.board;
                let geometry = session.geometry();
                (0..board.len()).find_map(|index| {
                    let piece = board.get(index)?;
                    if piece.position.is_some() {
                        return None;
                    }
                    let to = geometry.index_of_local(piece.correct_position).ok()?;
                    Some((index, to))
                })
            }) else {
                break;
            };

            game.drag_start(from);
            let now = now_ms();
            game.advance_clock((now - last) / 1000.0);
            last = now;
            let outcome = game.drag_end(from, Some(to));
            drops += 1;
            if matches!(outcome.transition, Transition::Evicted { .. }) {
                evictions += 1;
            }
            if outcome.completed || !outcome.transition.changed_board() {
                break;
            }
        }

        if let (Some(view), Some(session)) = (game.view(), game.session()) {
            println!("{}", view);
            println!(
                "{:?} after {} drops ({} evictions) in {}",
                session.phase,
                drops,
                evictions,
                format_duration(session.play_time_secs())
            );
        }
        Ok(())
    }
}
