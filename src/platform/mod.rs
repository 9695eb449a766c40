//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Key/value storage (LocalStorage on web, a directory of JSON files on native)

pub mod storage;
pub mod time;

pub use storage::{FileStore, KeyValueStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
pub use time::now_ms;
