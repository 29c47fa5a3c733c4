// Host layer - the game-server side of the plugin.
//
// Owns the single-threaded host loop, moves store calls onto the worker
// pool and brings their results back as continuations.

#[path = "scheduler.rs"]
pub mod scheduler;

#[path = "player_directory.rs"]
pub mod player_directory;

#[path = "sweeper.rs"]
pub mod sweeper;

#[path = "console/mod.rs"]
pub mod console;
