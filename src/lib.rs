//! Chess rules engine over immutable boards with a depth-bounded minimax
//! search.
//!
//! A [`chess::board::Board`] is never mutated: executing a
//! [`chess::moves::Move`] produces a new board, legality is decided by
//! trying the move and checking whether the mover's king ends up attacked.
//! [`search::MiniMax`] picks moves using [`evaluation::StandardBoardEvaluator`]
//! and [`Engine`] drives everything from a line-based command stream.

pub mod chess;
pub mod evaluation;
pub mod search;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Build profile and whether debug assertions are enabled. Produced by
/// `build.rs`.
const FLAVOR: &str = include_str!(concat!(env!("OUT_DIR"), "/flavor"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the engine version on start-up.
pub fn print_engine_info() {
    println!("{} {}", env!("CARGO_PKG_NAME"), engine_version());
}

/// Prints the build flavor and whether the build is clean on start-up.
pub fn print_binary_info() {
    println!("Build: {FLAVOR}");
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
