pub mod attacks;
pub mod board;
pub mod config;
pub mod error;
pub mod execute;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod oracle;
pub mod piece;
pub mod position;
pub mod square;
pub mod status;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use error::{ChessError, ChessResult};
pub use game::GameController;
pub use moves::Move;
pub use position::Position;
pub use square::Square;

/// Set by the build script.
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
