use serde::Deserialize;

use crate::piece::{Color, PieceType};

/// Public move-suggestion service the browser board talks to by default.
pub const DEFAULT_ORACLE_ENDPOINT: &str = "https://chess-api.com/v1";

/// Where and how to ask for the opponent's move.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct OracleConfig {
    /// POST target; receives `{"fen": ...}` and answers `{"move": ...}`.
    pub endpoint: String,
    /// Give up on the request after this many milliseconds.
    pub timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            endpoint: DEFAULT_ORACLE_ENDPOINT.to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Session settings. Every field is optional when read from JSON.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Colour played by the person at the board; the oracle plays the other.
    pub human: Color,
    /// Piece a human pawn becomes when no choice accompanies the move.
    pub default_promotion: PieceType,
    pub oracle: OracleConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        GameConfig {
            human: Color::White,
            default_promotion: PieceType::Queen,
            oracle: OracleConfig::default(),
        }
    }
}
