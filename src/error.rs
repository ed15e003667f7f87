//! Error types for the rule engine and the game controller.

use thiserror::Error;

use crate::square::Square;

/// Why a position-notation string could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("expected 6 space-separated fields, found {0}")]
    FieldCount(usize),

    #[error("piece placement must describe 8 ranks, found {0}")]
    RankCount(usize),

    #[error("rank {rank} describes {squares} squares instead of 8")]
    RankWidth { rank: usize, squares: usize },

    #[error("unknown piece letter '{0}'")]
    PieceLetter(char),

    #[error("side to move must be 'w' or 'b', found '{0}'")]
    SideToMove(String),

    #[error("invalid castling field '{0}'")]
    Castling(String),

    #[error("invalid en-passant field '{0}'")]
    EnPassant(String),

    #[error("invalid move counter '{0}'")]
    Counter(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// The move is not among the legal moves of the piece on `from`.
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    /// The position is corrupted (e.g. a king is missing). Fatal to the session.
    #[error("internal invariant violated: {message}")]
    InternalInvariantViolation { message: String },

    /// The move-suggestion service failed or replied with something unusable.
    #[error("move oracle unavailable: {reason}")]
    OracleUnavailable { reason: String },

    #[error("invalid position notation: {0}")]
    InvalidNotation(#[from] NotationError),

    #[error("invalid move string '{text}'")]
    InvalidMoveString { text: String },

    /// A move was attempted for the side that is not to move.
    #[error("it is not this side's turn")]
    OutOfTurn,

    /// Input arrived while the oracle reply is still outstanding.
    #[error("waiting for the oracle reply")]
    ReplyPending,

    #[error("no oracle reply is pending")]
    NoReplyPending,

    #[error("the game is over")]
    GameOver,
}

impl ChessError {
    pub fn invariant(message: impl Into<String>) -> Self {
        ChessError::InternalInvariantViolation { message: message.into() }
    }

    pub fn oracle(reason: impl Into<String>) -> Self {
        ChessError::OracleUnavailable { reason: reason.into() }
    }

    /// Recoverable errors leave the session playable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ChessError::InternalInvariantViolation { .. })
    }
}

pub type ChessResult<T> = Result<T, ChessError>;
