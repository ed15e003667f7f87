// =============================================================================
// Game controller
//
// Owns the one current Position of a session and turns board clicks into
// moves. The human plays `config.human`; the other side's moves come from a
// move oracle. While an oracle reply is outstanding the position is frozen:
// clicks are ignored and direct moves are refused, so a late reply can never
// race a second human move.
//
//   AwaitingSelection --own piece--> AwaitingDestination
//   AwaitingDestination --same/illegal square--> AwaitingSelection
//   AwaitingDestination --legal square--> AwaitingOracleReply
//   AwaitingOracleReply --reply applied / failure--> AwaitingSelection
//   any move that ends the game --> GameOver
// =============================================================================

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::attacks::is_king_in_check;
use crate::config::GameConfig;
use crate::error::{ChessError, ChessResult};
use crate::execute;
use crate::movegen;
use crate::moves::Move;
use crate::oracle::Oracle;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::square::Square;
use crate::status::{status_with_history, GameStatus};

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "phase")]
pub enum Phase {
    AwaitingSelection,
    AwaitingDestination { from: Square, targets: Vec<Square> },
    AwaitingOracleReply,
    GameOver { status: GameStatus },
}

/// What a board click did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A piece was picked up; `targets` are the squares to highlight.
    Selected { from: Square, targets: Vec<Square> },
    /// The pending selection was dropped.
    Cleared,
    /// A move was committed. `notation` is the resulting position, ready to
    /// hand to the oracle when the phase is `AwaitingOracleReply`.
    Moved { mv: Move, notation: String },
    /// Nothing happened: wrong piece, empty square, or a reply is pending.
    Ignored,
}

pub struct GameController {
    position: Position,
    phase: Phase,
    config: GameConfig,
    /// `position_hash` of every position reached this session, for repetition.
    history: Vec<u64>,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameController {
    pub fn new(config: GameConfig) -> Self {
        Self::from_position(Position::initial(), config)
    }

    /// Resume from an arbitrary position.
    pub fn from_position(position: Position, config: GameConfig) -> Self {
        let history = vec![position.position_hash()];
        let mut controller = GameController {
            position,
            phase: Phase::AwaitingSelection,
            config,
            history,
        };
        if let Ok(s) = controller.status() {
            if s.is_over() {
                controller.phase = Phase::GameOver { status: s };
            }
        }
        controller
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> ChessResult<GameStatus> {
        status_with_history(&self.position, &self.history)
    }

    pub fn current_notation(&self) -> String {
        self.position.to_notation()
    }

    pub fn legal_moves(&self, sq: Square) -> ChessResult<Vec<Square>> {
        movegen::legal_moves(&self.position, sq)
    }

    pub fn is_in_check(&self, color: Color) -> ChessResult<bool> {
        is_king_in_check(&self.position, color)
    }

    /// True while the human may pick up pieces.
    pub fn is_humans_turn(&self) -> bool {
        self.position.side_to_move() == self.config.human
            && matches!(
                self.phase,
                Phase::AwaitingSelection | Phase::AwaitingDestination { .. }
            )
    }

    /// Handle a click on square `index` (0..63).
    pub fn select_square(&mut self, index: usize) -> ChessResult<Selection> {
        let Some(sq) = Square::new(index) else {
            return Ok(Selection::Ignored);
        };

        match std::mem::replace(&mut self.phase, Phase::AwaitingSelection) {
            Phase::AwaitingSelection => {
                let own = self
                    .position
                    .board()
                    .piece_at(sq)
                    .map(|p| p.color == self.config.human)
                    .unwrap_or(false);
                if !own || self.position.side_to_move() != self.config.human {
                    return Ok(Selection::Ignored);
                }
                let targets = self.legal_moves(sq)?;
                debug!("selected {sq}, {} destinations", targets.len());
                self.phase = Phase::AwaitingDestination { from: sq, targets: targets.clone() };
                Ok(Selection::Selected { from: sq, targets })
            }
            Phase::AwaitingDestination { from, targets } => {
                if sq == from || !targets.contains(&sq) {
                    return Ok(Selection::Cleared);
                }
                let mv = self.human_move(from, sq);
                let notation = self.commit(mv, true)?;
                Ok(Selection::Moved { mv, notation })
            }
            other => {
                self.phase = other;
                Ok(Selection::Ignored)
            }
        }
    }

    /// Play a complete human move in one call (e.g. typed rather than clicked).
    /// Returns the notation of the resulting position.
    pub fn attempt_move(&mut self, mv: Move) -> ChessResult<String> {
        self.ensure_idle()?;
        if self.position.side_to_move() != self.config.human {
            return Err(ChessError::OutOfTurn);
        }
        let mv = match mv.promotion {
            Some(_) => mv,
            None => self.human_move(mv.from, mv.to),
        };
        self.commit(mv, true)
    }

    /// Apply a move for whichever side is to move, without consulting the
    /// oracle afterwards. Lets the page play the oracle's side by hand when
    /// the service is down.
    pub fn apply(&mut self, mv: Move) -> ChessResult<String> {
        self.ensure_idle()?;
        self.commit(mv, false)
    }

    /// Enter `AwaitingOracleReply` for the oracle's side and return the
    /// notation to send. Used for the first move when the human plays Black
    /// and to retry after a failed request.
    pub fn request_reply(&mut self) -> ChessResult<String> {
        match self.phase {
            Phase::GameOver { .. } => return Err(ChessError::GameOver),
            Phase::AwaitingOracleReply => return Ok(self.current_notation()),
            _ => {}
        }
        if self.position.side_to_move() == self.config.human {
            return Err(ChessError::OutOfTurn);
        }
        self.phase = Phase::AwaitingOracleReply;
        Ok(self.current_notation())
    }

    /// Settle the outstanding oracle request. A failure, an empty answer or
    /// an unusable move leaves the position as it was and returns an
    /// `OracleUnavailable` error; the session stays playable.
    pub fn receive_reply(&mut self, reply: ChessResult<Option<String>>) -> ChessResult<Move> {
        if self.phase != Phase::AwaitingOracleReply {
            return Err(ChessError::NoReplyPending);
        }
        self.phase = Phase::AwaitingSelection;

        let text = match reply {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn!("oracle had no move for {}", self.current_notation());
                return Err(ChessError::oracle("no move available"));
            }
            Err(e @ ChessError::OracleUnavailable { .. }) => {
                warn!("{e}");
                return Err(e);
            }
            Err(e) => {
                warn!("oracle failed: {e}");
                return Err(ChessError::oracle(e.to_string()));
            }
        };

        let mv = Move::from_uci(&text)
            .map_err(|_| ChessError::oracle(format!("unreadable move '{text}'")))?;
        let next = match execute::apply(&self.position, mv) {
            Ok(next) => next,
            Err(e @ ChessError::InternalInvariantViolation { .. }) => return Err(e),
            Err(e) => {
                warn!("oracle suggested {text}, rejected: {e}");
                return Err(ChessError::oracle(format!("suggested move {text} is not legal")));
            }
        };
        self.install(next)?;
        Ok(mv)
    }

    /// Synchronous round trip with `oracle`, for native front ends.
    pub fn consult(&mut self, oracle: &dyn Oracle) -> ChessResult<Move> {
        let notation = self.request_reply()?;
        let reply = oracle.suggest(&notation);
        self.receive_reply(reply)
    }

    fn ensure_idle(&self) -> ChessResult<()> {
        match self.phase {
            Phase::AwaitingOracleReply => Err(ChessError::ReplyPending),
            Phase::GameOver { .. } => Err(ChessError::GameOver),
            _ => Ok(()),
        }
    }

    /// Attach the configured promotion piece when a human pawn reaches the
    /// last rank.
    fn human_move(&self, from: Square, to: Square) -> Move {
        let promotes = self
            .position
            .board()
            .piece_at(from)
            .map(|p| p.piece_type == PieceType::Pawn && to.row() == p.color.promotion_row())
            .unwrap_or(false);
        if promotes {
            Move::with_promotion(from, to, self.config.default_promotion)
        } else {
            Move::new(from, to)
        }
    }

    /// Apply, install, and hand over to the oracle when `await_reply` is set
    /// and it is now the oracle's turn.
    fn commit(&mut self, mv: Move, await_reply: bool) -> ChessResult<String> {
        let next = execute::apply(&self.position, mv)?;
        self.install(next)?;
        if await_reply
            && self.phase == Phase::AwaitingSelection
            && self.position.side_to_move() != self.config.human
        {
            self.phase = Phase::AwaitingOracleReply;
        }
        Ok(self.current_notation())
    }

    /// Make `next` the current position. If it cannot be classified the
    /// session keeps the position it had.
    fn install(&mut self, next: Position) -> ChessResult<()> {
        self.history.push(next.position_hash());
        let s = match status_with_history(&next, &self.history) {
            Ok(s) => s,
            Err(e) => {
                self.history.pop();
                error!("{e}");
                return Err(e);
            }
        };
        self.position = next;
        self.phase = if s.is_over() {
            info!("game over: {}", s.describe());
            Phase::GameOver { status: s }
        } else {
            Phase::AwaitingSelection
        };
        Ok(())
    }
}
