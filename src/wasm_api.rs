use crate::config::GameConfig;
use crate::error::ChessError;
use crate::game::{GameController, Phase, Selection};
use crate::moves::Move;
use crate::oracle::{parse_response, request_body};
use crate::piece::{Color, PieceType};
use crate::square::Square;
use crate::status::GameStatus;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct BoardState {
    /// Rank 8 first, file a first within each rank; index = row * 8 + col.
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    phase: Phase,
    status: Option<GameStatus>,
    result: Option<String>,
    is_in_check: bool,
    selected: Option<usize>,
    highlights: Vec<usize>,
    notation: String,
}

#[derive(Serialize)]
struct ActionResult {
    #[serde(flatten)]
    board_state: BoardState,
    last_move: Option<String>,
    error: Option<String>,
    recoverable: bool,
}

fn piece_type_to_string(pt: PieceType) -> String {
    match pt {
        PieceType::King => "King".to_string(),
        PieceType::Queen => "Queen".to_string(),
        PieceType::Rook => "Rook".to_string(),
        PieceType::Bishop => "Bishop".to_string(),
        PieceType::Knight => "Knight".to_string(),
        PieceType::Pawn => "Pawn".to_string(),
    }
}

fn color_to_string(c: Color) -> String {
    match c {
        Color::White => "White".to_string(),
        Color::Black => "Black".to_string(),
    }
}

fn string_to_color(s: &str) -> Option<Color> {
    match s {
        "White" | "white" | "w" => Some(Color::White),
        "Black" | "black" | "b" => Some(Color::Black),
        _ => None,
    }
}

fn build_board_state(game: &GameController) -> BoardState {
    let position = game.position();
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..8)
        .map(|r| {
            (0..8)
                .map(|c| {
                    Square::from_row_col(r, c)
                        .and_then(|sq| position.board().piece_at(sq))
                        .map(|p| SquarePiece {
                            piece_type: piece_type_to_string(p.piece_type),
                            color: color_to_string(p.color),
                        })
                })
                .collect()
        })
        .collect();

    let (selected, highlights) = match game.phase() {
        Phase::AwaitingDestination { from, targets } => (
            Some(from.index()),
            targets.iter().map(|sq| sq.index()).collect(),
        ),
        _ => (None, Vec::new()),
    };

    let status = game.status().ok();
    BoardState {
        squares,
        current_turn: color_to_string(position.side_to_move()),
        phase: game.phase().clone(),
        status,
        result: status.filter(|s| s.is_over()).map(|s| s.describe().to_string()),
        is_in_check: game.is_in_check(position.side_to_move()).unwrap_or(false),
        selected,
        highlights,
        notation: game.current_notation(),
    }
}

fn to_js(game: &GameController, last_move: Option<Move>, error: Option<ChessError>) -> JsValue {
    if let Some(e) = &error {
        if !e.is_recoverable() {
            log::error!("{e}");
        }
    }
    let result = ActionResult {
        board_state: build_board_state(game),
        last_move: last_move.map(|m| m.to_uci()),
        recoverable: error.as_ref().map(ChessError::is_recoverable).unwrap_or(true),
        error: error.map(|e| e.to_string()),
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen(start)]
pub fn start() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("board engine built {}", crate::BUILD_TIMESTAMP);
}

#[wasm_bindgen]
pub fn build_timestamp() -> String {
    crate::BUILD_TIMESTAMP.to_string()
}

#[wasm_bindgen]
pub struct Game {
    controller: GameController,
}

#[wasm_bindgen]
impl Game {
    /// `config` may be `undefined` or a partial `GameConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Game {
        let config = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).unwrap_or_else(|e| {
                log::warn!("ignoring invalid config: {e}");
                GameConfig::default()
            })
        };
        Game {
            controller: GameController::new(config),
        }
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&self.controller, None, None)
    }

    /// Board click. When the result's phase is `AwaitingOracleReply` the page
    /// should fetch a reply for `notation`.
    pub fn select_square(&mut self, index: usize) -> JsValue {
        match self.controller.select_square(index) {
            Ok(Selection::Moved { mv, .. }) => to_js(&self.controller, Some(mv), None),
            Ok(_) => to_js(&self.controller, None, None),
            Err(e) => to_js(&self.controller, None, Some(e)),
        }
    }

    pub fn legal_moves(&self, index: usize) -> JsValue {
        let targets: Vec<usize> = Square::new(index)
            .and_then(|sq| self.controller.legal_moves(sq).ok())
            .unwrap_or_default()
            .into_iter()
            .map(|sq| sq.index())
            .collect();
        serde_wasm_bindgen::to_value(&targets).unwrap_or(JsValue::NULL)
    }

    /// Apply a coordinate move (`e2e4`, `e7e8q`) for the side to move.
    pub fn apply_move(&mut self, uci: &str) -> JsValue {
        let outcome = Move::from_uci(uci).and_then(|mv| self.controller.apply(mv).map(|_| mv));
        match outcome {
            Ok(mv) => to_js(&self.controller, Some(mv), None),
            Err(e) => to_js(&self.controller, None, Some(e)),
        }
    }

    pub fn current_notation(&self) -> String {
        self.controller.current_notation()
    }

    pub fn is_in_check(&self, color: &str) -> bool {
        string_to_color(color)
            .and_then(|c| self.controller.is_in_check(c).ok())
            .unwrap_or(false)
    }

    pub fn oracle_endpoint(&self) -> String {
        self.controller.config().oracle.endpoint.clone()
    }

    /// JSON body for the oracle request, or `null` if no reply is due.
    /// Marks the reply as outstanding, so it also serves to ask for the
    /// oracle's opening move when the human plays Black.
    pub fn oracle_request_body(&mut self) -> JsValue {
        match self.controller.request_reply().and_then(|fen| request_body(&fen)) {
            Ok(body) => JsValue::from_str(&body),
            Err(_) => JsValue::NULL,
        }
    }

    /// Hand over the raw JSON answer of the oracle service.
    pub fn receive_oracle_reply(&mut self, body: &str) -> JsValue {
        match self.controller.receive_reply(parse_response(body)) {
            Ok(mv) => to_js(&self.controller, Some(mv), None),
            Err(e) => to_js(&self.controller, None, Some(e)),
        }
    }

    /// The request never produced an answer (network error, timeout).
    pub fn oracle_failed(&mut self, reason: &str) -> JsValue {
        let err = self
            .controller
            .receive_reply(Err(ChessError::oracle(reason)))
            .err();
        to_js(&self.controller, None, err)
    }
}

/// POST `{fen}` to the oracle and resolve with the response body text.
/// Rejects on network errors and non-2xx statuses.
#[wasm_bindgen]
pub async fn request_oracle_move(endpoint: String, fen: String) -> Result<JsValue, JsValue> {
    let body = request_body(&fen).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&body));
    let request = Request::new_with_str_and_init(&endpoint, &init)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        log::warn!("oracle answered HTTP {}", response.status());
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    JsFuture::from(response.text()?).await
}
