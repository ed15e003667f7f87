// =============================================================================
// Move oracle
//
// The opponent's moves come from an outside service. It is handed the
// current position notation and answers with a coordinate move string
// ("e7e5", "e7e8q") or nothing. The controller never talks to the network
// itself; it only sees this trait or, in the browser, the reply string the
// page fetched.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ChessError, ChessResult};
use crate::movegen::all_legal_moves;
use crate::position::Position;

/// A source of replies for the side the human is not playing.
pub trait Oracle {
    /// Suggest a move for the side to move in `notation`. `Ok(None)` means the
    /// service had nothing to offer.
    fn suggest(&self, notation: &str) -> ChessResult<Option<String>>;
}

/// JSON body POSTed to the service.
#[derive(Serialize, Debug)]
pub struct OracleRequest<'a> {
    pub fen: &'a str,
}

/// The part of the service's answer the board uses.
#[derive(Deserialize, Debug)]
pub struct OracleResponse {
    #[serde(rename = "move", default)]
    pub mv: Option<String>,
}

pub fn request_body(notation: &str) -> ChessResult<String> {
    serde_json::to_string(&OracleRequest { fen: notation })
        .map_err(|e| ChessError::oracle(format!("cannot encode request: {e}")))
}

/// Read the service's JSON answer. A missing or null `move` is "no move".
pub fn parse_response(body: &str) -> ChessResult<Option<String>> {
    let response: OracleResponse = serde_json::from_str(body)
        .map_err(|e| ChessError::oracle(format!("malformed reply: {e}")))?;
    Ok(response.mv)
}

/// Platform-appropriate random number in [0, 1).
/// Uses js_sys::Math::random() in WASM builds, rand crate natively.
fn random_f64() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Math::random()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use rand::Rng;
        rand::thread_rng().gen::<f64>()
    }
}

/// Offline stand-in: plays a uniformly random legal move.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomOracle;

impl Oracle for RandomOracle {
    fn suggest(&self, notation: &str) -> ChessResult<Option<String>> {
        let position = Position::from_notation(notation)?;
        let moves = all_legal_moves(&position, position.side_to_move())?;
        if moves.is_empty() {
            return Ok(None);
        }
        let index = ((random_f64() * moves.len() as f64) as usize).min(moves.len() - 1);
        Ok(Some(moves[index].to_uci()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpOracle;

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use std::time::Duration;

    use log::{debug, warn};

    use super::*;
    use crate::config::OracleConfig;

    /// Blocking HTTP client for the move-suggestion service.
    pub struct HttpOracle {
        client: reqwest::blocking::Client,
        endpoint: String,
    }

    impl HttpOracle {
        pub fn new(config: &OracleConfig) -> ChessResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|e| ChessError::oracle(format!("cannot build HTTP client: {e}")))?;
            Ok(HttpOracle {
                client,
                endpoint: config.endpoint.clone(),
            })
        }
    }

    impl Oracle for HttpOracle {
        fn suggest(&self, notation: &str) -> ChessResult<Option<String>> {
            debug!("asking {} for a move: {notation}", self.endpoint);
            let response = self
                .client
                .post(&self.endpoint)
                .json(&OracleRequest { fen: notation })
                .send()
                .map_err(|e| {
                    warn!("oracle request failed: {e}");
                    ChessError::oracle(e.to_string())
                })?;

            let status = response.status();
            if !status.is_success() {
                warn!("oracle answered HTTP {status}");
                return Err(ChessError::oracle(format!("HTTP {status}")));
            }

            let body = response
                .text()
                .map_err(|e| ChessError::oracle(format!("cannot read reply: {e}")))?;
            parse_response(&body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::position::START_NOTATION;

    #[test]
    fn request_body_carries_the_notation() {
        let body = request_body(START_NOTATION).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["fen"], START_NOTATION);
    }

    #[test]
    fn response_move_may_be_absent() {
        assert_eq!(
            parse_response(r#"{"move": "e7e5", "fen": "x", "depth": 12}"#),
            Ok(Some("e7e5".to_string()))
        );
        assert_eq!(parse_response(r#"{"move": null}"#), Ok(None));
        assert_eq!(parse_response(r#"{"error": "busy"}"#), Ok(None));
        assert!(matches!(parse_response("<html>"), Err(ChessError::OracleUnavailable { .. })));
    }

    #[test]
    fn random_oracle_only_suggests_legal_moves() {
        let oracle = RandomOracle;
        let start = Position::initial();
        let legal = all_legal_moves(&start, start.side_to_move()).unwrap();
        for _ in 0..20 {
            let reply = oracle.suggest(START_NOTATION).unwrap().unwrap();
            let mv = Move::from_uci(&reply).unwrap();
            assert!(legal.contains(&mv), "{reply}");
        }
    }

    #[test]
    fn random_oracle_has_nothing_in_checkmate() {
        let mated = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        assert_eq!(RandomOracle.suggest(mated), Ok(None));
    }
}
