//! Terminal board: you type moves, the oracle answers.
//!
//! Input is either a coordinate move (`e2e4`, `e7e8n`) or a single square
//! (`e2`, then `e4`) which behaves like a click on the browser board.
//! `fen` prints the position, `retry` asks the oracle again after a failure,
//! `quit` leaves.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use oracle_chess::config::GameConfig;
use oracle_chess::game::{Phase, Selection};
use oracle_chess::oracle::{HttpOracle, Oracle, RandomOracle};
use oracle_chess::piece::Color;
use oracle_chess::{ChessError, GameController, Move, Position, Square};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Move-suggestion service to POST positions to
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Answer with random legal moves instead of calling the service
    #[arg(long)]
    offline: bool,

    /// Play Black; the oracle opens
    #[arg(long)]
    black: bool,

    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .target(env_logger::Target::Stderr)
    .init();

    let mut config = GameConfig::new();
    if args.black {
        config.human = Color::Black;
    }
    if let Some(endpoint) = args.endpoint {
        config.oracle.endpoint = endpoint;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.oracle.timeout_ms = timeout_ms;
    }

    let oracle: Box<dyn Oracle> = if args.offline {
        Box::new(RandomOracle)
    } else {
        Box::new(HttpOracle::new(&config.oracle)?)
    };

    let mut game = match args.fen {
        Some(fen) => {
            let position = Position::from_notation(&fen).context("bad --fen")?;
            GameController::from_position(position, config)
        }
        None => GameController::new(config),
    };

    println!("oracle_chess (built {})", oracle_chess::BUILD_TIMESTAMP);
    if !game.is_humans_turn() && !matches!(game.phase(), Phase::GameOver { .. }) {
        oracle_turn(&mut game, oracle.as_ref())?;
    }
    show(&game)?;

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => {}
            "quit" | "exit" => break,
            "fen" => println!("{}", game.current_notation()),
            "retry" => {
                oracle_turn(&mut game, oracle.as_ref())?;
                show(&game)?;
            }
            _ => {
                if human_input(&mut game, input)? {
                    if game.phase() == &Phase::AwaitingOracleReply {
                        oracle_turn(&mut game, oracle.as_ref())?;
                    }
                    show(&game)?;
                }
            }
        }
        if let Phase::GameOver { status } = game.phase() {
            println!("{}", status.describe());
            break;
        }
        prompt()?;
    }
    Ok(())
}

/// Returns true when the position changed.
fn human_input(game: &mut GameController, input: &str) -> Result<bool> {
    if input.len() == 2 {
        let Some(sq) = Square::from_algebraic(input) else {
            println!("not a square: {input}");
            return Ok(false);
        };
        return match game.select_square(sq.index())? {
            Selection::Selected { from, targets } => {
                let list: Vec<String> = targets.iter().map(|sq| sq.to_algebraic()).collect();
                println!("{from}: {}", if list.is_empty() { "-".to_string() } else { list.join(" ") });
                Ok(false)
            }
            Selection::Cleared => {
                println!("selection cleared");
                Ok(false)
            }
            Selection::Moved { mv, .. } => {
                println!("you played {mv}");
                Ok(true)
            }
            Selection::Ignored => Ok(false),
        };
    }

    let mv = match Move::from_uci(input) {
        Ok(mv) => mv,
        Err(e) => {
            println!("{e}");
            return Ok(false);
        }
    };
    // After a failed oracle call the human may move the oracle's side.
    let outcome = if game.is_humans_turn() {
        game.attempt_move(mv)
    } else {
        game.apply(mv)
    };
    match outcome {
        Ok(_) => Ok(true),
        Err(e) if e.is_recoverable() => {
            println!("{e}");
            Ok(false)
        }
        Err(e) => bail!(e),
    }
}

fn oracle_turn(game: &mut GameController, oracle: &dyn Oracle) -> Result<()> {
    match game.consult(oracle) {
        Ok(mv) => println!("oracle played {mv}"),
        Err(ChessError::OutOfTurn) => println!("it is your move"),
        Err(e) if e.is_recoverable() => {
            println!("{e}; type a move for the other side or `retry`");
        }
        Err(e) => bail!(e),
    }
    Ok(())
}

fn show(game: &GameController) -> Result<()> {
    print!("{}", game.position().board().diagram());
    if game.is_in_check(game.position().side_to_move())? {
        println!("check");
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}
