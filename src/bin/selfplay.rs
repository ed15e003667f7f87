use anyhow::Result;
use clap::Parser;
use oracle_chess::execute::apply;
use oracle_chess::oracle::{Oracle, RandomOracle};
use oracle_chess::status::{status_with_history, GameStatus};
use oracle_chess::{Move, Position};

/// Random legal moves for both sides until the game ends or the move limit
/// is reached. Useful for smoke-testing the rules engine.
#[derive(Parser, Debug)]
#[command(name = "selfplay")]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value_t = 1)]
    games: u32,

    /// Stop a game after this many half-moves
    #[arg(short, long, default_value_t = 300)]
    max_plies: u32,

    /// Print the final position of every game
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let oracle = RandomOracle;
    for game in 1..=args.games {
        let mut position = Position::initial();
        let mut plies = 0;
        let mut history = vec![position.position_hash()];
        let mut outcome = status_with_history(&position, &history)?;

        while !outcome.is_over() && plies < args.max_plies {
            let Some(reply) = oracle.suggest(&position.to_notation())? else {
                break;
            };
            position = apply(&position, Move::from_uci(&reply)?)?;
            plies += 1;
            history.push(position.position_hash());
            outcome = status_with_history(&position, &history)?;
        }

        let result = match outcome {
            GameStatus::Ongoing => "move limit",
            other => other.describe(),
        };
        eprintln!("Game {game} over after {plies} plies: {result}");
        if args.verbose {
            println!("{}", position.to_notation());
            print!("{}", position.board().diagram());
        }
    }
    Ok(())
}
