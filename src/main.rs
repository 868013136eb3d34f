use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use ttt_mcts::{Game, Mcts, Position, SearchConfig};

/// Pick the next tic-tac-toe move with Monte Carlo Tree Search.
#[derive(Parser, Debug)]
#[command(name = "ttt-mcts")]
#[command(version, about, long_about = None)]
struct Args {
    /// Wall-clock search budget in milliseconds
    #[arg(default_value_t = 500)]
    budget_ms: u64,

    /// Seed for the rollout RNG (random when omitted)
    seed: Option<u64>,

    /// Board as nine cells: X agent, O opponent, '.' empty (default: empty board)
    board: Option<Position>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = SearchConfig::default();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let position = args.board.unwrap_or_default();

    println!("{}", position);
    let mut mcts = Mcts::new(position, config);
    let decision = mcts.run(Duration::from_millis(args.budget_ms))?;
    println!("Iterations: {}", decision.iterations);
    println!("MOVE: {}", decision.best_move);

    for stats in decision.children.iter() {
        println!("Score {} Visits {}", stats.score, stats.visits);
        println!("Win ratio {:.3}", stats.win_ratio());
        let child = position.apply_move(stats.mv)?;
        println!("{}", child);
    }
    if position.apply_move(decision.best_move)?.is_terminal() {
        println!("Game over after this move.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["ttt-mcts"]).unwrap();
        assert_eq!(args.budget_ms, 500);
        assert_eq!(args.seed, None);
        assert!(args.board.is_none());
    }

    #[test]
    fn test_all_arguments() {
        let args = Args::try_parse_from(["ttt-mcts", "50", "7", "XX.OO...."]).unwrap();
        assert_eq!(args.budget_ms, 50);
        assert_eq!(args.seed, Some(7));
        let board = args.board.unwrap();
        assert_eq!(board.agent_mask(), 0b11);
        assert_eq!(board.opponent_mask(), 0b11000);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Args::try_parse_from(["ttt-mcts", "soon"]).is_err());
        assert!(Args::try_parse_from(["ttt-mcts", "50", "7", "XXZ......"]).is_err());
        assert!(Args::try_parse_from(["ttt-mcts", "50", "7", "XX"]).is_err());
    }
}
