//! Monte Carlo Tree Search for picking the next tic-tac-toe move.
//!
//! ```
//! use ttt_mcts::{Mcts, Position, SearchConfig};
//!
//! let position: Position = "XX. OO. ...".parse().unwrap();
//! let mut mcts = Mcts::new(position, SearchConfig::default().with_seed(111));
//! let decision = mcts.run_iterations(5_000).unwrap();
//! assert_eq!(decision.best_move, 2);
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod mcts;
pub mod tic_tac_toe;

pub use config::{Perspective, SearchConfig};
pub use error::SearchError;
pub use game::{Game, Player};
pub use mcts::{Budget, ChildStats, Decision, Mcts, NodeId, Tree};
pub use tic_tac_toe::Position;
