use std::fmt;

/// Side to move. Outcomes are always scored from the agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Agent,
    Opponent,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::Agent => Player::Opponent,
            Player::Opponent => Player::Agent,
        }
    }

    /// +1 for the agent, -1 for the opponent.
    pub fn sign(self) -> i64 {
        match self {
            Player::Agent => 1,
            Player::Opponent => -1,
        }
    }
}

/// An immutable game state the search can walk.
pub trait Game: Clone + fmt::Display {
    type Move: fmt::Debug + PartialEq + Eq + Copy;

    /// Every legal successor, in a fixed order. Empty for terminal states.
    fn successors(&self) -> Vec<Self>;

    fn next_to_move(&self) -> Player;

    fn is_terminal(&self) -> bool;

    /// +1 agent win, -1 opponent win, 0 draw or still in play.
    fn outcome(&self) -> i32;

    /// The move that produced this state, `None` for a starting position.
    fn last_move(&self) -> Option<Self::Move>;
}
