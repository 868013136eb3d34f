//! Errors raised by the position and search layers.
//!
//! Every variant marks a violated precondition. None of them are retried.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SearchError {
    #[error("cell {cell} is out of range (must be 0-8)")]
    CellOutOfRange { cell: usize },

    #[error("cell {cell} is already occupied")]
    CellOccupied { cell: usize },

    #[error("agent mask {agent:#011b} and opponent mask {opponent:#011b} overlap or exceed the board")]
    OverlappingMasks { agent: u16, opponent: u16 },

    #[error("game is already over")]
    GameOver,

    #[error("board string must have 9 cells, got {got} in '{context}'")]
    InvalidBoardLength { got: usize, context: String },

    #[error("invalid character '{character}' at cell {cell} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        cell: usize,
        context: String,
    },

    #[error("node {node} has no pending successors to expand")]
    NothingToExpand { node: usize },

    #[error("node {node} still has {pending} pending successors")]
    NotFullyExpanded { node: usize, pending: usize },

    #[error("node {node} has no children")]
    NoChildren { node: usize },

    #[error("node {node} has never been visited")]
    UnvisitedNode { node: usize },

    #[error("child {child} of node {node} has never been visited")]
    UnvisitedChild { node: usize, child: usize },

    #[error("root position is already terminal, there is no move to choose")]
    RootAlreadyTerminal,
}

pub type Result<T> = std::result::Result<T, SearchError>;
