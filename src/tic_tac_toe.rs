use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SearchError};
use crate::game::{Game, Player};

pub const CELLS: usize = 9;

const FULL_BOARD: u16 = 0b111_111_111;

// Cell i lives at bit i; row-major, cell 0 top left.
const WINNING_PATTERNS: [u16; 8] = [
    0b000_000_111,
    0b000_111_000,
    0b111_000_000,
    0b001_001_001,
    0b010_010_010,
    0b100_100_100,
    0b100_010_001,
    0b001_010_100,
];

fn has_line(mask: u16) -> bool {
    WINNING_PATTERNS
        .iter()
        .any(|&pattern| mask & pattern == pattern)
}

/// One board configuration. Never mutated once built; moves produce a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    agent: u16,
    opponent: u16,
    last_move: Option<usize>,
    next: Player,
    remaining: u8,
    terminal: bool,
    outcome: i32,
}

impl Position {
    /// Empty board, agent to move.
    pub fn new() -> Self {
        Self {
            agent: 0,
            opponent: 0,
            last_move: None,
            next: Player::Agent,
            remaining: CELLS as u8,
            terminal: false,
            outcome: 0,
        }
    }

    /// Builds a position from raw occupancy masks, checking both players for a line.
    pub fn from_masks(agent: u16, opponent: u16, next: Player) -> Result<Self> {
        if agent & opponent != 0 || (agent | opponent) & !FULL_BOARD != 0 {
            return Err(SearchError::OverlappingMasks { agent, opponent });
        }
        let mut position = Self {
            agent,
            opponent,
            last_move: None,
            next,
            remaining: (CELLS as u32 - (agent | opponent).count_ones()) as u8,
            terminal: false,
            outcome: 0,
        };
        position.outcome = position.evaluate();
        position.terminal = position.outcome != 0 || position.remaining == 0;
        Ok(position)
    }

    /// Claims `cell` for the player to move and hands back the resulting position.
    pub fn apply_move(&self, cell: usize) -> Result<Self> {
        if cell >= CELLS {
            return Err(SearchError::CellOutOfRange { cell });
        }
        if (self.agent | self.opponent) & (1 << cell) != 0 {
            return Err(SearchError::CellOccupied { cell });
        }
        if self.terminal {
            return Err(SearchError::GameOver);
        }
        Ok(self.place(cell))
    }

    // Caller guarantees `cell` is empty and the game is still running.
    fn place(&self, cell: usize) -> Self {
        let mut next = *self;
        next.last_move = Some(cell);
        next.remaining -= 1;
        let mover_mask = match self.next {
            Player::Agent => {
                next.agent |= 1 << cell;
                next.agent
            }
            Player::Opponent => {
                next.opponent |= 1 << cell;
                next.opponent
            }
        };
        next.next = self.next.other();
        // Only the mover can have just completed a line.
        if has_line(mover_mask) {
            next.outcome = self.next.sign() as i32;
            next.terminal = true;
        } else {
            next.terminal = next.remaining == 0;
        }
        next
    }

    /// Scores the board from scratch: +1 agent line, -1 opponent line, 0 otherwise.
    ///
    /// A completed line wins over a full board.
    pub fn evaluate(&self) -> i32 {
        if has_line(self.agent) {
            1
        } else if has_line(self.opponent) {
            -1
        } else {
            0
        }
    }

    /// One successor per empty cell, ascending by cell index.
    pub fn generate_successors(&self) -> Vec<Self> {
        if self.terminal {
            return Vec::new();
        }
        let mut free = self.empty_cells();
        let mut successors = Vec::with_capacity(self.remaining as usize);
        while free != 0 {
            let cell = free.trailing_zeros() as usize;
            successors.push(self.place(cell));
            free &= free - 1;
        }
        successors
    }

    pub fn empty_cells(&self) -> u16 {
        !(self.agent | self.opponent) & FULL_BOARD
    }

    pub fn agent_mask(&self) -> u16 {
        self.agent
    }

    pub fn opponent_mask(&self) -> u16 {
        self.opponent
    }

    pub fn remaining_cells(&self) -> usize {
        self.remaining as usize
    }

    pub fn occupant(&self, cell: usize) -> Option<Player> {
        if self.agent & (1 << cell) != 0 {
            Some(Player::Agent)
        } else if self.opponent & (1 << cell) != 0 {
            Some(Player::Opponent)
        } else {
            None
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Position {
    type Move = usize;

    fn successors(&self) -> Vec<Self> {
        self.generate_successors()
    }

    fn next_to_move(&self) -> Player {
        self.next
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn outcome(&self) -> i32 {
        self.outcome
    }

    fn last_move(&self) -> Option<usize> {
        self.last_move
    }
}

impl FromStr for Position {
    type Err = SearchError;

    /// Parses nine cells: `X` for the agent, `O` for the opponent, `.` or a digit
    /// for an empty cell. Whitespace is ignored. The agent moves next unless it
    /// already has more marks than the opponent.
    fn from_str(s: &str) -> Result<Self> {
        let cells: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if cells.len() != CELLS {
            return Err(SearchError::InvalidBoardLength {
                got: cells.len(),
                context: s.to_string(),
            });
        }
        let mut agent = 0u16;
        let mut opponent = 0u16;
        for (cell, &character) in cells.iter().enumerate() {
            match character {
                'X' | 'x' => agent |= 1 << cell,
                'O' | 'o' => opponent |= 1 << cell,
                '.' | '-' | '_' | '0'..='8' => {}
                _ => {
                    return Err(SearchError::InvalidCellCharacter {
                        character,
                        cell,
                        context: s.to_string(),
                    })
                }
            }
        }
        let next = if agent.count_ones() > opponent.count_ones() {
            Player::Opponent
        } else {
            Player::Agent
        };
        Self::from_masks(agent, opponent, next)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let cell = row * 3 + col;
                match self.occupant(cell) {
                    Some(Player::Agent) => write!(f, "X ")?,
                    Some(Player::Opponent) => write!(f, "O ")?,
                    None => write!(f, "{} ", cell)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
