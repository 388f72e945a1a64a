use crate::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position {0} is out of bounds")]
    OutOfBounds(Position),
    #[error("Cannot reveal or flag cell in current game state")]
    InvalidGameState,
    #[error("Cell at {0} is already revealed")]
    AlreadyRevealed(Position),
    #[error("Too many mines ({mines}) for board size {height}x{width}")]
    TooManyMines { height: u32, width: u32, mines: u32 },
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
}

/// Evidence that cannot be reconciled with what is already known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Contradiction {
    #[error("mine count over {cells:?} would drop below zero")]
    NegativeCount { cells: Vec<Position> },
    #[error("{count} mines cannot fit in {cells:?}")]
    CountExceedsCells { count: usize, cells: Vec<Position> },
    #[error("cell {0} is derived as both mine and safe")]
    ConflictingMark(Position),
    #[error("{cells:?} is claimed to hold both {first} and {second} mines")]
    ConflictingCounts {
        cells: Vec<Position>,
        first: usize,
        second: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Position {0} is out of bounds")]
    OutOfBounds(Position),
    #[error("Cell at {0} is already confirmed as a mine")]
    KnownMine(Position),
    #[error("Contradiction: {0}")]
    Contradiction(#[from] Contradiction),
    #[error("Knowledge base is inconsistent after an earlier contradiction")]
    Poisoned,
}

impl InferenceError {
    /// True for failures that leave the knowledge base unusable.
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction(_) | Self::Poisoned)
    }
}

/// A broken knowledge-base invariant, reported by `check_invariants`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{0} is both mine and safe")]
    MineAndSafe(Position),
    #[error("vacuous constraint is still live")]
    Vacuous,
    #[error("{count} mines cannot fit in {cells:?}")]
    Overfull { count: usize, cells: Vec<Position> },
    #[error("constraint over {cells:?} still mentions confirmed cell {pos}")]
    MentionsConfirmed { cells: Vec<Position>, pos: Position },
    #[error("constraint over {cells:?} with {count} mines appears twice")]
    Duplicate { cells: Vec<Position>, count: usize },
    #[error("{cells:?} is claimed to hold both {first} and {second} mines")]
    ConflictingCounts {
        cells: Vec<Position>,
        first: usize,
        second: usize,
    },
    #[error("confirmed cell {0} still has an estimate")]
    StaleEstimate(Position),
}

/// Failures while an agent drives a game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
