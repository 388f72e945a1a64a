pub mod autoplay;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod position;
pub mod solver;

pub use board::Board;
pub use config::GameConfig;
pub use error::{Contradiction, GameError, InferenceError, InvariantViolation, PlayError};
pub use game::{Game, GameState, Reveal};
pub use position::{Dimensions, Position};
pub use solver::{Agent, Constraint, Estimate, KnowledgeBase, MoveKind, SolverMove};
