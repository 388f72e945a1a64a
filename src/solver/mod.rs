mod agent;
mod closure;
mod constraint;
mod knowledge;
mod probability;
mod selector;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use agent::Agent;
pub use closure::{certainties, ClosureReport};
pub use constraint::Constraint;
pub use knowledge::KnowledgeBase;
pub use probability::{estimate, Estimate};
pub use selector::{
    CalculatedMove, MoveKind, MovePolicy, MoveSelector, RandomMove, SafeMove, SolverMove,
};
