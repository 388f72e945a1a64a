use super::knowledge::KnowledgeBase;
use crate::error::InferenceError;
use crate::Position;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::fmt;

/// How a move was chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveKind {
    /// The cell is proven safe.
    Safe,
    /// Lowest estimated mine probability among constrained cells.
    Calculated { probability: f64 },
    /// Nothing better was known.
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverMove {
    pub position: Position,
    pub kind: MoveKind,
}

impl fmt::Display for SolverMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Safe => write!(f, "AI making safe move."),
            MoveKind::Calculated { probability } => write!(
                f,
                "No known safe moves, AI making calculated move (p = {probability:.3})."
            ),
            MoveKind::Random => write!(f, "No safe or calculated moves, AI making random move."),
        }?;
        write!(f, "\nClicked on {}", self.position)
    }
}

/// One tier of the move policy.
pub trait MovePolicy {
    fn name(&self) -> &str;
    fn propose(&self, kb: &KnowledgeBase, rng: &mut dyn RngCore) -> Option<SolverMove>;
}

/// Lexicographically smallest confirmed safe cell that has not been opened.
#[derive(Debug, Default)]
pub struct SafeMove;

impl MovePolicy for SafeMove {
    fn name(&self) -> &str {
        "Safe Move"
    }

    fn propose(&self, kb: &KnowledgeBase, _rng: &mut dyn RngCore) -> Option<SolverMove> {
        kb.safe_moves().min().map(|position| SolverMove {
            position,
            kind: MoveKind::Safe,
        })
    }
}

/// Uniform pick among the cells with the lowest bound, once the estimates
/// take at least `min_distinct_values` different values.
#[derive(Debug)]
pub struct CalculatedMove {
    pub min_distinct_values: usize,
}

impl Default for CalculatedMove {
    fn default() -> Self {
        Self {
            min_distinct_values: 3,
        }
    }
}

impl MovePolicy for CalculatedMove {
    fn name(&self) -> &str {
        "Calculated Move"
    }

    fn propose(&self, kb: &KnowledgeBase, rng: &mut dyn RngCore) -> Option<SolverMove> {
        let bounds: Vec<(Position, f64)> = kb
            .probability()
            .iter()
            .filter_map(|(pos, estimate)| estimate.value().map(|p| (*pos, p)))
            .sorted_by_key(|(pos, _)| *pos)
            .collect();

        let distinct = bounds
            .iter()
            .map(|(_, p)| *p)
            .sorted_by(f64::total_cmp)
            .dedup()
            .count();
        if distinct < self.min_distinct_values {
            return None;
        }

        let lowest = bounds.iter().map(|(_, p)| *p).min_by(f64::total_cmp)?;
        let candidates: Vec<Position> = bounds
            .iter()
            .filter(|(_, p)| *p == lowest)
            .map(|(pos, _)| *pos)
            .collect();

        candidates.choose(rng).map(|&position| SolverMove {
            position,
            kind: MoveKind::Calculated {
                probability: lowest,
            },
        })
    }
}

/// Uniform pick among every cell that is not yet confirmed.
#[derive(Debug, Default)]
pub struct RandomMove;

impl MovePolicy for RandomMove {
    fn name(&self) -> &str {
        "Random Move"
    }

    fn propose(&self, kb: &KnowledgeBase, rng: &mut dyn RngCore) -> Option<SolverMove> {
        let candidates: Vec<Position> = kb.probability().keys().copied().sorted().collect();
        candidates.choose(rng).map(|&position| SolverMove {
            position,
            kind: MoveKind::Random,
        })
    }
}

/// Asks each policy in turn and returns the first proposal.
pub struct MoveSelector {
    policies: Vec<Box<dyn MovePolicy>>,
}

impl MoveSelector {
    pub fn new(policies: Vec<Box<dyn MovePolicy>>) -> Self {
        Self { policies }
    }

    /// Safe, then calculated, then random.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(SafeMove),
            Box::new(CalculatedMove::default()),
            Box::new(RandomMove),
        ])
    }

    pub fn policy_names(&self) -> Vec<&str> {
        self.policies.iter().map(|p| p.name()).collect()
    }

    /// `Ok(None)` means no cell is left to open.
    pub fn select<R: RngCore>(
        &self,
        kb: &KnowledgeBase,
        rng: &mut R,
    ) -> Result<Option<SolverMove>, InferenceError> {
        if kb.is_poisoned() {
            return Err(InferenceError::Poisoned);
        }

        let rng: &mut dyn RngCore = rng;
        Ok(self
            .policies
            .iter()
            .find_map(|policy| policy.propose(kb, &mut *rng)))
    }
}

impl Default for MoveSelector {
    fn default() -> Self {
        Self::standard()
    }
}
