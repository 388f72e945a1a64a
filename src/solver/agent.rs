use super::closure::ClosureReport;
use super::knowledge::KnowledgeBase;
use super::selector::{MoveSelector, SolverMove};
use crate::error::InferenceError;
use crate::{Dimensions, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A player for one game: knowledge, move policy and a source of randomness.
pub struct Agent<R = StdRng> {
    knowledge: KnowledgeBase,
    selector: MoveSelector,
    rng: R,
    last_report: ClosureReport,
}

impl Agent<StdRng> {
    pub fn with_seed(dimensions: Dimensions, seed: u64) -> Self {
        Self::with_rng(dimensions, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Agent<R> {
    pub fn with_rng(dimensions: Dimensions, rng: R) -> Self {
        Self {
            knowledge: KnowledgeBase::new(dimensions),
            selector: MoveSelector::standard(),
            rng,
            last_report: ClosureReport::default(),
        }
    }

    pub fn ingest(
        &mut self,
        pos: Position,
        mines_nearby: u8,
    ) -> Result<ClosureReport, InferenceError> {
        let report = self.knowledge.ingest(pos, mines_nearby)?;
        self.last_report = report;
        Ok(report)
    }

    pub fn select_move(&mut self) -> Result<Option<SolverMove>, InferenceError> {
        self.selector.select(&self.knowledge, &mut self.rng)
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Closure statistics from the most recent successful ingest.
    pub fn last_report(&self) -> ClosureReport {
        self.last_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::MoveKind;

    #[test]
    fn test_agent_prefers_safe_after_zero() {
        let mut agent = Agent::with_seed(Dimensions::new(3, 3), 5);
        let report = agent.ingest(Position::new(0, 0), 0).unwrap();
        assert_eq!(report.safes_marked, 3);
        assert_eq!(agent.last_report(), report);

        let mv = agent.select_move().unwrap().unwrap();
        assert_eq!(mv.kind, MoveKind::Safe);
        assert_eq!(mv.position, Position::new(0, 1));
    }

    #[test]
    fn test_failed_ingest_keeps_previous_report() {
        let mut agent = Agent::with_seed(Dimensions::new(2, 2), 5);
        let report = agent.ingest(Position::new(0, 0), 0).unwrap();
        assert!(agent.ingest(Position::new(9, 9), 0).is_err());
        assert_eq!(agent.last_report(), report);
    }
}
