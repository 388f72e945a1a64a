use super::closure::{self, ClosureReport};
use super::constraint::Constraint;
use super::probability::{self, Estimate};
use crate::error::{Contradiction, InferenceError, InvariantViolation};
use crate::{Dimensions, Position};
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Everything the solver has learned about one game.
///
/// Evidence enters through [`KnowledgeBase::ingest`]; after every call the
/// constraint set is closed under subset resolution and all certainties it
/// implies have been moved into the confirmed sets.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    dimensions: Dimensions,
    constraints: Vec<Constraint>,
    mines: HashSet<Position>,
    safe: HashSet<Position>,
    opened: HashSet<Position>,
    probability: HashMap<Position, Estimate>,
    poisoned: bool,
}

impl KnowledgeBase {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            constraints: Vec::new(),
            mines: HashSet::new(),
            safe: HashSet::new(),
            opened: HashSet::new(),
            probability: dimensions
                .positions()
                .map(|pos| (pos, Estimate::Unknown))
                .collect(),
            poisoned: false,
        }
    }

    /// Records that `pos` was opened and has `mines_nearby` mined neighbors.
    ///
    /// Precondition failures are reported without touching state. A
    /// contradiction poisons the knowledge base: every later call fails with
    /// [`InferenceError::Poisoned`].
    pub fn ingest(
        &mut self,
        pos: Position,
        mines_nearby: u8,
    ) -> Result<ClosureReport, InferenceError> {
        self.check_usable()?;
        if !self.dimensions.contains(pos) {
            return Err(InferenceError::OutOfBounds(pos));
        }
        if self.mines.contains(&pos) {
            return Err(InferenceError::KnownMine(pos));
        }

        self.guard(|kb| kb.absorb(pos, mines_nearby))
    }

    /// Adds an arbitrary constraint, expressed over any cells, and stabilizes.
    pub fn assert_constraint(
        &mut self,
        constraint: Constraint,
    ) -> Result<ClosureReport, InferenceError> {
        self.check_usable()?;
        if let Some(&pos) = constraint.cells().iter().find(|p| !self.dimensions.contains(**p)) {
            return Err(InferenceError::OutOfBounds(pos));
        }

        self.guard(|kb| {
            let constraint = kb.settle(constraint)?;
            let index = kb.push_constraint(constraint);
            kb.stabilize_from(vec![index])
        })
    }

    /// Reruns closure over every live constraint.
    pub fn stabilize(&mut self) -> Result<ClosureReport, InferenceError> {
        self.check_usable()?;
        self.guard(|kb| kb.stabilize_from(0..kb.constraints.len()))
    }

    fn check_usable(&self) -> Result<(), InferenceError> {
        if self.poisoned {
            Err(InferenceError::Poisoned)
        } else {
            Ok(())
        }
    }

    fn guard(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<ClosureReport, Contradiction>,
    ) -> Result<ClosureReport, InferenceError> {
        f(self).map_err(|contradiction| {
            self.poisoned = true;
            InferenceError::from(contradiction)
        })
    }

    fn absorb(&mut self, pos: Position, mines_nearby: u8) -> Result<ClosureReport, Contradiction> {
        self.opened.insert(pos);
        let mut pending = self.mark_safe(pos)?;

        let neighbors: Vec<Position> = self.dimensions.neighbors(pos).collect();
        let count = mines_nearby as usize;
        let constraint = self.settle(Constraint::new(neighbors, count)?)?;
        pending.push(self.push_constraint(constraint));

        self.stabilize_from(pending)
    }

    /// Strips confirmed cells out of a fresh constraint.
    ///
    /// Mines go first so a consistent constraint never passes through an
    /// intermediate state with more mines than cells.
    fn settle(&self, mut constraint: Constraint) -> Result<Constraint, Contradiction> {
        let (mines, safe): (Vec<Position>, Vec<Position>) = constraint
            .cells()
            .iter()
            .copied()
            .filter(|p| self.mines.contains(p) || self.safe.contains(p))
            .partition(|p| self.mines.contains(p));

        for pos in mines {
            constraint.eliminate(pos, true)?;
        }
        for pos in safe {
            constraint.eliminate(pos, false)?;
        }
        Ok(constraint)
    }

    fn stabilize_from(
        &mut self,
        pending: impl IntoIterator<Item = usize>,
    ) -> Result<ClosureReport, Contradiction> {
        let mut report = closure::resolve(self, pending)?;

        loop {
            self.prune();

            let swept = closure::sweep(self)?;
            if swept.is_empty() {
                break;
            }
            report.merge(closure::resolve(self, swept)?);
        }

        self.probability = probability::estimate(self);
        Ok(report)
    }

    /// Drops vacuous constraints and duplicates, keeping first occurrences.
    fn prune(&mut self) {
        self.constraints = std::mem::take(&mut self.constraints)
            .into_iter()
            .filter(|c| !c.is_empty())
            .unique()
            .collect();
    }

    pub(crate) fn push_constraint(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    /// Confirms `pos` as a mine. Returns the indices of constraints that shrank.
    pub(crate) fn mark_mine(&mut self, pos: Position) -> Result<Vec<usize>, Contradiction> {
        if self.safe.contains(&pos) {
            return Err(Contradiction::ConflictingMark(pos));
        }
        if !self.mines.insert(pos) {
            return Ok(Vec::new());
        }
        self.probability.remove(&pos);
        self.eliminate_everywhere(pos, true)
    }

    /// Confirms `pos` as safe. Returns the indices of constraints that shrank.
    pub(crate) fn mark_safe(&mut self, pos: Position) -> Result<Vec<usize>, Contradiction> {
        if self.mines.contains(&pos) {
            return Err(Contradiction::ConflictingMark(pos));
        }
        if !self.safe.insert(pos) {
            return Ok(Vec::new());
        }
        self.probability.remove(&pos);
        self.eliminate_everywhere(pos, false)
    }

    fn eliminate_everywhere(
        &mut self,
        pos: Position,
        was_mine: bool,
    ) -> Result<Vec<usize>, Contradiction> {
        let mut touched = Vec::new();
        for (index, constraint) in self.constraints.iter_mut().enumerate() {
            if constraint.eliminate(pos, was_mine)? {
                touched.push(index);
            }
        }
        Ok(touched)
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn confirmed_mines(&self) -> &HashSet<Position> {
        &self.mines
    }

    pub fn confirmed_safe(&self) -> &HashSet<Position> {
        &self.safe
    }

    pub fn opened(&self) -> &HashSet<Position> {
        &self.opened
    }

    /// Estimates for every cell that is neither confirmed safe nor confirmed mine.
    pub fn probability(&self) -> &HashMap<Position, Estimate> {
        &self.probability
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Confirmed safe cells that have not been opened yet.
    pub fn safe_moves(&self) -> impl Iterator<Item = Position> + '_ {
        self.safe.difference(&self.opened).copied()
    }

    /// Checks the invariants that hold after every stabilization.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(&pos) = self.mines.intersection(&self.safe).next() {
            return Err(InvariantViolation::MineAndSafe(pos));
        }

        let mut seen: HashMap<&BTreeSet<Position>, usize> = HashMap::new();
        for constraint in &self.constraints {
            let cells = || constraint.cells().iter().copied().collect::<Vec<_>>();
            if constraint.is_empty() {
                return Err(InvariantViolation::Vacuous);
            }
            if constraint.count() > constraint.len() {
                return Err(InvariantViolation::Overfull {
                    count: constraint.count(),
                    cells: cells(),
                });
            }
            if let Some(&pos) = constraint
                .cells()
                .iter()
                .find(|p| self.mines.contains(*p) || self.safe.contains(*p))
            {
                return Err(InvariantViolation::MentionsConfirmed { cells: cells(), pos });
            }
            match seen.insert(constraint.cells(), constraint.count()) {
                None => {}
                Some(count) if count == constraint.count() => {
                    return Err(InvariantViolation::Duplicate { cells: cells(), count });
                }
                Some(first) => {
                    return Err(InvariantViolation::ConflictingCounts {
                        cells: cells(),
                        first,
                        second: constraint.count(),
                    });
                }
            }
        }

        if let Some(&pos) = self
            .probability
            .keys()
            .find(|p| self.mines.contains(*p) || self.safe.contains(*p))
        {
            return Err(InvariantViolation::StaleEstimate(pos));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    fn constraint(coords: &[(i32, i32)], count: usize) -> Constraint {
        Constraint::new(coords.iter().map(|&(r, c)| pos(r, c)), count).unwrap()
    }

    #[test]
    fn test_zero_marks_all_neighbors_safe() {
        let mut kb = KnowledgeBase::new(Dimensions::new(3, 3));
        kb.ingest(pos(1, 1), 0).unwrap();

        assert_eq!(kb.confirmed_safe().len(), 9);
        assert!(kb.confirmed_mines().is_empty());
        assert!(kb.constraints().is_empty());
        assert!(kb.probability().is_empty());
        assert_eq!(kb.opened().len(), 1);
        assert_eq!(kb.safe_moves().count(), 8);
        kb.check_invariants().unwrap();
    }

    #[test]
    fn test_full_set_is_all_mines() {
        let mut kb = KnowledgeBase::new(Dimensions::new(2, 2));
        kb.assert_constraint(constraint(&[(0, 0), (0, 1)], 2)).unwrap();

        assert!(kb.confirmed_mines().contains(&pos(0, 0)));
        assert!(kb.confirmed_mines().contains(&pos(0, 1)));
        assert!(kb.constraints().is_empty());
        kb.check_invariants().unwrap();
    }

    #[test]
    fn test_corner_one_with_single_unknown() {
        // 2x2 board: opening three cells leaves the fourth as the mine
        let mut kb = KnowledgeBase::new(Dimensions::new(2, 2));
        kb.ingest(pos(0, 0), 1).unwrap();
        kb.ingest(pos(0, 1), 1).unwrap();
        kb.ingest(pos(1, 0), 1).unwrap();

        assert_eq!(kb.confirmed_mines().len(), 1);
        assert!(kb.confirmed_mines().contains(&pos(1, 1)));
        assert!(kb.probability().is_empty());
        kb.check_invariants().unwrap();
    }

    #[test]
    fn test_new_constraint_excludes_known_cells() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 4));
        kb.assert_constraint(constraint(&[(0, 3)], 1)).unwrap();
        kb.ingest(pos(0, 2), 1).unwrap();

        // (0, 2) sees (0, 1) and the known mine (0, 3): (0, 1) must be safe
        assert!(kb.confirmed_safe().contains(&pos(0, 1)));
        assert!(kb.constraints().is_empty());
        kb.check_invariants().unwrap();
    }

    #[test]
    fn test_estimates_are_minimum_over_constraints() {
        let mut kb = KnowledgeBase::new(Dimensions::new(3, 5));
        kb.assert_constraint(constraint(&[(0, 0), (0, 1)], 1)).unwrap();
        kb.assert_constraint(constraint(&[(0, 1), (0, 2), (0, 3), (0, 4)], 1))
            .unwrap();

        assert_eq!(kb.probability()[&pos(0, 0)], Estimate::Bound(0.5));
        assert_eq!(kb.probability()[&pos(0, 1)], Estimate::Bound(0.25));
        assert_eq!(kb.probability()[&pos(0, 4)], Estimate::Bound(0.25));
        assert_eq!(kb.probability()[&pos(2, 2)], Estimate::Unknown);
    }

    #[test]
    fn test_precondition_errors_leave_state_alone() {
        let mut kb = KnowledgeBase::new(Dimensions::new(2, 2));
        assert_eq!(
            kb.ingest(pos(2, 0), 0),
            Err(InferenceError::OutOfBounds(pos(2, 0)))
        );

        kb.assert_constraint(constraint(&[(0, 0)], 1)).unwrap();
        assert_eq!(
            kb.ingest(pos(0, 0), 1),
            Err(InferenceError::KnownMine(pos(0, 0)))
        );
        assert!(!kb.is_poisoned());
        assert!(kb.opened().is_empty());
        kb.ingest(pos(1, 1), 1).unwrap();
    }

    #[test]
    fn test_negative_count_is_contradiction() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 3));
        kb.assert_constraint(constraint(&[(0, 0)], 1)).unwrap();

        // (0, 1) claims no mined neighbors, but (0, 0) is a known mine
        let err = kb.ingest(pos(0, 1), 0).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Contradiction(Contradiction::NegativeCount { .. })
        ));
        assert!(err.is_contradiction());
        assert!(kb.is_poisoned());
        assert_eq!(kb.ingest(pos(0, 2), 0), Err(InferenceError::Poisoned));
    }

    #[test]
    fn test_count_larger_than_neighborhood_is_contradiction() {
        let mut kb = KnowledgeBase::new(Dimensions::new(2, 2));
        let err = kb.ingest(pos(0, 0), 4).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Contradiction(Contradiction::CountExceedsCells { count: 4, .. })
        ));
    }

    #[test]
    fn test_conflicting_mark_is_contradiction() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 3));
        kb.ingest(pos(0, 0), 0).unwrap();
        let err = kb
            .assert_constraint(constraint(&[(0, 1)], 1))
            .unwrap_err();
        assert!(err.is_contradiction());
    }

    #[test]
    fn test_restated_cells_with_new_count_is_contradiction() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 4));
        kb.assert_constraint(constraint(&[(0, 0), (0, 1), (0, 2)], 1))
            .unwrap();
        let err = kb
            .assert_constraint(constraint(&[(0, 0), (0, 1), (0, 2)], 2))
            .unwrap_err();

        assert!(matches!(
            err,
            InferenceError::Contradiction(Contradiction::ConflictingCounts {
                first: 1,
                second: 2,
                ..
            })
        ));
        assert!(kb.is_poisoned());
    }

    #[test]
    fn test_restating_a_constraint_is_harmless() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 4));
        kb.assert_constraint(constraint(&[(0, 0), (0, 1), (0, 2)], 1))
            .unwrap();
        kb.assert_constraint(constraint(&[(0, 2), (0, 1), (0, 0)], 1))
            .unwrap();

        assert_eq!(kb.constraints().len(), 1);
        kb.check_invariants().unwrap();
    }

    #[test]
    fn test_invariant_check_flags_conflicting_counts() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 4));
        kb.push_constraint(constraint(&[(0, 0), (0, 1)], 1));
        kb.push_constraint(constraint(&[(0, 0), (0, 1)], 2));

        assert_eq!(
            kb.check_invariants(),
            Err(InvariantViolation::ConflictingCounts {
                cells: vec![pos(0, 0), pos(0, 1)],
                first: 1,
                second: 2,
            })
        );
    }

    #[test]
    fn test_stabilize_is_idempotent() {
        let mut kb = KnowledgeBase::new(Dimensions::new(4, 4));
        kb.ingest(pos(0, 0), 1).unwrap();
        kb.ingest(pos(3, 3), 1).unwrap();
        kb.ingest(pos(0, 3), 2).unwrap();

        let before = kb.constraints().to_vec();
        let mines = kb.confirmed_mines().clone();
        let safe = kb.confirmed_safe().clone();

        let report = kb.stabilize().unwrap();
        assert_eq!(report.derived, 0);
        assert_eq!(report.mines_marked + report.safes_marked, 0);
        assert_eq!(kb.constraints(), before.as_slice());
        assert_eq!(kb.confirmed_mines(), &mines);
        assert_eq!(kb.confirmed_safe(), &safe);
    }
}
