//! Subset resolution over a knowledge base.
//!
//! Whenever one live constraint's cells are a strict subset of another's, the
//! difference is itself a constraint: `B − A` holds exactly `B.count − A.count`
//! mines. Closure keeps deriving these and extracting certainties until a full
//! pass changes nothing.
//!
//! Rather than rechecking every pair on every pass, a worklist holds the
//! indices of constraints that are new or have shrunk since they were last
//! compared. A pair of untouched constraints was already compared when the
//! later of the two entered the list, so draining the worklist is enough.

use super::constraint::Constraint;
use super::knowledge::KnowledgeBase;
use crate::error::Contradiction;
use crate::Position;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// What one closure run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClosureReport {
    pub passes: usize,
    pub derived: usize,
    pub mines_marked: usize,
    pub safes_marked: usize,
}

impl ClosureReport {
    pub fn merge(&mut self, other: ClosureReport) {
        self.passes += other.passes;
        self.derived += other.derived;
        self.mines_marked += other.mines_marked;
        self.safes_marked += other.safes_marked;
    }

    pub fn made_progress(&self) -> bool {
        self.derived + self.mines_marked + self.safes_marked > 0
    }
}

#[derive(Debug, Default)]
struct Worklist {
    queue: VecDeque<usize>,
    queued: HashSet<usize>,
}

impl Worklist {
    fn push(&mut self, index: usize) {
        if self.queued.insert(index) {
            self.queue.push_back(index);
        }
    }

    fn pop(&mut self) -> Option<usize> {
        let index = self.queue.pop_front()?;
        self.queued.remove(&index);
        Some(index)
    }
}

impl Extend<usize> for Worklist {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.push(index);
        }
    }
}

/// Runs closure to a fixed point, starting from the constraints at `pending`.
pub fn resolve(
    kb: &mut KnowledgeBase,
    pending: impl IntoIterator<Item = usize>,
) -> Result<ClosureReport, Contradiction> {
    let mut report = ClosureReport::default();
    let mut worklist = Worklist::default();
    worklist.extend(pending);

    loop {
        report.passes += 1;

        while let Some(index) = worklist.pop() {
            for constraint in derive(kb.constraints(), index)? {
                if !kb.constraints().contains(&constraint) {
                    worklist.push(kb.push_constraint(constraint));
                    report.derived += 1;
                }
            }
        }

        let touched = mark_certainties(kb, &mut report)?;
        if touched.is_empty() {
            return Ok(report);
        }
        worklist.extend(touched);
    }
}

/// Marks every cell some constraint pins down. Returns the indices of the
/// constraints that shrank as a result.
pub fn sweep(kb: &mut KnowledgeBase) -> Result<Vec<usize>, Contradiction> {
    mark_certainties(kb, &mut ClosureReport::default())
}

fn derive(constraints: &[Constraint], index: usize) -> Result<Vec<Constraint>, Contradiction> {
    let pivot = &constraints[index];
    if pivot.is_empty() {
        return Ok(Vec::new());
    }

    let mut derived = Vec::new();
    for (other_index, other) in constraints.iter().enumerate() {
        if other_index == index || other.is_empty() {
            continue;
        }
        if other.cells() == pivot.cells() {
            if other.count() != pivot.count() {
                return Err(Contradiction::ConflictingCounts {
                    cells: pivot.cells().iter().copied().collect(),
                    first: other.count(),
                    second: pivot.count(),
                });
            }
            continue;
        }
        if let Some(result) = other.subtract(pivot).or_else(|| pivot.subtract(other)) {
            derived.push(result?);
        }
    }
    Ok(derived)
}

fn mark_certainties(
    kb: &mut KnowledgeBase,
    report: &mut ClosureReport,
) -> Result<Vec<usize>, Contradiction> {
    let (mines, safe) = certainties(kb.constraints());
    if let Some(&pos) = mines.intersection(&safe).next() {
        return Err(Contradiction::ConflictingMark(pos));
    }

    let mut touched = BTreeSet::new();
    for pos in mines {
        touched.extend(kb.mark_mine(pos)?);
        report.mines_marked += 1;
    }
    for pos in safe {
        touched.extend(kb.mark_safe(pos)?);
        report.safes_marked += 1;
    }
    Ok(touched.into_iter().collect())
}

/// Union of known mines and known safe cells across all constraints.
pub fn certainties(constraints: &[Constraint]) -> (BTreeSet<Position>, BTreeSet<Position>) {
    let mut mines = BTreeSet::new();
    let mut safe = BTreeSet::new();
    for constraint in constraints {
        mines.extend(constraint.known_mines());
        safe.extend(constraint.known_safe());
    }
    (mines, safe)
}
