use super::knowledge::KnowledgeBase;
use crate::Position;
use std::collections::HashMap;
use std::fmt;

/// Per-cell mine likelihood derived from the live constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// No live constraint mentions the cell.
    Unknown,
    /// Smallest `count / |cells|` over the constraints that mention the cell.
    Bound(f64),
}

impl Estimate {
    pub fn value(&self) -> Option<f64> {
        match self {
            Estimate::Unknown => None,
            Estimate::Bound(p) => Some(*p),
        }
    }

    fn tighten(self, local: f64) -> Self {
        match self {
            Estimate::Unknown => Estimate::Bound(local),
            Estimate::Bound(p) => Estimate::Bound(p.min(local)),
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::Unknown => write!(f, "?"),
            Estimate::Bound(p) => write!(f, "{p:.3}"),
        }
    }
}

/// Recomputes estimates for every cell that is not yet confirmed.
///
/// Each constraint is taken on its own; dependencies between overlapping
/// constraints are ignored, so this is a cheap heuristic rather than a true
/// marginal probability.
pub fn estimate(kb: &KnowledgeBase) -> HashMap<Position, Estimate> {
    let mines = kb.confirmed_mines();
    let safe = kb.confirmed_safe();

    let mut estimates: HashMap<Position, Estimate> = kb
        .dimensions()
        .positions()
        .filter(|p| !mines.contains(p) && !safe.contains(p))
        .map(|p| (p, Estimate::Unknown))
        .collect();

    for constraint in kb.constraints().iter().filter(|c| !c.is_empty()) {
        let local = constraint.count() as f64 / constraint.len() as f64;
        for pos in constraint.cells() {
            if let Some(estimate) = estimates.get_mut(pos) {
                *estimate = estimate.tighten(local);
            }
        }
    }

    estimates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Constraint;
    use crate::Dimensions;

    #[test]
    fn test_unconstrained_cells_are_unknown() {
        let kb = KnowledgeBase::new(Dimensions::new(2, 3));
        let estimates = estimate(&kb);
        assert_eq!(estimates.len(), 6);
        assert!(estimates.values().all(|e| *e == Estimate::Unknown));
    }

    #[test]
    fn test_confirmed_cells_have_no_entry() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 5));
        kb.ingest(Position::new(0, 0), 1).unwrap();

        let estimates = estimate(&kb);
        assert!(!estimates.contains_key(&Position::new(0, 0)));
        assert!(!estimates.contains_key(&Position::new(0, 1)));
        assert_eq!(estimates[&Position::new(0, 2)], Estimate::Unknown);
    }

    #[test]
    fn test_minimum_across_constraints() {
        let mut kb = KnowledgeBase::new(Dimensions::new(1, 6));
        kb.assert_constraint(
            Constraint::new([Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)], 2)
                .unwrap(),
        )
        .unwrap();
        kb.assert_constraint(
            Constraint::new([Position::new(0, 2), Position::new(0, 3), Position::new(0, 4)], 1)
                .unwrap(),
        )
        .unwrap();

        let estimates = estimate(&kb);
        assert_eq!(estimates[&Position::new(0, 0)].value(), Some(2.0 / 3.0));
        assert_eq!(estimates[&Position::new(0, 2)].value(), Some(1.0 / 3.0));
        assert_eq!(estimates[&Position::new(0, 4)].value(), Some(1.0 / 3.0));
        assert_eq!(estimates[&Position::new(0, 5)].value(), None);
    }

    #[test]
    fn test_display_marks_unknown() {
        assert_eq!(Estimate::Unknown.to_string(), "?");
        assert_eq!(Estimate::Bound(0.25).to_string(), "0.250");
        assert_eq!(Estimate::Bound(1.0 / 3.0).to_string(), "0.333");
    }
}
