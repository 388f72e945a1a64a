use crate::error::Contradiction;
use crate::Position;
use std::collections::BTreeSet;
use std::fmt;

/// Exactly `count` of `cells` are mines.
///
/// Cells are kept sorted so two constraints over the same cells compare and
/// hash equal regardless of how they were built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    cells: BTreeSet<Position>,
    count: usize,
}

impl Constraint {
    pub fn new(
        cells: impl IntoIterator<Item = Position>,
        count: usize,
    ) -> Result<Self, Contradiction> {
        let cells: BTreeSet<Position> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(Contradiction::CountExceedsCells {
                count,
                cells: cells.into_iter().collect(),
            });
        }
        Ok(Self { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Position> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    /// All cells, when every one of them must be a mine.
    pub fn known_mines(&self) -> BTreeSet<Position> {
        if self.count == self.cells.len() && self.count != 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// All cells, when none of them can be a mine.
    pub fn known_safe(&self) -> BTreeSet<Position> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell whose status is settled. Returns whether the cell was present.
    pub fn eliminate(&mut self, pos: Position, was_mine: bool) -> Result<bool, Contradiction> {
        if !self.cells.contains(&pos) {
            return Ok(false);
        }

        let count = if was_mine {
            self.count
                .checked_sub(1)
                .ok_or_else(|| Contradiction::NegativeCount {
                    cells: self.cells.iter().copied().collect(),
                })?
        } else {
            self.count
        };
        if count > self.cells.len() - 1 {
            return Err(Contradiction::CountExceedsCells {
                count,
                cells: self.cells.iter().copied().filter(|p| *p != pos).collect(),
            });
        }

        self.cells.remove(&pos);
        self.count = count;
        Ok(true)
    }

    /// `self − subset` when `subset` is a strict subset of `self`.
    pub fn subtract(&self, subset: &Constraint) -> Option<Result<Constraint, Contradiction>> {
        if subset.len() >= self.len() || !subset.cells.is_subset(&self.cells) {
            return None;
        }

        let cells: Vec<Position> = self.cells.difference(&subset.cells).copied().collect();
        Some(match self.count.checked_sub(subset.count) {
            Some(count) => Constraint::new(cells, count),
            None => Err(Contradiction::NegativeCount { cells }),
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, pos) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pos}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}
