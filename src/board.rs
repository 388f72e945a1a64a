use crate::{Dimensions, GameConfig, GameError, Position};
use rand::Rng;
use std::collections::HashSet;
use std::fmt;

/// Ground truth for one game. The solver never reads this directly.
#[derive(Debug, Clone)]
pub struct Board {
    mines: HashSet<Position>,
    dimensions: Dimensions,
}

impl Board {
    pub fn new<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        config.validate()?;

        let dimensions = config.dimensions();
        let mut mines = HashSet::new();
        while mines.len() < config.mines as usize {
            let row = rng.gen_range(0..config.height) as i32;
            let col = rng.gen_range(0..config.width) as i32;
            mines.insert(Position::new(row, col));
        }

        Ok(Self { mines, dimensions })
    }

    /// Builds a board with a fixed mine layout.
    pub fn with_mines(
        dimensions: Dimensions,
        mines: impl IntoIterator<Item = Position>,
    ) -> Result<Self, GameError> {
        let mines: HashSet<Position> = mines.into_iter().collect();
        if let Some(&pos) = mines.iter().find(|p| !dimensions.contains(**p)) {
            return Err(GameError::OutOfBounds(pos));
        }
        GameConfig {
            height: dimensions.height,
            width: dimensions.width,
            mines: mines.len() as u32,
        }
        .validate()?;

        Ok(Self { mines, dimensions })
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        self.dimensions.contains(pos)
    }

    pub fn is_mine(&self, pos: Position) -> bool {
        self.mines.contains(&pos)
    }

    /// In-bounds neighbors of `pos` and how many of them are mined.
    pub fn nearby_mines(&self, pos: Position) -> (Vec<Position>, u8) {
        let neighbors: Vec<Position> = self.dimensions.neighbors(pos).collect();
        let count = neighbors.iter().filter(|p| self.is_mine(**p)).count() as u8;
        (neighbors, count)
    }

    pub fn mines(&self) -> &HashSet<Position> {
        &self.mines
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn mines_count(&self) -> u32 {
        self.mines.len() as u32
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "--".repeat(self.dimensions.width as usize) + "-";
        for row in 0..self.dimensions.height as i32 {
            writeln!(f, "{rule}")?;
            for col in 0..self.dimensions.width as i32 {
                let mark = if self.is_mine(Position::new(row, col)) { "X" } else { " " };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_placement_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::new(GameConfig::preset(16), &mut rng).unwrap();
        assert_eq!(board.mines_count(), 40);
        assert!(board.mines().iter().all(|p| board.is_within_bounds(*p)));
    }

    #[test]
    fn test_too_many_mines() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = Board::new(
            GameConfig {
                height: 2,
                width: 2,
                mines: 4,
            },
            &mut rng,
        );
        assert!(matches!(result, Err(GameError::TooManyMines { .. })));
    }

    #[test]
    fn test_nearby_mines() {
        let board = Board::with_mines(
            Dimensions::new(3, 3),
            [Position::new(0, 0), Position::new(2, 2)],
        )
        .unwrap();

        let (neighbors, count) = board.nearby_mines(Position::new(1, 1));
        assert_eq!(neighbors.len(), 8);
        assert_eq!(count, 2);

        let (neighbors, count) = board.nearby_mines(Position::new(0, 2));
        assert_eq!(neighbors.len(), 3);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_with_mines_out_of_bounds() {
        let result = Board::with_mines(Dimensions::new(2, 2), [Position::new(2, 0)]);
        assert_eq!(result.unwrap_err(), GameError::OutOfBounds(Position::new(2, 0)));
    }

    #[test]
    fn test_display_layout() {
        let board = Board::with_mines(Dimensions::new(1, 2), [Position::new(0, 1)]).unwrap();
        assert_eq!(board.to_string(), "-----\n| |X|\n-----\n");
    }
}
