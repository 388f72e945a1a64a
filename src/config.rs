use crate::{Dimensions, GameError};

/// Board shape and mine count for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub height: u32,
    pub width: u32,
    pub mines: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            height: 8,
            width: 8,
            mines: 8,
        }
    }
}

impl GameConfig {
    pub const PRESETS: [u32; 3] = [8, 12, 16];

    pub fn new(height: u32, width: u32, mines: u32) -> Result<Self, GameError> {
        let config = Self {
            height,
            width,
            mines,
        };
        config.validate()?;
        Ok(config)
    }

    /// Square grid with the classic density of 5 mines per 32 cells.
    pub fn preset(size: u32) -> Self {
        Self {
            height: size,
            width: size,
            mines: (5 * size * size) / 32,
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.height == 0 || self.width == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines >= self.height * self.width {
            return Err(GameError::TooManyMines {
                height: self.height,
                width: self.width,
                mines: self.mines,
            });
        }
        Ok(())
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.height, self.width)
    }
}
