use crate::{Board, Dimensions, GameError, Position};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What happened when a cell was revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reveal {
    Mine,
    /// Every cell opened by the click, in opening order, with its neighbor mine count.
    Opened(Vec<(Position, u8)>),
}

pub struct Game {
    board: Board,
    state: GameState,
    revealed: HashMap<Position, u8>,
    flagged: HashSet<Position>,
}

impl Game {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            state: GameState::Playing,
            revealed: HashMap::new(),
            flagged: HashSet::new(),
        }
    }

    pub fn reveal(&mut self, pos: Position) -> Result<Reveal, GameError> {
        self.check_playable(pos)?;

        if self.revealed.contains_key(&pos) {
            return Err(GameError::AlreadyRevealed(pos));
        }
        if self.flagged.contains(&pos) {
            return Ok(Reveal::Opened(Vec::new()));
        }
        if self.board.is_mine(pos) {
            self.state = GameState::Lost;
            return Ok(Reveal::Mine);
        }

        let mut opened = Vec::new();
        let mut queue = VecDeque::from([pos]);
        let mut seen = HashSet::from([pos]);

        while let Some(current) = queue.pop_front() {
            let (neighbors, count) = self.board.nearby_mines(current);
            self.revealed.insert(current, count);
            opened.push((current, count));

            if count == 0 {
                for neighbor in neighbors {
                    let hidden = !self.revealed.contains_key(&neighbor)
                        && !self.flagged.contains(&neighbor);
                    if hidden && seen.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        self.check_win_condition();
        Ok(Reveal::Opened(opened))
    }

    pub fn toggle_flag(&mut self, pos: Position) -> Result<(), GameError> {
        self.check_playable(pos)?;

        if self.revealed.contains_key(&pos) {
            return Err(GameError::AlreadyRevealed(pos));
        }
        if !self.flagged.remove(&pos) {
            self.flagged.insert(pos);
        }

        self.check_win_condition();
        Ok(())
    }

    fn check_playable(&self, pos: Position) -> Result<(), GameError> {
        if self.state != GameState::Playing {
            return Err(GameError::InvalidGameState);
        }
        if !self.board.is_within_bounds(pos) {
            return Err(GameError::OutOfBounds(pos));
        }
        Ok(())
    }

    fn check_win_condition(&mut self) {
        let total_non_mine_cells =
            (self.board.dimensions().area() - self.board.mines_count()) as usize;

        if self.revealed.len() == total_non_mine_cells || &self.flagged == self.board.mines() {
            self.state = GameState::Won;
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn dimensions(&self) -> Dimensions {
        self.board.dimensions()
    }

    /// Neighbor mine count of a revealed cell.
    pub fn revealed(&self, pos: Position) -> Option<u8> {
        self.revealed.get(&pos).copied()
    }

    pub fn is_flagged(&self, pos: Position) -> bool {
        self.flagged.contains(&pos)
    }

    pub fn flags(&self) -> &HashSet<Position> {
        &self.flagged
    }
}
