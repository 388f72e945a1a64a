use super::{Agent, KnowledgeBase};
use crate::autoplay;
use crate::{Board, Game, GameConfig, GameState};
use rand::prelude::*;

/// Configuration for test board generation
#[derive(Debug, Clone)]
pub struct TestBoardConfig {
    pub height: u32,
    pub width: u32,
    pub mine_density: f64,
}

impl Default for TestBoardConfig {
    fn default() -> Self {
        Self {
            height: 8,
            width: 8,
            mine_density: 0.15,
        }
    }
}

impl TestBoardConfig {
    pub fn game_config(&self) -> GameConfig {
        let cells = self.height * self.width;
        let mines = ((cells as f64 * self.mine_density) as u32).min(cells.saturating_sub(1));
        GameConfig {
            height: self.height,
            width: self.width,
            mines,
        }
    }
}

/// Generates reproducible boards
pub struct TestBoardGenerator {
    config: TestBoardConfig,
    rng: StdRng,
}

impl TestBoardGenerator {
    pub fn new(config: TestBoardConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(config: TestBoardConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> Board {
        Board::new(self.config.game_config(), &mut self.rng)
            .expect("test board configuration must be valid")
    }

    pub fn generate_batch(&mut self, count: usize) -> Vec<Board> {
        (0..count).map(|_| self.generate()).collect()
    }
}

/// Checks that everything the knowledge base claims agrees with the board.
pub fn validate_knowledge(kb: &KnowledgeBase, board: &Board) -> bool {
    if let Err(violation) = kb.check_invariants() {
        println!("Invariant violated: {}", violation);
        return false;
    }

    for pos in kb.confirmed_mines() {
        if !board.is_mine(*pos) {
            println!("Safe position {} was confirmed as a mine", pos);
            return false;
        }
    }

    for pos in kb.confirmed_safe() {
        if board.is_mine(*pos) {
            println!("Mine {} was confirmed as safe", pos);
            return false;
        }
    }

    true
}

/// Plays a full game, validating the knowledge base after every move.
pub fn validate_game(board: Board, seed: u64) -> bool {
    let mut agent = Agent::with_seed(board.dimensions(), seed);
    let mut game = Game::new(board);
    let mut number = 0;

    loop {
        number += 1;
        let step = match autoplay::step(&mut game, &mut agent, number) {
            Ok(step) => step,
            Err(e) => {
                println!("Game failed on move {}: {}", number, e);
                return false;
            }
        };

        if !validate_knowledge(agent.knowledge(), game.board()) {
            return false;
        }

        match step {
            Some(record) if game.state() == GameState::Lost => {
                if record.chosen.kind == super::MoveKind::Safe {
                    println!("Safe move {} hit a mine", record.chosen.position);
                    return false;
                }
                return true;
            }
            Some(_) => continue,
            None => return true,
        }
    }
}
