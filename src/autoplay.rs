//! Drives a [`Game`] with an [`Agent`]: pick a move, open it, feed every
//! opened cell back, flag what the agent has proven to be mines.

use crate::error::PlayError;
use crate::game::{Game, GameState, Reveal};
use crate::solver::{Agent, KnowledgeBase, SolverMove};
use crate::Position;
use itertools::Itertools;
use rand::Rng;
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost(Position),
    /// The agent had nothing left to open.
    Stuck,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won => write!(f, "Game won!"),
            Outcome::Lost(pos) => write!(f, "Game lost! Mine at {pos}"),
            Outcome::Stuck => write!(f, "No moves left to make."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRecord {
    pub number: usize,
    pub chosen: SolverMove,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move {}: {}", self.number, self.chosen)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub moves: Vec<MoveRecord>,
    pub outcome: Outcome,
}

impl GameRecord {
    pub fn count_where(&self, f: impl Fn(&SolverMove) -> bool) -> usize {
        self.moves.iter().filter(|m| f(&m.chosen)).count()
    }

    /// Text log of one game: mine layout, every move, outcome, final knowledge.
    pub fn render<R: Rng>(&self, game_number: usize, game: &Game, agent: &Agent<R>) -> String {
        let mut log = format!("Game {game_number}:\n{}", game.board());
        for record in &self.moves {
            log.push_str(&format!("{record}\n"));
        }
        log.push_str(&format!("{}\n", self.outcome));
        log.push_str(&knowledge_report(agent.knowledge()));
        log
    }
}

/// Constraints, confirmed cells and estimates, one section each.
///
/// Cells no constraint mentions are listed with `?` as their estimate.
pub fn knowledge_report(kb: &KnowledgeBase) -> String {
    let mut report = String::from("Current knowledge:\n");
    for constraint in kb.constraints() {
        let _ = writeln!(report, "{constraint}");
    }

    report.push_str("Current known safes:\n");
    for pos in kb.confirmed_safe().iter().sorted() {
        let _ = write!(report, "{pos} ");
    }
    report.push_str("\nCurrent known mines:\n");
    for pos in kb.confirmed_mines().iter().sorted() {
        let _ = write!(report, "{pos} ");
    }
    report.push_str("\nCurrent known probabilities:\n");
    for (pos, estimate) in kb.probability().iter().sorted_by_key(|(pos, _)| **pos) {
        let _ = write!(report, "{pos}: {estimate} ");
    }
    report.push('\n');
    report
}

/// Opens `pos` and hands every opened cell to the agent.
pub fn open<R: Rng>(
    game: &mut Game,
    agent: &mut Agent<R>,
    pos: Position,
) -> Result<Reveal, PlayError> {
    let reveal = game.reveal(pos)?;
    if let Reveal::Opened(cells) = &reveal {
        for &(cell, count) in cells {
            agent.ingest(cell, count)?;
        }
        flag_confirmed(game, agent)?;
    }
    Ok(reveal)
}

fn flag_confirmed<R: Rng>(game: &mut Game, agent: &Agent<R>) -> Result<(), PlayError> {
    let mut mines: Vec<Position> = agent
        .knowledge()
        .confirmed_mines()
        .iter()
        .copied()
        .filter(|p| !game.is_flagged(*p))
        .collect();
    mines.sort();

    for pos in mines {
        if game.state() != GameState::Playing {
            break;
        }
        game.toggle_flag(pos)?;
    }
    Ok(())
}

/// Makes one agent move. `Ok(None)` when the game is over or no move exists.
pub fn step<R: Rng>(
    game: &mut Game,
    agent: &mut Agent<R>,
    number: usize,
) -> Result<Option<MoveRecord>, PlayError> {
    if game.state() != GameState::Playing {
        return Ok(None);
    }
    let Some(chosen) = agent.select_move()? else {
        return Ok(None);
    };

    open(game, agent, chosen.position)?;
    Ok(Some(MoveRecord { number, chosen }))
}

/// Plays until the game is won, lost, or the agent runs out of moves.
pub fn play<R: Rng>(game: &mut Game, agent: &mut Agent<R>) -> Result<GameRecord, PlayError> {
    let mut moves = Vec::new();

    while let Some(record) = step(game, agent, moves.len() + 1)? {
        moves.push(record);
    }

    let outcome = match game.state() {
        GameState::Won => Outcome::Won,
        GameState::Lost => match moves.last() {
            Some(last) => Outcome::Lost(last.chosen.position),
            None => Outcome::Stuck,
        },
        GameState::Playing => Outcome::Stuck,
    };
    Ok(GameRecord { moves, outcome })
}
