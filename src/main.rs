use minesweeper_ai::autoplay::{self, Outcome};
use minesweeper_ai::{Agent, Board, Game, GameConfig, GameState, PlayError, Position, Reveal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};

struct Session {
    config: GameConfig,
    rng: StdRng,
    game: Game,
    agent: Agent<StdRng>,
    games_played: usize,
    moves_made: usize,
}

impl Session {
    fn new(config: GameConfig, seed: Option<u64>) -> Result<Self, PlayError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (game, agent) = new_game(config, &mut rng)?;
        Ok(Self {
            config,
            rng,
            game,
            agent,
            games_played: 1,
            moves_made: 0,
        })
    }

    fn reset(&mut self) -> Result<(), PlayError> {
        let (game, agent) = new_game(self.config, &mut self.rng)?;
        self.game = game;
        self.agent = agent;
        self.games_played += 1;
        self.moves_made = 0;
        Ok(())
    }
}

fn new_game(config: GameConfig, rng: &mut StdRng) -> Result<(Game, Agent<StdRng>), PlayError> {
    let board = Board::new(config, rng)?;
    let agent = Agent::with_seed(config.dimensions(), rng.gen());
    Ok((Game::new(board), agent))
}

fn main() {
    match run() {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn run() -> Result<(), PlayError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next().and_then(|s| s.parse().ok()) {
        Some(size) => GameConfig::preset(size),
        None => GameConfig::default(),
    };
    config.validate()?;
    let seed = args.next().and_then(|s| s.parse().ok());

    let mut session = Session::new(config, seed)?;
    println!("Game {}:", session.games_played);

    loop {
        print_board(&session);

        let Some(command) = read_command() else {
            return Ok(());
        };

        let result = match command {
            Command::Quit => return Ok(()),
            Command::Reset => {
                session.reset()?;
                println!("Game {}:", session.games_played);
                continue;
            }
            Command::Knowledge => {
                print_knowledge(&session);
                continue;
            }
            Command::Reveal(pos) => open_manually(&mut session, pos),
            Command::AiMove => ai_move(&mut session),
            Command::Auto => auto_play(&mut session),
        };

        match result {
            Ok(()) => {}
            Err(PlayError::Game(e)) => println!("Error: {}", e),
            Err(PlayError::Inference(e)) if e.is_contradiction() => {
                println!("Inconsistent knowledge, stopping the AI: {}", e);
            }
            Err(PlayError::Inference(e)) => println!("Error: {}", e),
        }

        match session.game.state() {
            GameState::Won => println!("Won!"),
            GameState::Lost => println!("Lost!"),
            GameState::Playing => {}
        }
    }
}

fn open_manually(session: &mut Session, pos: Position) -> Result<(), PlayError> {
    if let Reveal::Mine = autoplay::open(&mut session.game, &mut session.agent, pos)? {
        println!("Game lost!");
    }
    Ok(())
}

fn ai_move(session: &mut Session) -> Result<(), PlayError> {
    let number = session.moves_made + 1;
    match autoplay::step(&mut session.game, &mut session.agent, number)? {
        Some(record) => {
            session.moves_made = number;
            println!("{}", record);
        }
        None => println!("{}", Outcome::Stuck),
    }
    Ok(())
}

fn auto_play(session: &mut Session) -> Result<(), PlayError> {
    let mut record = autoplay::play(&mut session.game, &mut session.agent)?;
    for entry in &mut record.moves {
        entry.number += session.moves_made;
    }
    session.moves_made += record.moves.len();
    print!(
        "{}",
        record.render(session.games_played, &session.game, &session.agent)
    );
    Ok(())
}

fn print_knowledge(session: &Session) {
    print!("{}", autoplay::knowledge_report(session.agent.knowledge()));
    let report = session.agent.last_report();
    println!(
        "Last closure: {} passes, {} derived, {} mines, {} safe",
        report.passes, report.derived, report.mines_marked, report.safes_marked
    );
}

fn print_board(session: &Session) {
    let game = &session.game;
    let dims = game.dimensions();
    let lost = game.state() == GameState::Lost;

    println!(
        "Flags: {}/{}",
        game.flags().len(),
        game.board().mines_count()
    );

    // Print column numbers
    print!("   ");
    for col in 0..dims.width {
        print!("{:>2}", col % 100);
    }
    println!();

    for row in 0..dims.height as i32 {
        print!("{:>2} ", row);
        for col in 0..dims.width as i32 {
            let pos = Position::new(row, col);
            let symbol = match game.revealed(pos) {
                Some(0) => " ".to_string(),
                Some(n) => n.to_string(),
                None if lost && game.board().is_mine(pos) => "*".to_string(),
                None if game.is_flagged(pos) => "⚑".to_string(),
                None => "□".to_string(),
            };
            print!("{:>2}", symbol);
        }
        println!();
    }
}

enum Command {
    Reveal(Position),
    AiMove,
    Auto,
    Reset,
    Knowledge,
    Quit,
}

fn read_command() -> Option<Command> {
    loop {
        print!("Enter command (row col | a = AI move | auto | k = knowledge | n = new game | q): ");
        io::stdout().flush().ok()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input).ok()? == 0 {
            return Some(Command::Quit);
        }

        let mut parts = input.split_whitespace();
        let command = match parts.next() {
            Some("a") => Command::AiMove,
            Some("auto") => Command::Auto,
            Some("k") => Command::Knowledge,
            Some("n") => Command::Reset,
            Some("q") => Command::Quit,
            Some(row) => {
                let row = row.parse().ok();
                let col = parts.next().and_then(|c| c.parse().ok());
                match (row, col) {
                    (Some(row), Some(col)) => Command::Reveal(Position::new(row, col)),
                    _ => {
                        println!("Invalid command");
                        continue;
                    }
                }
            }
            None => continue,
        };
        return Some(command);
    }
}
