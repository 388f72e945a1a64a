#![cfg(feature = "test-utils")]

use minesweeper_ai::solver::test_utils::{
    validate_game, TestBoardConfig, TestBoardGenerator,
};

fn run_batch(config: TestBoardConfig, games: usize) -> usize {
    let mut generator = TestBoardGenerator::with_seed(config, 12345);
    let mut failures = 0;

    for (idx, board) in generator.generate_batch(games).into_iter().enumerate() {
        if !validate_game(board, idx as u64) {
            println!("Failure on test case {}", idx);
            failures += 1;
        }
    }

    failures
}

#[test]
fn test_beginner_games_extensive() {
    let failures = run_batch(TestBoardConfig::default(), 500);
    assert_eq!(failures, 0, "Solver failed on {} out of 500 games", failures);
}

#[test]
fn test_intermediate_games_extensive() {
    let config = TestBoardConfig {
        height: 16,
        width: 16,
        mine_density: 0.15,
    };
    let failures = run_batch(config, 100);
    assert_eq!(failures, 0, "Solver failed on {} out of 100 games", failures);
}

#[test]
fn test_dense_games_extensive() {
    let config = TestBoardConfig {
        height: 12,
        width: 12,
        mine_density: 0.3,
    };
    let failures = run_batch(config, 100);
    assert_eq!(failures, 0, "Solver failed on {} out of 100 games", failures);
}
