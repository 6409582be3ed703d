use stairs_solver_core::{
    Direction, Position,
    board::Board,
    command::{Action, legal_actions, replay},
    demo::{demo_board, demo_heuristic, demo_script},
    entity::{CharacterKind, Item, ItemKind},
    search::{SolveError, Solver, SolverConfig},
};

fn after(steps: usize) -> Board {
    let script = demo_script();
    replay(&demo_board(), &script[..steps]).unwrap()
}

#[test]
fn scripted_solution_reaches_the_stairs() {
    let board = demo_board();
    assert!(!board.solved());
    let script = demo_script();
    assert_eq!(script.len(), 19);

    let mut current = board;
    for (turn, action) in script.iter().enumerate() {
        let next = action.execute(&current).unwrap();
        assert!(!next.unsolvable(), "protagonist died on turn {}: {}", turn + 1, action);
        assert_ne!(next, current, "turn {} changed nothing: {}", turn + 1, action);
        assert!(
            legal_actions(&current).unwrap().contains(action),
            "turn {} is not offered: {}",
            turn + 1,
            action
        );
        current = next;
    }
    assert!(current.solved());
    assert_eq!(current.protagonist().unwrap().position, Position::new(2, 1));
}

#[test]
fn opening_swap_trades_places_with_ushiwakamaru() {
    let board = after(1);
    assert_eq!(board.protagonist().unwrap().position, Position::new(1, 3));
    assert_eq!(
        board.character_at(Position::new(2, 5)).unwrap().kind,
        CharacterKind::Ushiwakamaru
    );
    assert!(board.inventory.contains(&Item::wand(ItemKind::SwapWand, 1)));
}

#[test]
fn pit_stays_gone_once_filled() {
    // The spent knockback wand lands in the pit on turn 10.
    assert_eq!(after(9).traps.len(), 1);
    let filled = after(10);
    assert!(filled.traps.is_empty());
    assert!(!filled.inventory.contains(&Item::wand(ItemKind::KnockbackWand, 0)));

    let script = demo_script();
    let mut current = filled;
    for action in &script[10..] {
        current = action.execute(&current).unwrap();
        assert!(current.traps.is_empty());
    }
}

#[test]
fn ushiwakamaru_ends_up_beside_the_shaft() {
    let board = after(13);
    let ushiwaka = board
        .characters
        .find_by(|c| c.kind == CharacterKind::Ushiwakamaru)
        .unwrap();
    assert_eq!(ushiwaka.position, Position::new(3, 3));
    assert_eq!(ushiwaka.facing, Direction::NorthWest);
}

#[test]
fn dropping_onto_an_item_leaves_the_board_unchanged() {
    // After turn 3 a swap wand lies under the protagonist.
    let board = after(3);
    let here = board.protagonist().unwrap().position;
    assert!(board.item_at(here).is_some());
    assert!(!board.can_drop_at(here));
    let next = Action::Drop {
        item: Item::wand(ItemKind::AttractWand, 1),
    }
    .execute(&board)
    .unwrap();
    assert_eq!(next, board);
}

#[test]
fn search_finishes_the_late_game() {
    let board = after(16);
    let solver = Solver::with_heuristic(demo_heuristic(), SolverConfig::default());
    let solution = solver.solve(&board).unwrap();

    assert!(!solution.is_empty());
    assert!(solution.final_board().solved());
    assert_eq!(&solution.replay().unwrap(), solution.final_board());
    assert!(solution.stats.expanded <= solution.stats.discovered);
}

#[test]
fn search_stops_at_the_expansion_budget() {
    let config = SolverConfig {
        max_expansions: Some(1),
        ..SolverConfig::default()
    };
    let err = Solver::with_heuristic(demo_heuristic(), config)
        .solve(&demo_board())
        .unwrap_err();
    assert_eq!(err, SolveError::BudgetExceeded { limit: 1 });
}

#[test]
#[cfg_attr(debug_assertions, ignore = "explores a large state space; run with --release")]
fn search_solves_the_demo_floor() {
    let solver = Solver::with_heuristic(demo_heuristic(), SolverConfig::default());
    let solution = solver.solve(&demo_board()).unwrap();
    assert!(!solution.is_empty());
    assert!(solution.final_board().solved());
    assert_eq!(&solution.replay().unwrap(), solution.final_board());
}
