// End-to-end decisions on hand-built boards
//
// Every scenario goes through the same path as a live turn: an API Board is
// converted with BoardState::from_snapshot and handed to the search. Depths
// are fixed and no deadline is set, so the answers are deterministic.

use minimax_snake::board::BoardState;
use minimax_snake::cell::CellTag;
use minimax_snake::config::Config;
use minimax_snake::search::{
    decide_move, decide_move_parallel, iterative_deepening, legal_root_moves, RootStrategy,
    SearchLimits,
};
use minimax_snake::types::{Battlesnake, Board, Coord, Direction};

fn snake(id: &str, health: i32, body: &[(i32, i32)]) -> Battlesnake {
    let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord::new(x, y)).collect();
    Battlesnake {
        id: id.to_string(),
        name: id.to_string(),
        health,
        head: body[0],
        length: body.len() as i32,
        body,
        latency: "0".to_string(),
        shout: None,
    }
}

fn board(snakes: Vec<Battlesnake>, food: &[(i32, i32)]) -> Board {
    Board {
        height: 11,
        width: 11,
        food: food.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        snakes,
        hazards: vec![],
    }
}

fn state_for(board: &Board, you: &Battlesnake) -> BoardState {
    BoardState::from_snapshot(board, you).expect("well-formed snapshot")
}

/// Food directly to the right of our head, the only rival in the far corner
fn adjacent_food_board() -> (Board, Battlesnake) {
    let me = snake("me", 90, &[(5, 5), (5, 4), (5, 3)]);
    let them = snake("them", 90, &[(9, 9), (9, 8), (9, 7)]);
    (board(vec![me.clone(), them], &[(6, 5)]), me)
}

#[test]
fn test_moves_onto_adjacent_food() {
    let (b, me) = adjacent_food_board();
    let scores = Config::default_hardcoded().scores;
    let full_depth = Config::default_hardcoded().timing.max_search_depth;

    for depth in [2, 4, full_depth] {
        let mut state = state_for(&b, &me);
        let outcome = decide_move(&mut state, &scores, SearchLimits::depth(depth));
        assert_eq!(outcome.direction, Direction::Right, "sequential, depth {}", depth);
        assert!(outcome.completed);

        let parallel = decide_move_parallel(&state, &scores, SearchLimits::depth(depth));
        assert_eq!(parallel.direction, Direction::Right, "parallel, depth {}", depth);
        assert_eq!(parallel.score, outcome.score);
    }
}

#[test]
fn test_detour_to_the_same_food_ties_at_six_plies() {
    // Up, right, down reaches (6,5) on our third move and scores the same
    // as eating now; the tie keeps the earlier direction.
    let (b, me) = adjacent_food_board();
    let scores = Config::default_hardcoded().scores;

    let mut state = state_for(&b, &me);
    let outcome = decide_move(&mut state, &scores, SearchLimits::depth(6));
    assert_eq!(outcome.direction, Direction::Up);

    // Score each first move alone by walling off the others for one ply.
    // The wall is gone after the first round is reconciled.
    let mut scores_by_move = Vec::new();
    for (dir, target) in legal_root_moves(&state) {
        let mut only = state.clone();
        for other in Direction::all() {
            let blocked = other.apply(&me.head);
            if other != dir && only.in_bounds(blocked) {
                only.grid.set(blocked, CellTag::Hazard);
            }
        }
        let single = decide_move(&mut only, &scores, SearchLimits::depth(6));
        assert_eq!(single.direction, dir, "{:?}", target);
        scores_by_move.push((dir, single.score));
    }
    let up = scores_by_move.iter().find(|(d, _)| *d == Direction::Up).map(|s| s.1);
    let right = scores_by_move.iter().find(|(d, _)| *d == Direction::Right).map(|s| s.1);
    assert_eq!(up, right);
    assert_eq!(up, Some(outcome.score));
}

#[test]
fn test_starving_snake_eats_at_every_depth() {
    let me = snake("me", 1, &[(5, 5), (5, 4), (5, 3)]);
    let them = snake("them", 90, &[(9, 9), (9, 8), (9, 7)]);
    let b = board(vec![me.clone(), them], &[(6, 5)]);
    let scores = Config::default_hardcoded().scores;

    for depth in (2..=12).step_by(2) {
        let mut state = state_for(&b, &me);
        let outcome = decide_move(&mut state, &scores, SearchLimits::depth(depth));
        assert_eq!(outcome.direction, Direction::Right, "depth {}", depth);
    }
}

#[test]
fn test_moves_onto_adjacent_food_with_iterative_deepening() {
    let (b, me) = adjacent_food_board();
    let mut config = Config::default_hardcoded();
    config.timing.initial_depth = 2;
    config.timing.max_search_depth = 4;

    for strategy in [RootStrategy::Sequential, RootStrategy::ParallelRoot] {
        let mut state = state_for(&b, &me);
        let mut depths = Vec::new();
        let outcome = iterative_deepening(&mut state, &config, strategy, None, |o| depths.push(o.depth));

        assert_eq!(depths, vec![2, 4], "{:?}", strategy);
        assert_eq!(outcome.direction, Direction::Right, "{:?}", strategy);
    }
}

#[test]
fn test_single_exit_is_taken() {
    // Wall on the left, own neck below, own body to the right
    let me = snake("me", 90, &[(0, 5), (0, 4), (1, 4), (1, 5), (1, 6)]);
    let them = snake("them", 90, &[(9, 9), (9, 8), (9, 7)]);
    let b = board(vec![me.clone(), them], &[(6, 5)]);

    for depth in [2, 4] {
        let mut state = state_for(&b, &me);
        let outcome = decide_move(&mut state, &Config::default_hardcoded().scores, SearchLimits::depth(depth));
        assert_eq!(outcome.direction, Direction::Up, "depth {}", depth);
    }
}

#[test]
fn test_single_exit_ignores_weights() {
    let me = snake("me", 90, &[(0, 5), (0, 4), (1, 4), (1, 5), (1, 6)]);
    let them = snake("them", 90, &[(9, 9), (9, 8), (9, 7)]);
    let b = board(vec![me.clone(), them], &[(0, 0)]);

    let mut scores = Config::default_hardcoded().scores;
    scores.weight_space = -400;
    scores.weight_food_healthy = -300;
    scores.weight_tail_healthy = 0;

    let mut state = state_for(&b, &me);
    let outcome = decide_move(&mut state, &scores, SearchLimits::depth(4));
    assert_eq!(outcome.direction, Direction::Up);
}

#[test]
fn test_sole_survivor_answers_without_search() {
    let me = snake("me", 90, &[(5, 5), (4, 5), (3, 5)]);
    let b = board(vec![me.clone()], &[(6, 5)]);
    let mut state = state_for(&b, &me);

    let outcome = decide_move(&mut state, &Config::default_hardcoded().scores, SearchLimits::depth(12));
    assert_eq!(outcome.direction, Direction::Up);
    assert_eq!(outcome.nodes, 0);
}

#[test]
fn test_sole_survivor_against_top_wall_avoids_up() {
    let me = snake("me", 90, &[(5, 10), (5, 9), (5, 8)]);
    let b = board(vec![me.clone()], &[]);
    let mut state = state_for(&b, &me);

    let outcome = decide_move(&mut state, &Config::default_hardcoded().scores, SearchLimits::depth(12));
    assert_eq!(outcome.direction, Direction::Left);
    assert_eq!(outcome.nodes, 0);
}

#[test]
fn test_chosen_move_is_always_legal() {
    let cases = vec![
        (
            snake("me", 90, &[(10, 10), (10, 9), (9, 9)]),
            snake("them", 90, &[(0, 0), (1, 0), (2, 0)]),
            vec![(5, 5)],
        ),
        (
            snake("me", 20, &[(3, 3), (3, 2), (3, 1), (3, 0)]),
            snake("them", 90, &[(4, 4), (5, 4), (6, 4), (7, 4)]),
            vec![(2, 3), (8, 8)],
        ),
        (
            snake("me", 90, &[(0, 10), (1, 10), (2, 10)]),
            snake("them", 90, &[(1, 8), (1, 7), (1, 6)]),
            vec![],
        ),
    ];

    for (me, them, food) in cases {
        let b = board(vec![them, me.clone()], &food);
        let mut state = state_for(&b, &me);
        let outcome = decide_move(&mut state, &Config::default_hardcoded().scores, SearchLimits::depth(4));

        let target = outcome.direction.apply(&me.head);
        assert!(state.is_legal(target), "{} picked {} into {:?}", me.id, outcome.direction, target);
    }
}
