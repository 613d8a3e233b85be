// Heuristic evaluation of a reconciled board, always from our snake's side.
//
// Five components, each on a 0..=100 scale:
//   length   - share of rivals we are at least as long as
//   food     - share of food we ate or are strictly closest to
//   survivor - rival heads still on the board per agent
//   space    - share of empty squares we are strictly closest to
//   tail     - head-to-tail distance relative to board size
//
// score = w_len*length + w_food*food - w_surv*survivor + w_space*space
//         + w_tail*(baseline - tail)
// with the food and tail weights switching on the hunger threshold.

use crate::board::BoardState;
use crate::cell::CellTag;
use crate::config::ScoresConfig;
use crate::types::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Components {
    pub length: i32,
    pub food: i32,
    pub survivor: i32,
    pub space: i32,
    pub tail: i32,
}

fn rival_heads(state: &BoardState) -> Vec<Coord> {
    state
        .agents
        .iter()
        .skip(1)
        .filter(|a| a.alive)
        .map(|a| a.head())
        .collect()
}

/// Rivals that died during the search still count with their last length
pub fn length_score(state: &BoardState) -> i32 {
    let ours = state.agents[0].len();
    let rivals = state.agents.len() - 1;
    if rivals == 0 {
        return 0;
    }
    let count = state.agents.iter().skip(1).filter(|a| a.len() <= ours).count();
    (100 * count / rivals) as i32
}

/// Food we already ate on this line counts as ours, food a rival ate does not
pub fn food_score(state: &BoardState) -> i32 {
    if state.food.is_empty() {
        return 0;
    }
    let head = state.agents[0].head();
    let rivals = rival_heads(state);
    let count = state
        .food
        .iter()
        .zip(&state.eaten)
        .filter(|&(f, eater)| match eater {
            Some(idx) => *idx == 0,
            None => {
                let ours = head.manhattan(f);
                rivals.iter().all(|r| ours < r.manhattan(f))
            }
        })
        .count();
    (100 * count / state.food.len()) as i32
}

pub fn survivor_score(state: &BoardState) -> i32 {
    let heads = state.grid.count(CellTag::OtherHead);
    (100 * heads / state.agents.len().max(1)) as i32
}

pub fn space_score(state: &BoardState) -> i32 {
    let head = state.agents[0].head();
    let rivals = rival_heads(state);
    let mut empty = 0;
    let mut ours = 0;
    for (cell, tag) in state.grid.iter() {
        if tag != CellTag::Empty {
            continue;
        }
        empty += 1;
        let mine = head.manhattan(&cell);
        let nearest = rivals.iter().map(|r| r.manhattan(&cell)).min().unwrap_or(i32::MAX);
        if mine < nearest {
            ours += 1;
        }
    }
    if empty == 0 {
        return 0;
    }
    100 * ours / empty
}

pub fn tail_score(state: &BoardState) -> i32 {
    let us = &state.agents[0];
    100 * us.head().manhattan(&us.tail()) / (state.height + state.width)
}

pub fn components(state: &BoardState) -> Components {
    Components {
        length: length_score(state),
        food: food_score(state),
        survivor: survivor_score(state),
        space: space_score(state),
        tail: tail_score(state),
    }
}

/// Scores a reconciled state.
///
/// Two overrides come first: our head missing from the grid is a loss, and
/// no rival head left on the board is a win.
pub fn evaluate(state: &BoardState, scores: &ScoresConfig) -> i32 {
    let _guard = crate::simple_profiler::ProfileGuard::new("eval");

    let us = &state.agents[0];
    if !us.alive || state.grid.get(us.head()) != CellTag::OwnHead {
        return scores.score_loss;
    }
    if !state.grid.contains(CellTag::OtherHead) {
        return scores.score_win;
    }

    let c = components(state);
    let hungry = us.health <= scores.hunger_threshold;
    let (food_weight, tail_weight) = if hungry {
        (scores.weight_food_hungry, scores.weight_tail_hungry)
    } else {
        (scores.weight_food_healthy, scores.weight_tail_healthy)
    };

    scores.weight_length * c.length + food_weight * c.food - scores.weight_survivor * c.survivor
        + scores.weight_space * c.space
        + tail_weight * (scores.tail_baseline - c.tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Agent;
    use crate::config::Config;
    use crate::types::Direction;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn sample_state() -> BoardState {
        let me = Agent::new("me", 90, vec![c(5, 5), c(4, 5), c(3, 5)]);
        let them = Agent::new("them", 90, vec![c(9, 9), c(9, 10), c(10, 10)]);
        BoardState::new(11, 11, vec![me, them], vec![c(5, 7), c(10, 8)], vec![])
    }

    #[test]
    fn test_components_on_sample_board() {
        let state = sample_state();
        let comp = components(&state);

        // 3 <= 3
        assert_eq!(comp.length, 100);
        // (5,7): 2 vs 6 is ours, (10,8): 8 vs 2 is theirs
        assert_eq!(comp.food, 50);
        // one OtherHead over two agents
        assert_eq!(comp.survivor, 50);
        // head (5,5) to tail (3,5) is 2 over 22
        assert_eq!(comp.tail, 9);
    }

    fn agent(id: &str, health: i32, body: &[(i32, i32)]) -> Agent {
        Agent::new(id, health, body.iter().map(|&(x, y)| c(x, y)))
    }

    fn bounds_fixtures() -> Vec<BoardState> {
        let no_food = vec![
            agent("me", 90, &[(5, 5), (4, 5), (3, 5)]),
            agent("them", 90, &[(1, 9), (1, 8), (1, 7)]),
        ];
        let three_rivals = vec![
            agent("me", 90, &[(5, 5), (4, 5), (3, 5)]),
            agent("a", 90, &[(8, 8), (8, 9), (8, 10)]),
            agent("b", 40, &[(1, 1), (2, 1), (3, 1)]),
            agent("c", 90, &[(9, 2), (9, 1), (9, 0), (10, 0)]),
        ];
        let crowded = vec![
            agent("me", 30, &[(3, 3), (3, 2), (2, 2), (1, 2), (1, 3), (1, 4)]),
            agent("a", 90, &[(5, 3), (5, 4), (5, 5), (4, 5), (3, 5)]),
            agent("b", 90, &[(5, 1), (4, 1), (3, 1), (2, 1)]),
        ];
        let starving_rival = vec![
            agent("me", 90, &[(5, 5), (4, 5), (3, 5)]),
            agent("a", 1, &[(1, 1), (1, 2), (1, 3)]),
            agent("b", 90, &[(9, 9), (9, 8), (9, 7)]),
        ];
        let next_to_food = vec![
            agent("me", 90, &[(5, 5), (5, 4), (5, 3)]),
            agent("them", 90, &[(7, 6), (8, 6), (9, 6)]),
        ];

        vec![
            sample_state(),
            BoardState::new(11, 11, no_food, vec![], vec![]),
            BoardState::new(11, 11, three_rivals, vec![c(7, 7), c(2, 8)], vec![c(0, 10)]),
            BoardState::new(7, 7, crowded, vec![c(4, 3), c(0, 0)], vec![]),
            BoardState::new(11, 11, starving_rival, vec![c(1, 0)], vec![]),
            BoardState::new(11, 11, next_to_food, vec![c(6, 5), c(0, 10)], vec![]),
        ]
    }

    /// Visits the reconciled state for every combination of legal moves in
    /// one round. Boxed and dead agents stay put.
    fn each_round(state: &mut BoardState, agent: usize, visit: &mut dyn FnMut(&BoardState)) {
        if agent == state.agents.len() {
            let snapshot = state.save_snapshot();
            state.combine_grids();
            visit(state);
            state.restore_snapshot(snapshot);
            return;
        }

        let head = state.agents[agent].head();
        let targets: Vec<Coord> = Direction::all()
            .iter()
            .map(|d| d.apply(&head))
            .filter(|&t| state.is_legal(t))
            .collect();
        if !state.agents[agent].alive || targets.is_empty() {
            each_round(state, agent + 1, visit);
            return;
        }
        for target in targets {
            let undo = state.apply_move(agent, target);
            each_round(state, agent + 1, visit);
            state.undo_move(undo);
        }
    }

    #[test]
    fn test_components_stay_in_range() {
        for (n, mut state) in bounds_fixtures().into_iter().enumerate() {
            let mut visited = 0;
            let check = |s: &BoardState| {
                let comp = components(s);
                for value in [comp.length, comp.food, comp.survivor, comp.space, comp.tail] {
                    assert!((0..=100).contains(&value), "fixture {}: {:?}", n, comp);
                }
            };
            check(&state);
            each_round(&mut state, 0, &mut |s: &BoardState| {
                check(s);
                visited += 1;
            });
            assert!(visited > 0, "fixture {} has no moves", n);
        }
    }

    #[test]
    fn test_food_we_ate_still_scores() {
        let me = Agent::new("me", 90, vec![c(5, 5), c(5, 4), c(5, 3)]);
        let them = Agent::new("them", 90, vec![c(9, 9), c(9, 8), c(9, 7)]);
        let mut state = BoardState::new(11, 11, vec![me, them], vec![c(6, 5)], vec![]);
        assert_eq!(food_score(&state), 100);

        let _a = state.apply_move(0, c(6, 5));
        let _b = state.apply_move(1, c(9, 10));
        state.combine_grids();
        assert_eq!(state.eaten, vec![Some(0)]);
        assert_eq!(food_score(&state), 100);

        state.eaten[0] = Some(1);
        assert_eq!(food_score(&state), 0);
    }

    #[test]
    fn test_dead_rivals_keep_counting_for_length() {
        let mut state = sample_state();
        state.agents.push(Agent::new("long", 90, vec![c(0, 0), c(0, 1), c(0, 2), c(0, 3)]));
        state.agent_grids.push(state.grid.clone());
        state.survivor_count += 1;
        assert_eq!(length_score(&state), 50);

        state.eliminate(2);
        assert_eq!(length_score(&state), 50);
    }

    #[test]
    fn test_space_counts_strictly_closer_empty_squares() {
        let me = Agent::new("me", 90, vec![c(0, 0)]);
        let them = Agent::new("them", 90, vec![c(2, 0)]);
        let state = BoardState::new(3, 1, vec![me, them], vec![], vec![]);
        // only (1,0) is empty and it is equidistant
        assert_eq!(space_score(&state), 0);

        let me = Agent::new("me", 90, vec![c(0, 0)]);
        let them = Agent::new("them", 90, vec![c(3, 0)]);
        let state = BoardState::new(4, 1, vec![me, them], vec![], vec![]);
        // (1,0) is ours, (2,0) is theirs
        assert_eq!(space_score(&state), 50);
    }

    #[test]
    fn test_composite_matches_formula() {
        let config = Config::default_hardcoded();
        let state = sample_state();
        let comp = components(&state);

        let expected = 20 * comp.length + 30 * comp.food - 10 * comp.survivor + 40 * comp.space
            + 50 * (10 - comp.tail);
        assert_eq!(evaluate(&state, &config.scores), expected);
    }

    #[test]
    fn test_hungry_weights() {
        let config = Config::default_hardcoded();
        let mut state = sample_state();
        state.agents[0].health = 50;
        let comp = components(&state);

        let expected = 20 * comp.length + 50 * comp.food - 10 * comp.survivor + 40 * comp.space
            + 30 * (10 - comp.tail);
        assert_eq!(evaluate(&state, &config.scores), expected);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default_hardcoded();

        let mut state = sample_state();
        state.grid.set(c(5, 5), CellTag::Empty);
        assert_eq!(evaluate(&state, &config.scores), config.scores.score_loss);

        let mut state = sample_state();
        state.grid.set(c(9, 9), CellTag::OtherBody);
        assert_eq!(evaluate(&state, &config.scores), config.scores.score_win);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let config = Config::default_hardcoded();
        let state = sample_state();
        assert_eq!(evaluate(&state, &config.scores), evaluate(&state.clone(), &config.scores));
    }
}
