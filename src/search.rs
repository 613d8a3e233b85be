// Adversarial search
//
// Depth-bounded minimax with alpha-beta pruning over the fixed agent order.
// Our snake maximizes. Every other snake is folded into a single minimizing
// layer (the "paranoid" approximation): rivals are assumed to cooperate
// against us instead of each pursuing its own goal as in max-n. This keeps
// alpha-beta applicable and is deliberately conservative.
//
// State is advanced and retreated in place: apply/undo for every ply, and
// save/combine/restore of the round at each of our plies. The horizon is
// checked only at our ply, after the round has been reconciled, so every
// leaf sees a consensus grid.

use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use crate::board::BoardState;
use crate::config::{Config, ScoresConfig};
use crate::evaluation::evaluate;
use crate::simple_profiler::{self, ProfileGuard};
use crate::types::{Coord, Direction};

/// Returned when nothing better is known
pub const DEFAULT_DIRECTION: Direction = Direction::Up;

/// Nodes between two deadline checks
const TIME_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Ply count after which the next round boundary is a leaf
    pub max_depth: u32,
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    pub fn depth(max_depth: u32) -> Self {
        SearchLimits {
            max_depth,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// How the root candidates are distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStrategy {
    /// One candidate after another, sharing the alpha bound
    Sequential,
    /// Candidates in parallel on rayon, each on its own copy of the board
    ParallelRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub direction: Direction,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
    /// Every legal root candidate was searched to the horizon
    pub completed: bool,
}

struct Searcher<'a> {
    scores: &'a ScoresConfig,
    max_depth: u32,
    deadline: Option<Instant>,
    nodes: u64,
    aborted: bool,
}

impl<'a> Searcher<'a> {
    fn new(scores: &'a ScoresConfig, limits: SearchLimits) -> Self {
        Searcher {
            scores,
            max_depth: limits.max_depth,
            deadline: limits.deadline,
            nodes: 0,
            aborted: false,
        }
    }

    fn out_of_time(&mut self) -> bool {
        if !self.aborted && self.nodes % TIME_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                self.aborted = Instant::now() >= deadline;
            }
        }
        self.aborted
    }

    /// Value of the position with `agent` to move
    fn minimax(
        &mut self,
        state: &mut BoardState,
        agent: usize,
        alpha: i32,
        beta: i32,
        depth: u32,
    ) -> i32 {
        self.nodes += 1;
        if self.out_of_time() {
            return self.scores.score_loss;
        }

        if state.survivor_count < 2 {
            return self.terminal_score(state);
        }

        if agent == 0 {
            self.our_ply(state, alpha, beta, depth)
        } else {
            self.opponent_ply(state, agent, alpha, beta, depth)
        }
    }

    fn terminal_score(&self, state: &BoardState) -> i32 {
        if state.agents[0].alive {
            self.scores.score_win
        } else {
            self.scores.score_loss
        }
    }

    fn our_ply(
        &mut self,
        state: &mut BoardState,
        alpha: i32,
        beta: i32,
        depth: u32,
    ) -> i32 {
        if !state.agents[0].alive {
            return self.scores.score_loss;
        }

        let snapshot = state.save_snapshot();
        state.combine_grids();

        let result = if !state.agents[0].alive || state.survivor_count < 2 {
            self.terminal_score(state)
        } else if depth >= self.max_depth {
            evaluate(state, self.scores)
        } else {
            self.expand(state, 0, alpha, beta, depth)
        };

        state.restore_snapshot(snapshot);
        result
    }

    fn opponent_ply(
        &mut self,
        state: &mut BoardState,
        agent: usize,
        alpha: i32,
        beta: i32,
        depth: u32,
    ) -> i32 {
        // Dead rivals and branches we already lost are passed through
        // without spending a ply.
        if !state.agents[0].alive || !state.agents[agent].alive {
            let next = (agent + 1) % state.agents.len();
            return self.minimax(state, next, alpha, beta, depth);
        }
        self.expand(state, agent, alpha, beta, depth)
    }

    /// Tries every legal move of `agent`. Agent 0 maximizes, everyone else
    /// minimizes.
    fn expand(
        &mut self,
        state: &mut BoardState,
        agent: usize,
        mut alpha: i32,
        mut beta: i32,
        depth: u32,
    ) -> i32 {
        let maximizing = agent == 0;
        let head = state.agents[agent].head();
        let next = (agent + 1) % state.agents.len();
        let mut best: Option<i32> = None;

        for dir in Direction::SEARCH_ORDER {
            let target = dir.apply(&head);
            if !state.is_legal(target) {
                continue;
            }

            let undo = {
                let _guard = ProfileGuard::new("apply_move");
                state.apply_move(agent, target)
            };
            let value = self.minimax(state, next, alpha, beta, depth + 1);
            state.undo_move(undo);
            if self.aborted {
                break;
            }

            if maximizing {
                best = Some(best.map_or(value, |b| b.max(value)));
                alpha = alpha.max(value);
            } else {
                best = Some(best.map_or(value, |b| b.min(value)));
                beta = beta.min(value);
            }
            if beta <= alpha {
                simple_profiler::record_alpha_beta_cutoff();
                break;
            }
        }

        match best {
            Some(score) => score,
            None if maximizing => self.scores.score_loss,
            None => self.forfeit(state, agent, alpha, beta, depth),
        }
    }

    /// A boxed-in rival is out for the rest of this branch
    fn forfeit(
        &mut self,
        state: &mut BoardState,
        agent: usize,
        alpha: i32,
        beta: i32,
        depth: u32,
    ) -> i32 {
        let next = (agent + 1) % state.agents.len();
        state.eliminate(agent);
        let value = self.minimax(state, next, alpha, beta, depth + 1);
        state.revive(agent);
        value
    }
}

/// Our legal first moves in search order
pub fn legal_root_moves(state: &BoardState) -> Vec<(Direction, Coord)> {
    let head = state.agents[0].head();
    Direction::SEARCH_ORDER
        .iter()
        .map(|&dir| (dir, dir.apply(&head)))
        .filter(|&(_, target)| state.is_legal(target))
        .collect()
}

/// Move used when no candidate is legal: the first one that at least stays
/// on the board, else the default.
pub fn trapped_fallback(state: &BoardState) -> Direction {
    let head = state.agents[0].head();
    Direction::SEARCH_ORDER
        .iter()
        .copied()
        .find(|dir| state.in_bounds(dir.apply(&head)))
        .unwrap_or(DEFAULT_DIRECTION)
}

/// Best cheap guess before any search has finished
pub fn first_legal_move(state: &BoardState) -> Direction {
    legal_root_moves(state)
        .first()
        .map(|&(dir, _)| dir)
        .unwrap_or_else(|| trapped_fallback(state))
}

/// Answers that need no search: we are the only snake left, or we have no
/// legal move at all.
fn shortcut(state: &BoardState, scores: &ScoresConfig, depth: u32) -> Option<SearchOutcome> {
    if state.survivor_count < 2 {
        let legal = legal_root_moves(state);
        let direction = if legal.is_empty() {
            trapped_fallback(state)
        } else if legal.iter().any(|&(d, _)| d == DEFAULT_DIRECTION) {
            DEFAULT_DIRECTION
        } else {
            legal[0].0
        };
        return Some(SearchOutcome {
            direction,
            score: scores.score_win,
            depth,
            nodes: 0,
            completed: true,
        });
    }
    if legal_root_moves(state).is_empty() {
        return Some(SearchOutcome {
            direction: trapped_fallback(state),
            score: scores.score_loss,
            depth,
            nodes: 0,
            completed: true,
        });
    }
    None
}

/// Decision entry point: searches each legal first move and keeps the
/// strictly best one, in search order.
///
/// If the deadline passes mid-search, candidates that finished still count;
/// with none finished the first legal move is returned.
pub fn decide_move(state: &mut BoardState, scores: &ScoresConfig, limits: SearchLimits) -> SearchOutcome {
    if let Some(outcome) = shortcut(state, scores, limits.max_depth) {
        return outcome;
    }
    let _guard = ProfileGuard::new("search");
    state.debug_check_invariants();

    let mut searcher = Searcher::new(scores, limits);
    let next = 1 % state.agents.len();
    let mut alpha = i32::MIN;
    let beta = i32::MAX;
    let mut best: Option<(i32, Direction)> = None;
    let candidates = legal_root_moves(state);

    for &(dir, target) in &candidates {
        let undo = state.apply_move(0, target);
        let value = searcher.minimax(state, next, alpha, beta, 1);
        state.undo_move(undo);
        if searcher.aborted {
            break;
        }

        if best.map_or(true, |(b, _)| value > b) {
            best = Some((value, dir));
        }
        alpha = alpha.max(value);
        if beta <= alpha {
            break;
        }
    }

    let (score, direction) = best.unwrap_or((scores.score_loss, candidates[0].0));
    SearchOutcome {
        direction,
        score,
        depth: limits.max_depth,
        nodes: searcher.nodes,
        completed: !searcher.aborted,
    }
}

/// Same decision as `decide_move`, with the root candidates searched
/// concurrently. Each candidate gets a full window, which selects the same
/// move as the sequential root.
pub fn decide_move_parallel(state: &BoardState, scores: &ScoresConfig, limits: SearchLimits) -> SearchOutcome {
    if let Some(outcome) = shortcut(state, scores, limits.max_depth) {
        return outcome;
    }
    let next = 1 % state.agents.len();
    let candidates = legal_root_moves(state);

    let results: Vec<(Direction, Option<i32>, u64)> = candidates
        .par_iter()
        .map(|&(dir, target)| {
            let mut local = state.clone();
            let mut searcher = Searcher::new(scores, limits);
            let undo = local.apply_move(0, target);
            let value = searcher.minimax(&mut local, next, i32::MIN, i32::MAX, 1);
            local.undo_move(undo);
            simple_profiler::merge_thread_local();
            let value = if searcher.aborted { None } else { Some(value) };
            (dir, value, searcher.nodes)
        })
        .collect();

    let mut best: Option<(i32, Direction)> = None;
    for &(dir, value, _) in &results {
        if let Some(value) = value {
            if best.map_or(true, |(b, _)| value > b) {
                best = Some((value, dir));
            }
        }
    }

    let (score, direction) = best.unwrap_or((scores.score_loss, candidates[0].0));
    SearchOutcome {
        direction,
        score,
        depth: limits.max_depth,
        nodes: results.iter().map(|r| r.2).sum(),
        completed: results.iter().all(|r| r.1.is_some()),
    }
}

/// Deepens one round at a time until the deadline, the depth cap, or a
/// decided outcome. `on_iteration` sees every published result: each
/// completed iteration, plus a partial first iteration if nothing completed.
pub fn iterative_deepening<F>(
    state: &mut BoardState,
    config: &Config,
    strategy: RootStrategy,
    deadline: Option<Instant>,
    mut on_iteration: F,
) -> SearchOutcome
where
    F: FnMut(&SearchOutcome),
{
    let step = state.survivor_count.max(1) as u32;
    let max_depth = config.timing.max_search_depth.max(1);
    let mut depth = config.timing.initial_depth.clamp(1, max_depth);
    let mut last: Option<SearchOutcome> = None;

    loop {
        if let (Some(deadline), Some(_)) = (deadline, last) {
            let remaining = deadline.saturating_duration_since(Instant::now()).as_millis() as u64;
            if remaining < config.timing.min_time_remaining_ms {
                debug!("Stopping search: insufficient time remaining ({}ms)", remaining);
                break;
            }
        }

        let limits = SearchLimits { max_depth: depth, deadline };
        let outcome = match strategy {
            RootStrategy::Sequential => decide_move(state, &config.scores, limits),
            RootStrategy::ParallelRoot => decide_move_parallel(state, &config.scores, limits),
        };

        if !outcome.completed {
            if last.is_none() {
                on_iteration(&outcome);
                last = Some(outcome);
            }
            debug!("Depth {} aborted after {} nodes", depth, outcome.nodes);
            break;
        }

        on_iteration(&outcome);
        last = Some(outcome);
        debug!(
            "Depth {} complete: {} (score {}, {} nodes)",
            depth, outcome.direction, outcome.score, outcome.nodes
        );

        let decided = outcome.score == config.scores.score_win || outcome.score == config.scores.score_loss;
        if outcome.nodes == 0 || decided || depth >= max_depth {
            break;
        }
        depth = (depth + step).min(max_depth);
    }

    last.unwrap_or(SearchOutcome {
        direction: first_legal_move(state),
        score: config.scores.score_loss,
        depth: 0,
        nodes: 0,
        completed: false,
    })
}
