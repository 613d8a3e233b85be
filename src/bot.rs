// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// The Bot ties the API endpoints to the decision engine: it keeps per-game
// sessions, turns each snapshot into a BoardState, and runs the search on a
// blocking thread while the request handler polls for the best answer so far.

use log::{info, warn};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::BoardState;
use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::search::{self, RootStrategy, SearchOutcome, DEFAULT_DIRECTION};
use crate::session::SessionStore;
use crate::simple_profiler;
use crate::types::{Battlesnake, Board, Direction, Game};

/// Lock-free shared state for communication between async poller and computation engine
#[derive(Debug)]
pub struct SharedSearchState {
    /// Best move found so far (encoded as direction index)
    best_move: AtomicU8,
    /// Best score for our snake
    best_score: AtomicI32,
    /// Flag indicating search completion
    search_complete: AtomicBool,
    /// Depth of the last published iteration
    current_depth: AtomicU32,
}

impl SharedSearchState {
    /// Creates a new shared state seeded with a move that is safe to answer
    /// before any iteration has finished
    pub fn new(initial_move: Direction) -> Self {
        SharedSearchState {
            best_move: AtomicU8::new(initial_move.to_index()),
            best_score: AtomicI32::new(i32::MIN),
            search_complete: AtomicBool::new(false),
            current_depth: AtomicU32::new(0),
        }
    }

    pub fn publish(&self, outcome: &SearchOutcome) {
        self.best_move
            .store(outcome.direction.to_index(), Ordering::Release);
        self.best_score.store(outcome.score, Ordering::Release);
        self.current_depth.store(outcome.depth, Ordering::Release);
    }

    pub fn mark_complete(&self) {
        self.search_complete.store(true, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.search_complete.load(Ordering::Acquire)
    }

    /// (move, score, depth) as last published
    pub fn get_best(&self) -> (Direction, i32, u32) {
        (
            Direction::from_index(self.best_move.load(Ordering::Acquire)),
            self.best_score.load(Ordering::Acquire),
            self.current_depth.load(Ordering::Acquire),
        )
    }
}

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    sessions: SessionStore,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Self::with_debug_logger(config, DebugLogger::disabled())
    }

    pub fn with_debug_logger(config: Config, debug_logger: DebugLogger) -> Self {
        Bot {
            config,
            sessions: SessionStore::new(),
            debug_logger,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "minimax-snake",
            "color": "#FF0000",
            "head": "all-seeing",
            "tail": "curled",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, board: &Board, you: &Battlesnake) {
        let session = self.sessions.open(game, board, you);
        info!(
            "GAME START {} ({}x{}, timeout {}ms)",
            session.game_id, session.width, session.height, session.timeout_ms
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        match self.sessions.close(&game.id) {
            Some(session) => info!(
                "GAME OVER {} at turn {} ({} moves answered)",
                game.id, turn, session.turns_seen
            ),
            None => info!("GAME OVER {} at turn {} (no session)", game.id, turn),
        }
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// 1. Builds the search state from the snapshot
    /// 2. Spawns iterative deepening on a blocking thread
    /// 3. Polls until the budget runs out or the search finishes, then answers
    ///    with the deepest completed result (anytime property)
    pub async fn get_move(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Value {
        let start_time = Instant::now();

        info!("Turn {}: Computing move", turn);
        let session = self.sessions.observe(game, board, you);

        let state = match BoardState::from_snapshot(board, you) {
            Ok(state) => state.with_rules(self.config.game_rules.round_rules()),
            Err(e) => {
                warn!("Turn {}: rejected snapshot ({}), answering {}", turn, e, DEFAULT_DIRECTION);
                return json!({ "move": DEFAULT_DIRECTION.as_str() });
            }
        };

        let budget_ms = self.config.timing.budget_for_game_ms(session.timeout_ms);
        let deadline = start_time + Duration::from_millis(budget_ms);
        let strategy = Self::determine_strategy(
            state.survivor_count,
            rayon::current_num_threads(),
            &self.config,
        );

        let shared = Arc::new(SharedSearchState::new(search::first_legal_move(&state)));
        let shared_clone = shared.clone();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            Bot::compute_best_move_internal(state, shared_clone, deadline, strategy, &config)
        });

        let polling_interval = Duration::from_millis(self.config.timing.polling_interval_ms);
        loop {
            tokio::time::sleep(polling_interval).await;

            let elapsed = start_time.elapsed().as_millis() as u64;
            if elapsed >= budget_ms || shared.is_complete() {
                break;
            }
        }

        let (chosen_move, final_score, final_depth) = shared.get_best();

        info!(
            "Turn {}: Chose {} (score: {}, depth: {}, time: {}ms)",
            turn,
            chosen_move.as_str(),
            final_score,
            final_depth,
            start_time.elapsed().as_millis()
        );

        self.sessions.record_move(&game.id, chosen_move);
        self.debug_logger.log_move(DebugLogger::entry(
            *turn,
            &game.id,
            &you.id,
            chosen_move,
            final_score,
            final_depth,
            board.clone(),
        ));

        json!({ "move": chosen_move.as_str() })
    }

    /// Runs on the blocking pool and publishes every iteration
    fn compute_best_move_internal(
        mut state: BoardState,
        shared: Arc<SharedSearchState>,
        deadline: Instant,
        strategy: RootStrategy,
        config: &Config,
    ) {
        Self::compute_best_move(&mut state, config, strategy, Some(deadline), |outcome| {
            shared.publish(outcome)
        });
        shared.mark_complete();
    }

    /// Synchronous search driver shared by the server and the replay tool
    pub fn compute_best_move<F>(
        state: &mut BoardState,
        config: &Config,
        strategy: RootStrategy,
        deadline: Option<Instant>,
        on_iteration: F,
    ) -> SearchOutcome
    where
        F: FnMut(&SearchOutcome),
    {
        let start = Instant::now();
        info!(
            "Starting search: {:?}, {} snakes alive",
            strategy, state.survivor_count
        );

        let outcome = search::iterative_deepening(state, config, strategy, deadline, on_iteration);

        info!(
            "Search complete. Best move: {}, Score: {}, Depth: {}, Nodes: {}",
            outcome.direction, outcome.score, outcome.depth, outcome.nodes
        );

        simple_profiler::merge_thread_local();
        simple_profiler::print_report(start.elapsed().as_millis() as u64);
        simple_profiler::reset();

        outcome
    }

    /// Determines the root strategy based on game state and hardware
    pub fn determine_strategy(num_snakes: usize, num_cpus: usize, config: &Config) -> RootStrategy {
        if config.strategy.parallel_root
            && num_snakes >= 2
            && num_cpus >= config.strategy.min_cpus_for_parallel
        {
            RootStrategy::ParallelRoot
        } else {
            RootStrategy::Sequential
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_strategy() {
        let mut config = Config::default_hardcoded();
        assert_eq!(Bot::determine_strategy(2, 8, &config), RootStrategy::ParallelRoot);
        assert_eq!(Bot::determine_strategy(2, 1, &config), RootStrategy::Sequential);
        assert_eq!(Bot::determine_strategy(1, 8, &config), RootStrategy::Sequential);

        config.strategy.parallel_root = false;
        assert_eq!(Bot::determine_strategy(4, 8, &config), RootStrategy::Sequential);
    }

    #[test]
    fn test_shared_state_publishes_latest_iteration() {
        let shared = SharedSearchState::new(Direction::Left);
        assert_eq!(shared.get_best().0, Direction::Left);

        shared.publish(&SearchOutcome {
            direction: Direction::Right,
            score: 42,
            depth: 4,
            nodes: 100,
            completed: true,
        });
        assert_eq!(shared.get_best(), (Direction::Right, 42, 4));
        assert!(!shared.is_complete());
        shared.mark_complete();
        assert!(shared.is_complete());
    }
}
