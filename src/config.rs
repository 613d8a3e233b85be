// Snake.toml: time budget, search depth, root strategy, evaluation weights
// and the health rules simulated during search. Every table is required; a
// missing or unreadable file falls back to the built-in values below, which
// mirror the shipped Snake.toml.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::board::RoundRules;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub strategy: StrategyConfig,
    pub scores: ScoresConfig,
    pub game_rules: GameRulesConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
    pub polling_interval_ms: u64,
    /// Depth of the first iterative-deepening pass, in plies
    pub initial_depth: u32,
    /// Hard ply cap; leaves are evaluated at the first round boundary at or past it
    pub max_search_depth: u32,
    pub min_time_remaining_ms: u64,
}

impl TimingConfig {
    /// Response budget minus the network allowance
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }

    /// Effective budget, further capped by the game's own move timeout
    pub fn budget_for_game_ms(&self, game_timeout_ms: u32) -> u64 {
        let game_budget = (game_timeout_ms as u64).saturating_sub(self.network_overhead_ms);
        if game_timeout_ms == 0 {
            self.effective_budget_ms()
        } else {
            self.effective_budget_ms().min(game_budget)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    pub parallel_root: bool,
    pub min_cpus_for_parallel: usize,
}

/// Composite weights, plus the two terminal scores the search treats as decided
#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    pub score_win: i32,
    pub score_loss: i32,

    pub weight_length: i32,
    pub weight_food_healthy: i32,
    pub weight_food_hungry: i32,
    pub weight_survivor: i32,
    pub weight_space: i32,
    pub weight_tail_healthy: i32,
    pub weight_tail_hungry: i32,
    pub tail_baseline: i32,

    /// At or below this health the hungry weights apply
    pub hunger_threshold: i32,
}

/// Game rules simulated during search
#[derive(Debug, Deserialize, Clone)]
pub struct GameRulesConfig {
    pub health_on_food: i32,
    pub health_loss_per_turn: i32,
}

impl GameRulesConfig {
    pub fn round_rules(&self) -> RoundRules {
        RoundRules {
            health_on_food: self.health_on_food,
            health_loss_per_turn: self.health_loss_per_turn,
        }
    }
}

/// Per-decision JSONL log
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        toml::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Snake.toml in the working directory
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 50,
                polling_interval_ms: 10,
                initial_depth: 2,
                max_search_depth: 12,
                min_time_remaining_ms: 20,
            },
            strategy: StrategyConfig {
                parallel_root: true,
                min_cpus_for_parallel: 2,
            },
            scores: ScoresConfig {
                score_win: 1_000_000,
                score_loss: -1_000_000,
                weight_length: 20,
                weight_food_healthy: 30,
                weight_food_hungry: 50,
                weight_survivor: 10,
                weight_space: 40,
                weight_tail_healthy: 50,
                weight_tail_hungry: 30,
                tail_baseline: 10,
                hunger_threshold: 50,
            },
            game_rules: GameRulesConfig {
                health_on_food: 100,
                health_loss_per_turn: 1,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}
