// Round resolver
//
// Once every agent has made its tentative move, the private grids are
// reconciled into one consensus grid. All eliminations of a round are
// computed from the same post-move positions:
//   - a head on any surviving snake's non-head segment dies
//   - heads sharing a square: the strictly longest survives, equal longest all die
//   - health runs out (food resets it)
// Food eaten in a round is marked against the eater and no longer painted.
// The consensus is then copied back into every private grid.

use std::collections::HashMap;

use crate::board::{Agent, BoardState};
use crate::cell::{CellTag, Grid};
use crate::types::Coord;

/// Saved state from before a `combine_grids`
#[derive(Debug, Clone)]
#[must_use = "a saved round has to be restored"]
pub struct RoundSnapshot {
    grid: Grid,
    agent_grids: Vec<Grid>,
    agents: Vec<Agent>,
    eaten: Vec<Option<usize>>,
    survivor_count: usize,
}

impl BoardState {
    pub fn save_snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            grid: self.grid.clone(),
            agent_grids: self.agent_grids.clone(),
            agents: self.agents.clone(),
            eaten: self.eaten.clone(),
            survivor_count: self.survivor_count,
        }
    }

    pub fn restore_snapshot(&mut self, snapshot: RoundSnapshot) {
        self.grid = snapshot.grid;
        self.agent_grids = snapshot.agent_grids;
        self.agents = snapshot.agents;
        self.eaten = snapshot.eaten;
        self.survivor_count = snapshot.survivor_count;
    }

    /// Reconciles the round and rebuilds the shared grid
    pub fn combine_grids(&mut self) {
        let _guard = crate::simple_profiler::ProfileGuard::new("combine");

        let eliminated = self.round_eliminations();
        self.apply_health_rules();

        for (idx, dead) in eliminated.into_iter().enumerate() {
            if dead {
                self.agents[idx].alive = false;
            }
        }
        self.survivor_count = self.alive_count();

        self.repaint_shared_grid();
        for private in self.agent_grids.iter_mut() {
            private.clone_from(&self.grid);
        }
        self.debug_check_invariants();
    }

    /// Collision eliminations for the current head positions
    fn round_eliminations(&self) -> Vec<bool> {
        let mut eliminated = vec![false; self.agents.len()];
        let alive: Vec<usize> = (0..self.agents.len())
            .filter(|&i| self.agents[i].alive)
            .collect();

        for &i in &alive {
            let head = self.agents[i].head();
            let hit_body = alive
                .iter()
                .any(|&j| self.agents[j].body.iter().skip(1).any(|&c| c == head));
            if hit_body {
                eliminated[i] = true;
            }
        }

        let mut by_square: HashMap<Coord, Vec<usize>> = HashMap::new();
        for &i in &alive {
            by_square.entry(self.agents[i].head()).or_default().push(i);
        }
        for contenders in by_square.values().filter(|c| c.len() > 1) {
            let longest = contenders
                .iter()
                .map(|&i| self.agents[i].len())
                .max()
                .unwrap_or(0);
            let winners = contenders
                .iter()
                .filter(|&&i| self.agents[i].len() == longest)
                .count();
            for &i in contenders {
                if self.agents[i].len() < longest || winners > 1 {
                    eliminated[i] = true;
                }
            }
        }

        eliminated
    }

    /// Feeds or starves every surviving agent. A head counts as having eaten
    /// when the previous consensus showed food under it; the first agent in
    /// order claims the item.
    fn apply_health_rules(&mut self) {
        let rules = self.rules;
        for (idx, agent) in self.agents.iter_mut().enumerate().filter(|(_, a)| a.alive) {
            let head = agent.head();
            if self.grid.get(head) == CellTag::Food {
                agent.health = rules.health_on_food;
                let item = self
                    .food
                    .iter()
                    .zip(self.eaten.iter_mut())
                    .find(|(f, eater)| **f == head && eater.is_none());
                if let Some((_, eater)) = item {
                    *eater = Some(idx);
                }
            } else {
                agent.health -= rules.health_loss_per_turn;
                if agent.health <= 0 {
                    agent.alive = false;
                }
            }
        }
    }

    /// Background first (uneaten food, hazards), then surviving snakes on top
    fn repaint_shared_grid(&mut self) {
        self.grid.fill(CellTag::Empty);
        for (&f, eater) in self.food.iter().zip(&self.eaten) {
            if eater.is_none() {
                self.grid.set(f, CellTag::Food);
            }
        }
        for &h in &self.hazards {
            self.grid.set(h, CellTag::Hazard);
        }
        for (idx, agent) in self.agents.iter().enumerate().filter(|(_, a)| a.alive) {
            let own = idx == 0;
            for &part in &agent.body {
                self.grid.set(part, CellTag::body(own));
            }
            self.grid.set(agent.tail(), CellTag::tail(own));
            self.grid.set(agent.head(), CellTag::head(own));
        }
    }
}
