// Board state used by the search
//
// Built once per turn from the API snapshot, then mutated in place by the
// simulator and the round resolver. Agent 0 is always our snake and the
// agent order never changes while a decision is being computed.

use std::collections::VecDeque;

use crate::cell::{CellTag, Grid};
use crate::types::{Battlesnake, Board, Coord};

/// Health rules applied when a round is reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRules {
    pub health_on_food: i32,
    pub health_loss_per_turn: i32,
}

impl Default for RoundRules {
    fn default() -> Self {
        RoundRules {
            health_on_food: 100,
            health_loss_per_turn: 1,
        }
    }
}

/// A snake as seen by the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: String,
    pub health: i32,
    /// Head at the front, tail at the back
    pub body: VecDeque<Coord>,
    pub alive: bool,
}

impl Agent {
    pub fn new(id: impl Into<String>, health: i32, body: impl IntoIterator<Item = Coord>) -> Self {
        Agent {
            id: id.into(),
            health,
            body: body.into_iter().collect(),
            alive: true,
        }
    }

    pub fn head(&self) -> Coord {
        debug_assert!(!self.body.is_empty(), "agent {} has no body", self.id);
        self.body[0]
    }

    pub fn tail(&self) -> Coord {
        debug_assert!(!self.body.is_empty(), "agent {} has no body", self.id);
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub width: i32,
    pub height: i32,
    /// Merged, authoritative view
    pub grid: Grid,
    pub agents: Vec<Agent>,
    pub food: Vec<Coord>,
    /// Parallel to `food`: the agent that ate each item during the search
    pub eaten: Vec<Option<usize>>,
    pub hazards: Vec<Coord>,
    /// One private view per agent, written by tentative moves before the
    /// round is reconciled
    pub agent_grids: Vec<Grid>,
    pub survivor_count: usize,
    pub rules: RoundRules,
}

impl BoardState {
    /// Builds the state and paints the grid.
    ///
    /// Paint order is significant: each agent's body, then its head, then its
    /// tail; after all agents, food, then hazards. Whatever is written last
    /// wins a shared square.
    pub fn new(
        width: i32,
        height: i32,
        agents: Vec<Agent>,
        food: Vec<Coord>,
        hazards: Vec<Coord>,
    ) -> Self {
        let mut grid = Grid::new(width, height);

        for (idx, agent) in agents.iter().enumerate() {
            let own = idx == 0;
            for &part in &agent.body {
                grid.set(part, CellTag::body(own));
            }
            grid.set(agent.head(), CellTag::head(own));
            grid.set(agent.tail(), CellTag::tail(own));
        }
        for &f in &food {
            grid.set(f, CellTag::Food);
        }
        for &h in &hazards {
            grid.set(h, CellTag::Hazard);
        }

        let agent_grids = vec![grid.clone(); agents.len()];
        let survivor_count = agents.iter().filter(|a| a.alive).count();
        let eaten = vec![None; food.len()];

        BoardState {
            width,
            height,
            grid,
            agents,
            food,
            eaten,
            hazards,
            agent_grids,
            survivor_count,
            rules: RoundRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: RoundRules) -> Self {
        self.rules = rules;
        self
    }

    /// Converts an API snapshot into a search state with `you` at index 0.
    ///
    /// Rejects snapshots the core cannot work with: non-positive dimensions,
    /// an empty body, or anything placed off the board.
    pub fn from_snapshot(board: &Board, you: &Battlesnake) -> Result<Self, String> {
        if board.width <= 0 || board.height <= 0 {
            return Err(format!(
                "Invalid board dimensions {}x{}",
                board.width, board.height
            ));
        }

        let in_bounds =
            |c: &Coord| c.x >= 0 && c.x < board.width && c.y >= 0 && c.y < board.height;

        let mut agents = Vec::with_capacity(board.snakes.len() + 1);
        let ordered = std::iter::once(you).chain(board.snakes.iter().filter(|s| s.id != you.id));
        for snake in ordered {
            if snake.body.is_empty() {
                return Err(format!("Snake '{}' has an empty body", snake.id));
            }
            if let Some(c) = snake.body.iter().find(|c| !in_bounds(c)) {
                return Err(format!("Snake '{}' has a segment off the board at {:?}", snake.id, c));
            }
            agents.push(Agent::new(snake.id.clone(), snake.health, snake.body.iter().copied()));
        }

        if let Some(c) = board.food.iter().chain(board.hazards.iter()).find(|c| !in_bounds(c)) {
            return Err(format!("Food or hazard off the board at {:?}", c));
        }

        Ok(BoardState::new(
            board.width,
            board.height,
            agents,
            board.food.clone(),
            board.hazards.clone(),
        ))
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        self.grid.in_bounds(coord)
    }

    /// Static legality check against the shared grid. Caller checks bounds.
    pub fn is_safe(&self, coord: Coord) -> bool {
        self.grid.get(coord).is_safe()
    }

    pub fn is_legal(&self, coord: Coord) -> bool {
        self.in_bounds(coord) && self.is_safe(coord)
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    /// Marks an agent dead without touching the grids. Returns false if it
    /// was already dead.
    pub fn eliminate(&mut self, agent_index: usize) -> bool {
        let agent = &mut self.agents[agent_index];
        if !agent.alive {
            return false;
        }
        agent.alive = false;
        self.survivor_count -= 1;
        true
    }

    /// Reverses `eliminate`
    pub fn revive(&mut self, agent_index: usize) {
        let agent = &mut self.agents[agent_index];
        if !agent.alive {
            agent.alive = true;
            self.survivor_count += 1;
        }
    }

    pub fn debug_check_invariants(&self) {
        debug_assert_eq!(self.survivor_count, self.alive_count(), "survivor count drifted");
        debug_assert!(self.agents.iter().all(|a| !a.is_empty()), "agent with empty body");
        debug_assert_eq!(self.agent_grids.len(), self.agents.len());
        debug_assert_eq!(self.eaten.len(), self.food.len());
    }
}
