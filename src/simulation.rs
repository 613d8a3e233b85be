// Move simulator
//
// A tentative move only touches the moving agent's body and its private
// grid. The shared grid is left alone until the round resolver reconciles
// every agent's move. Undo must be called in exact reverse order of apply.

use crate::board::BoardState;
use crate::cell::{CellTag, Grid};
use crate::types::Coord;

/// Everything needed to reverse one `apply_move`
#[derive(Debug)]
#[must_use = "every applied move has to be undone"]
pub struct MoveUndo {
    agent: usize,
    old_tail: Coord,
    grid: Grid,
    tail_moved: bool,
}

impl MoveUndo {
    pub fn tail_moved(&self) -> bool {
        self.tail_moved
    }
}

impl BoardState {
    /// Moves `agent_index`'s head to `new_head` in its private view.
    ///
    /// If the destination holds food (in that agent's view) the snake grows
    /// and the tail stays; otherwise the tail square is vacated.
    pub fn apply_move(&mut self, agent_index: usize, new_head: Coord) -> MoveUndo {
        let own = agent_index == 0;
        let grid = &mut self.agent_grids[agent_index];
        let body = &mut self.agents[agent_index].body;
        debug_assert!(!body.is_empty());

        let saved = grid.clone();
        let ate = grid.get(new_head) == CellTag::Food;
        let old_tail = body[body.len() - 1];

        if !ate {
            body.pop_back();
            if !body.contains(&old_tail) {
                grid.set(old_tail, CellTag::Empty);
            }
        }
        if let Some(&neck) = body.front() {
            grid.set(neck, CellTag::body(own));
        }
        if !ate {
            if let Some(&tail) = body.back() {
                grid.set(tail, CellTag::tail(own));
            }
        }
        body.push_front(new_head);
        grid.set(new_head, CellTag::head(own));

        MoveUndo {
            agent: agent_index,
            old_tail,
            grid: saved,
            tail_moved: !ate,
        }
    }

    /// Reverses the matching `apply_move`
    pub fn undo_move(&mut self, undo: MoveUndo) {
        let body = &mut self.agents[undo.agent].body;
        body.pop_front();
        if undo.tail_moved {
            body.push_back(undo.old_tail);
        }
        self.agent_grids[undo.agent] = undo.grid;
    }
}
