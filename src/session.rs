// Per-game sessions
//
// Owned by the Bot and keyed by game id. /start opens a session, /end closes
// it, and /move opens one lazily because some callers (the board tester)
// never send /start. The store is bounded: when it is full, the game that
// went longest without a request is dropped.

use log::info;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::types::{Battlesnake, Board, Direction, Game};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub game_id: String,
    pub our_id: String,
    pub width: i32,
    pub height: i32,
    /// Move timeout announced by the game, in milliseconds
    pub timeout_ms: u32,
    pub turns_seen: u32,
    pub last_move: Option<Direction>,
    /// False when the session was created by a /move without a /start
    pub started: bool,
}

impl Session {
    fn new(game: &Game, board: &Board, you: &Battlesnake, started: bool) -> Self {
        Session {
            game_id: game.id.clone(),
            our_id: you.id.clone(),
            width: board.width,
            height: board.height,
            timeout_ms: game.timeout,
            turns_seen: 0,
            last_move: None,
            started,
        }
    }
}

/// Games that never send /end are dropped once this many sessions are open
pub const DEFAULT_SESSION_CAPACITY: usize = 64;

#[derive(Debug)]
struct Entry {
    session: Session,
    /// Store clock value at the last /start or /move for this game
    touched: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drops the least recently touched session if `game_id` would not fit
    fn make_room(&mut self, game_id: &str, capacity: usize) {
        if self.entries.contains_key(game_id) || self.entries.len() < capacity {
            return;
        }
        let stale = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(id, _)| id.clone());
        if let Some(id) = stale {
            info!("Session limit {} reached, dropping game {}", capacity, id);
            self.entries.remove(&id);
        }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<Sessions>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SessionStore {
            inner: Mutex::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Opens (or resets) the session for a game
    pub fn open(&self, game: &Game, board: &Board, you: &Battlesnake) -> Session {
        let session = Session::new(game, board, you, true);
        let mut inner = self.inner.lock();
        inner.make_room(&game.id, self.capacity);
        let touched = inner.tick();
        inner.entries.insert(
            game.id.clone(),
            Entry {
                session: session.clone(),
                touched,
            },
        );
        session
    }

    /// Counts a turn for the game, creating the session if none exists
    pub fn observe(&self, game: &Game, board: &Board, you: &Battlesnake) -> Session {
        let mut inner = self.inner.lock();
        inner.make_room(&game.id, self.capacity);
        let touched = inner.tick();
        let entry = inner.entries.entry(game.id.clone()).or_insert_with(|| {
            info!("No session for game {}, creating one", game.id);
            Entry {
                session: Session::new(game, board, you, false),
                touched,
            }
        });
        entry.touched = touched;
        entry.session.turns_seen += 1;
        entry.session.clone()
    }

    pub fn record_move(&self, game_id: &str, direction: Direction) {
        if let Some(entry) = self.inner.lock().entries.get_mut(game_id) {
            entry.session.last_move = Some(direction);
        }
    }

    pub fn get(&self, game_id: &str) -> Option<Session> {
        self.inner.lock().entries.get(game_id).map(|e| e.session.clone())
    }

    /// Tears the session down, returning its final state
    pub fn close(&self, game_id: &str) -> Option<Session> {
        self.inner.lock().entries.remove(game_id).map(|e| e.session)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
