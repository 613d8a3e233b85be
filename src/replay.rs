// Offline re-run of logged decisions
//
// Reads the JSONL file written by the debug logger and asks the engine again
// for every logged board, with no deadline and the sequential root. A turn
// agrees when the recomputed move equals the logged one.

use std::fs;
use std::path::Path;

use crate::board::BoardState;
use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::LogEntry;
use crate::search::{RootStrategy, SearchOutcome};
use crate::types::{Battlesnake, Direction};

#[derive(Debug, Clone)]
pub struct Replayed {
    pub turn: i32,
    pub logged: Direction,
    pub recomputed: SearchOutcome,
}

impl Replayed {
    pub fn agrees(&self) -> bool {
        self.logged == self.recomputed.direction
    }
}

/// Parses a log file. Blank lines are skipped; the first bad line fails the
/// whole read with its 1-based line number.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<LogEntry>, String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<LogEntry>(line).map_err(|e| format!("line {}: {}", n + 1, e))
        })
        .collect()
}

/// The snake the entry was logged for. Logs without an id mean the first one.
fn logged_snake(entry: &LogEntry) -> Result<&Battlesnake, String> {
    let snakes = &entry.board.snakes;
    let found = if entry.you_id.is_empty() {
        snakes.first()
    } else {
        snakes.iter().find(|s| s.id == entry.you_id)
    };
    found.ok_or_else(|| format!("turn {}: snake '{}' not on the board", entry.turn, entry.you_id))
}

/// Recomputes a single logged decision
pub fn rerun(entry: &LogEntry, config: &Config) -> Result<Replayed, String> {
    let logged = Direction::parse(&entry.chosen_move).map_err(|e| format!("turn {}: {}", entry.turn, e))?;
    let you = logged_snake(entry)?;
    let mut state = BoardState::from_snapshot(&entry.board, you)
        .map_err(|e| format!("turn {}: {}", entry.turn, e))?
        .with_rules(config.game_rules.round_rules());

    let recomputed = Bot::compute_best_move(&mut state, config, RootStrategy::Sequential, None, |_| {});
    Ok(Replayed {
        turn: entry.turn,
        logged,
        recomputed,
    })
}

/// Recomputes the whole log, or only `turns` when given. Asking for a turn
/// the log does not contain is an error.
pub fn rerun_log(entries: &[LogEntry], config: &Config, turns: Option<&[i32]>) -> Result<Vec<Replayed>, String> {
    if let Some(turns) = turns {
        if let Some(missing) = turns.iter().find(|t| !entries.iter().any(|e| e.turn == **t)) {
            return Err(format!("turn {} is not in the log", missing));
        }
    }

    entries
        .iter()
        .filter(|e| turns.map_or(true, |t| t.contains(&e.turn)))
        .map(|e| rerun(e, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Board, Coord};

    fn snake(id: &str) -> Battlesnake {
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health: 90,
            body: vec![Coord::new(1, 1)],
            head: Coord::new(1, 1),
            length: 1,
            latency: "0".to_string(),
            shout: None,
        }
    }

    fn entry(you_id: &str) -> LogEntry {
        LogEntry {
            turn: 4,
            game_id: String::new(),
            you_id: you_id.to_string(),
            chosen_move: "up".to_string(),
            score: 0,
            depth: 0,
            board: Board {
                height: 7,
                width: 7,
                food: vec![],
                snakes: vec![snake("a"), snake("b")],
                hazards: vec![],
            },
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_logged_snake_by_id_or_first() {
        assert_eq!(logged_snake(&entry("b")).map(|s| s.id.as_str()), Ok("b"));
        assert_eq!(logged_snake(&entry("")).map(|s| s.id.as_str()), Ok("a"));
        assert!(logged_snake(&entry("ghost")).is_err());
    }

    #[test]
    fn test_unparseable_move_is_an_error() {
        let mut e = entry("a");
        e.chosen_move = "sideways".to_string();
        let err = rerun(&e, &Config::default_hardcoded()).unwrap_err();
        assert!(err.starts_with("turn 4"), "{}", err);
    }
}
