// Debug logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the main request/response cycle. Each decision is written as one line of
// a JSONL file, which the replay tool can read back.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::{Board, Direction};

/// One logged decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: i32,
    #[serde(default)]
    pub game_id: String,
    /// Empty in hand-written logs; replay then takes the first snake
    #[serde(default)]
    pub you_id: String,
    pub chosen_move: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub depth: u32,
    pub board: Board,
    #[serde(default)]
    pub timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Builds the entry for a decision, stamped with the current time
    #[allow(clippy::too_many_arguments)]
    pub fn entry(
        turn: i32,
        game_id: &str,
        you_id: &str,
        chosen_move: Direction,
        score: i32,
        depth: u32,
        board: Board,
    ) -> LogEntry {
        LogEntry {
            turn,
            game_id: game_id.to_string(),
            you_id: you_id.to_string(),
            chosen_move: chosen_move.as_str().to_string(),
            score,
            depth,
            board,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Logs a decision asynchronously (fire-and-forget)
    /// This spawns a tokio task that writes to the file without blocking
    pub fn log_move(&self, entry: LogEntry) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();
        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    /// Writes one entry and waits for it to reach the file
    pub async fn log_move_now(&self, entry: LogEntry) {
        if self.enabled {
            Self::write_entry(self.file.clone(), entry).await;
        }
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: LogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
