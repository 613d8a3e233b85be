// Library exports for the minimax snake
// The server binary, the replay tool and the integration tests all share this engine

pub mod board;
pub mod bot;
pub mod cell;
pub mod config;
pub mod debug_logger;
pub mod evaluation;
pub mod replay;
pub mod resolver;
pub mod search;
pub mod session;
pub mod simple_profiler;
pub mod simulation;
pub mod types;
