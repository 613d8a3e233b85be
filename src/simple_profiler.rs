//! Simple profiling using thread-local counters
//!
//! Lightweight timing without changing function signatures.
//! Enable with environment variable: BATTLESNAKE_PROFILE=1

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

const CATEGORIES: [&str; 4] = ["apply_move", "combine", "eval", "search"];

thread_local! {
    static TIME_NS: RefCell<[u64; 4]> = RefCell::new([0; 4]);
    static CALLS: RefCell<[u64; 4]> = RefCell::new([0; 4]);
    static CUTOFFS: RefCell<u64> = RefCell::new(0);
}

// Global aggregators
static GLOBAL_TIME_NS: [AtomicU64; 4] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];
static GLOBAL_CALLS: [AtomicU64; 4] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];
static GLOBAL_CUTOFFS: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn is_profiling_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("BATTLESNAKE_PROFILE").is_ok())
}

fn category_index(category: &str) -> Option<usize> {
    CATEGORIES.iter().position(|&c| c == category)
}

pub struct ProfileGuard {
    start: Instant,
    category: usize,
}

impl ProfileGuard {
    pub fn new(category: &'static str) -> Option<Self> {
        if !is_profiling_enabled() {
            return None;
        }
        category_index(category).map(|category| ProfileGuard {
            start: Instant::now(),
            category,
        })
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        let idx = self.category;
        TIME_NS.with(|t| t.borrow_mut()[idx] += elapsed_ns);
        CALLS.with(|c| c.borrow_mut()[idx] += 1);
    }
}

#[inline]
pub fn record_alpha_beta_cutoff() {
    if is_profiling_enabled() {
        CUTOFFS.with(|c| *c.borrow_mut() += 1);
    }
}

/// Moves this thread's counters into the global totals
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    TIME_NS.with(|t| {
        let mut t = t.borrow_mut();
        for (global, local) in GLOBAL_TIME_NS.iter().zip(t.iter_mut()) {
            global.fetch_add(*local, Ordering::Relaxed);
            *local = 0;
        }
    });
    CALLS.with(|c| {
        let mut c = c.borrow_mut();
        for (global, local) in GLOBAL_CALLS.iter().zip(c.iter_mut()) {
            global.fetch_add(*local, Ordering::Relaxed);
            *local = 0;
        }
    });
    CUTOFFS.with(|c| {
        GLOBAL_CUTOFFS.fetch_add(*c.borrow(), Ordering::Relaxed);
        *c.borrow_mut() = 0;
    });
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 PERFORMANCE PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    for (idx, name) in CATEGORIES.iter().enumerate() {
        let time = GLOBAL_TIME_NS[idx].load(Ordering::Relaxed);
        let calls = GLOBAL_CALLS[idx].load(Ordering::Relaxed);
        let pct = if total_ns > 0 { 100.0 * time as f64 / total_ns as f64 } else { 0.0 };
        let avg_us = if calls > 0 { time as f64 / (calls * 1000) as f64 } else { 0.0 };
        eprintln!(
            "{:<12} {:>9.2}ms ({:>5.1}%) - {} calls, {:.2}µs avg",
            name,
            time as f64 / 1_000_000.0,
            pct,
            calls,
            avg_us
        );
    }
    eprintln!("Cutoffs:     {}", GLOBAL_CUTOFFS.load(Ordering::Relaxed));
    eprintln!("═══════════════════════════════════════════════════════════\n");
}

pub fn reset() {
    for counter in GLOBAL_TIME_NS.iter().chain(GLOBAL_CALLS.iter()) {
        counter.store(0, Ordering::Relaxed);
    }
    GLOBAL_CUTOFFS.store(0, Ordering::Relaxed);
}
