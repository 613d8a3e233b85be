// Re-runs a decision log through the engine and prints where it disagrees
//
//   replay <log.jsonl> [--config Snake.toml] [--turn N]...
//
// Exits with 1 when any turn disagrees, 2 on bad input.

use std::process;

use minimax_snake::config::Config;
use minimax_snake::replay::{read_log, rerun_log};

struct Args {
    log: String,
    config: Option<String>,
    turns: Vec<i32>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut log = None;
    let mut config = None;
    let mut turns = Vec::new();

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" => config = Some(raw.next().ok_or("--config needs a path")?),
            "--turn" => {
                let value = raw.next().ok_or("--turn needs a number")?;
                turns.push(value.parse().map_err(|_| format!("bad turn '{}'", value))?);
            }
            _ if log.is_none() && !arg.starts_with("--") => log = Some(arg),
            _ => return Err(format!("unexpected argument '{}'", arg)),
        }
    }

    Ok(Args {
        log: log.ok_or("missing log file")?,
        config,
        turns,
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\nusage: replay <log.jsonl> [--config Snake.toml] [--turn N]...", e);
            process::exit(2);
        }
    };

    let config = match &args.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(2);
        }),
        None => Config::load_or_default(),
    };

    let turns = if args.turns.is_empty() { None } else { Some(args.turns.as_slice()) };
    let results = read_log(&args.log).and_then(|entries| rerun_log(&entries, &config, turns));
    let results = match results {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{}: {}", args.log, e);
            process::exit(2);
        }
    };

    let mut disagreements = 0;
    for r in &results {
        let mark = if r.agrees() { "ok " } else { "DIFF" };
        if !r.agrees() {
            disagreements += 1;
        }
        println!(
            "{} turn {:>4}: logged {:<5} now {:<5} (score {}, depth {}, {} nodes)",
            mark, r.turn, r.logged, r.recomputed.direction, r.recomputed.score, r.recomputed.depth, r.recomputed.nodes
        );
    }
    println!("{} of {} turns agree", results.len() - disagreements, results.len());

    if disagreements > 0 {
        process::exit(1);
    }
}
