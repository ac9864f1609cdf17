use std::path::PathBuf;

use chronospatial::machine::Machine;
use chronospatial::program::{Program, Puzzle};
use chronospatial::quine::{QuineSearch, SearchConfig};
use clap::Parser;
use num_bigint::BigInt;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chronospatial",
    about = "Run a 3-bit register machine and search for a seed that makes it print its own program"
)]
struct Cli {
    /// Puzzle input: three register values followed by the program.
    input: PathBuf,

    /// Max instructions per machine run (unbounded if omitted).
    #[arg(long)]
    step_limit: Option<u64>,

    /// Print a disassembly of the program before running it.
    #[arg(long)]
    disassemble: bool,

    /// Only run the program; do not search for a self-reproducing seed.
    #[arg(long)]
    skip_search: bool,

    /// Run in benchmark mode: execute the program on random seeds and print
    /// throughput stats.
    #[arg(long)]
    benchmark: bool,

    /// Random seed for benchmark mode.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of machine runs in benchmark mode.
    #[arg(long, default_value_t = 1 << 14)]
    runs: usize,

    /// Log search progress (overridden by RUST_LOG).
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let text = match std::fs::read_to_string(&cli.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Cannot read {}: {e}", cli.input.display());
            std::process::exit(1);
        }
    };
    let puzzle = match Puzzle::parse(&text) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("Invalid input: {e}");
            std::process::exit(1);
        }
    };

    if cli.disassemble {
        eprint!("{}", puzzle.program.disassemble());
    }

    if cli.benchmark {
        run_benchmark(&puzzle.program, cli.seed, cli.runs, cli.step_limit);
        return;
    }

    let start = std::time::Instant::now();

    let mut machine = Machine::new(puzzle.registers, puzzle.program.clone());
    let result = match cli.step_limit {
        Some(limit) => machine.run_with_limit(limit),
        None => machine.run(),
    };
    if let Err(e) = result {
        eprintln!("Program failed: {e}");
        std::process::exit(1);
    }
    println!("Part 1: {}", machine.render_output());

    if !cli.skip_search {
        let config = SearchConfig {
            step_limit: cli.step_limit,
        };
        match QuineSearch::new(&puzzle.program, config).find() {
            Ok(outcome) => {
                println!("Part 2: {}", outcome.seed);
                tracing::info!(candidates = outcome.candidates_run, "search finished");
            }
            Err(e) => {
                println!("Part 2: no solution");
                tracing::warn!(%e, "search failed");
            }
        }
    }

    eprintln!("execution time: {:.3?}", start.elapsed());
}

fn run_benchmark(program: &Program, seed: u64, runs: usize, step_limit: Option<u64>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let digits = program.len().max(1);
    let mut machine = Machine::new(Default::default(), program.clone());

    let mut total_steps: u64 = 0;
    let mut failed: usize = 0;
    let start = std::time::Instant::now();
    for _ in 0..runs {
        // Random seed with one base-8 digit per program word.
        let mut a = BigInt::from(rng.gen_range(1u8..8));
        for _ in 1..digits {
            a = (a << 3u32) + BigInt::from(rng.gen_range(0u8..8));
        }
        machine.reset(a);
        let result = match step_limit {
            Some(limit) => machine.run_with_limit(limit),
            None => machine.run(),
        };
        match result {
            Ok(steps) => total_steps += steps,
            Err(_) => failed += 1,
        }
    }
    let elapsed = start.elapsed();

    let runs_per_sec = runs as f64 / elapsed.as_secs_f64();
    let steps_per_sec = total_steps as f64 / elapsed.as_secs_f64();

    eprintln!("Benchmark results:");
    eprintln!("  Runs:              {runs}");
    eprintln!("  Failed runs:       {failed}");
    eprintln!("  Program length:    {}", program.len());
    eprintln!("  Total steps:       {total_steps}");
    eprintln!("  Elapsed:           {elapsed:.2?}");
    eprintln!("  Runs/sec:          {runs_per_sec:.1}");
    eprintln!("  Steps/sec:         {steps_per_sec:.0}");
}
