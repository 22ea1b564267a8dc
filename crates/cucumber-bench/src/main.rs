use std::path::PathBuf;

use clap::Parser;

use cucumber_bench::analysis::AnalysisRunner;
use cucumber_bench::config::{AnalysisConfig, ResolvedOutputs};
use cucumber_bench::logging::init_logging;

/// Position analysis harness for Cucumber.
#[derive(Debug, Parser)]
#[command(
    name = "cucumber-bench",
    author,
    version,
    about = "Deterministic Monte Carlo analysis of Cucumber positions"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the deal seed string.
    #[arg(long, value_name = "SEED")]
    seed: Option<String>,

    /// Override the number of Monte Carlo runs.
    #[arg(long, value_name = "RUNS")]
    runs: Option<usize>,

    /// Exit after validating the configuration (no analysis is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AnalysisConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.deal.seed = seed;
    }

    if let Some(runs) = cli.runs {
        config.valuation.runs = runs;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let deal = &config.deal;

    println!(
        "Loaded configuration '{run_id}': seed \"{}\", {} players x {} cards, {} opening play{}",
        deal.seed,
        deal.players,
        deal.cards,
        deal.opening_plays,
        if deal.opening_plays == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: analysis skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = AnalysisRunner::new(config, outputs);
    let summary = runner.run()?;

    println!("{}", summary.position);
    match (summary.value, summary.ci95_half_width) {
        (Some(value), Some(half_width)) => println!(
            "Value for player {}: {value:.4} ± {half_width:.4} ({} of {} runs accepted)",
            summary.anchor + 1,
            summary.runs,
            summary.requested_runs
        ),
        (Some(value), None) => println!(
            "Value for player {}: {value:.4} ({} of {} runs accepted)",
            summary.anchor + 1,
            summary.runs,
            summary.requested_runs
        ),
        (None, _) => println!(
            "No consistent sample in {} runs for player {}",
            summary.requested_runs,
            summary.anchor + 1
        ),
    }
    if let Some(best) = summary.best_move.as_ref() {
        println!(
            "Best move: {} (hand index {}) at {:.4}",
            best.rank,
            best.index,
            best.value().unwrap_or_default()
        );
    }
    println!(
        "Analysis complete for '{run_id}': {} rows at {}",
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
