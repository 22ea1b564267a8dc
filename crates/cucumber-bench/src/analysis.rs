use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cucumber_bot::PolicyKind;
use cucumber_core::game::snapshot::StateSnapshot;
use cucumber_core::game::state::{GameError, GameState};
use cucumber_core::model::rank::Rank;
use cucumber_core::policy::MovePolicy;
use cucumber_core::rng::SeededRng;
use cucumber_core::valuation::{MoveValue, ValuationError, evaluate_moves, valuate_monte_carlo};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AnalysisConfig, ResolvedOutputs};

/// Deals the configured position, values it and streams report rows.
pub struct AnalysisRunner {
    config: AnalysisConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub position: String,
    pub anchor: usize,
    pub requested_runs: usize,
    pub runs: usize,
    pub value: Option<f64>,
    pub ci95_half_width: Option<f64>,
    pub best_move: Option<MoveValue>,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum RowKind {
    Position,
    Move,
}

#[derive(Debug, Serialize)]
struct AnalysisRow<'a> {
    run_id: &'a str,
    kind: RowKind,
    seed: &'a str,
    anchor: usize,
    cross_player: bool,
    position: &'a str,
    verbose: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    card: Option<Rank>,
    requested_runs: usize,
    runs: usize,
    total: f64,
    value: Option<f64>,
    ci95_half_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a StateSnapshot>,
}

impl AnalysisRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: AnalysisConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Deals the position and applies the opening plays.
    pub fn prepare_position(&self) -> Result<GameState, RunnerError> {
        let deal = &self.config.deal;
        let mut state = GameState::deal(
            &deal.seed,
            deal.players,
            deal.cards,
            deal.first_player,
            deal.deck(),
        )?;
        let mut policy = deal.opening_policy.build(&format!("{}-opening", deal.seed));

        for play in 0..deal.opening_plays {
            let moves = state.possible_moves();
            let chosen = match moves.as_slice() {
                [] => return Err(RunnerError::NoOpeningMove { play }),
                [only] => *only,
                _ => policy
                    .choose_move(&state, &moves)
                    .filter(|chosen| moves.contains(chosen))
                    .ok_or(RunnerError::OpeningDeclined {
                        policy: deal.opening_policy,
                        play,
                    })?,
            };
            let player = state.active();
            let rank = state.play_card(chosen)?;
            event!(
                target: "cucumber_bench::analysis",
                Level::DEBUG,
                play,
                player,
                index = chosen,
                card = %rank,
                position = %state,
                "opening play"
            );
        }
        Ok(state)
    }

    /// Execute the analysis, writing JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);

        let state = self.prepare_position()?;
        let valuation = &self.config.valuation;
        let seed = self.config.valuation_seed();
        let options = valuation.options();
        let anchor = options.anchor.unwrap_or(state.active());
        let mut rollout = valuation
            .rollout_policy
            .map(|kind| kind.build(&format!("{seed}-rollout")));

        let mut rng = SeededRng::from_seed_str(seed);
        let result = valuate_monte_carlo(&state, &mut rng, &options, as_policy(&mut rollout))?;

        let compact = state.to_string();
        let verbose = state.verbose();
        let snapshot = StateSnapshot::capture(&state);
        let (runs, total, value, std_error) = match &result {
            Some(result) => (
                result.runs,
                result.total,
                Some(result.value),
                result.std_error(),
            ),
            None => (0, 0.0, None, None),
        };
        let interval = ci95_half_width(std_error);

        let position_row = AnalysisRow {
            run_id: &self.config.run_id,
            kind: RowKind::Position,
            seed,
            anchor,
            cross_player: options.cross_player,
            position: &compact,
            verbose: &verbose,
            move_index: None,
            card: None,
            requested_runs: valuation.runs,
            runs,
            total,
            value,
            ci95_half_width: interval,
            snapshot: Some(&snapshot),
        };
        write_row(&mut writer, &position_row)?;
        let mut rows_written = 1usize;

        let mut best_move = None;
        if valuation.evaluate_moves {
            let evaluation = evaluate_moves(
                &state,
                seed,
                valuation.move_runs,
                as_policy(&mut rollout),
            )?;
            for candidate in &evaluation.moves {
                let row = AnalysisRow {
                    run_id: &self.config.run_id,
                    kind: RowKind::Move,
                    seed,
                    anchor: evaluation.player,
                    cross_player: true,
                    position: &compact,
                    verbose: &verbose,
                    move_index: Some(candidate.index),
                    card: Some(candidate.rank),
                    requested_runs: valuation.move_runs,
                    runs: candidate.runs,
                    total: candidate.total,
                    value: candidate.value(),
                    ci95_half_width: ci95_half_width(candidate.std_error()),
                    snapshot: None,
                };
                write_row(&mut writer, &row)?;
                rows_written += 1;
            }
            best_move = evaluation.best().cloned();
        }

        writer.flush()?;

        event!(
            target: "cucumber_bench::analysis",
            Level::INFO,
            run_id = %self.config.run_id,
            position = %compact,
            anchor,
            runs,
            value = ?value,
            rows_written,
            "analysis complete"
        );

        Ok(RunSummary {
            position: verbose,
            anchor,
            requested_runs: valuation.runs,
            runs,
            value,
            ci95_half_width: interval,
            best_move,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
        })
    }
}

fn as_policy(policy: &mut Option<Box<dyn MovePolicy + Send>>) -> Option<&mut dyn MovePolicy> {
    match policy {
        Some(policy) => Some(policy.as_mut()),
        None => None,
    }
}

/// Half-width of the 95% normal interval around a mean with this standard error.
fn ci95_half_width(std_error: Option<f64>) -> Option<f64> {
    let std_error = std_error?;
    let normal = Normal::new(0.0, 1.0).ok()?;
    Some(normal.inverse_cdf(0.975) * std_error)
}

fn write_row(writer: &mut BufWriter<File>, row: &AnalysisRow<'_>) -> Result<(), RunnerError> {
    serde_json::to_writer(&mut *writer, row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize report row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("position setup failed: {0}")]
    Game(#[from] GameError),
    #[error("valuation failed: {0}")]
    Valuation(#[from] ValuationError),
    #[error("opening play {play} has no legal move")]
    NoOpeningMove { play: usize },
    #[error("{policy} policy made no legal choice for opening play {play}")]
    OpeningDeclined { policy: PolicyKind, play: usize },
}
