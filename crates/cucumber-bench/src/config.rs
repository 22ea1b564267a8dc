use cucumber_bot::PolicyKind;
use cucumber_core::model::card::DECK_SIZE;
use cucumber_core::model::deck::Deck;
use cucumber_core::valuation::{ConsistencyCheck, MonteCarloOptions};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_RUNS: usize = 1_000;
const DEFAULT_MOVE_RUNS: usize = 100;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root analysis configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub run_id: String,
    pub deal: DealConfig,
    #[serde(default)]
    pub valuation: ValuationConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnalysisConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: AnalysisConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deal.validate()?;
        self.valuation.validate(self.deal.players)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        self.logging.validate()?;
        Ok(())
    }

    /// Resolve `{run_id}` placeholders into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
        }
    }

    /// Seed for the valuation stream; the deal seed unless overridden.
    pub fn valuation_seed(&self) -> &str {
        self.valuation.seed.as_deref().unwrap_or(&self.deal.seed)
    }
}

/// How the analysed position comes about.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    /// Seed string; YAML numbers are taken by their decimal text.
    #[serde(deserialize_with = "seed_text")]
    pub seed: String,
    pub players: usize,
    pub cards: usize,
    /// Restricts the deck to identities `0..deck_size`.
    #[serde(default)]
    pub deck_size: Option<usize>,
    #[serde(default)]
    pub first_player: usize,
    #[serde(default)]
    pub opening_plays: usize,
    #[serde(default)]
    pub opening_policy: PolicyKind,
}

impl DealConfig {
    pub fn deck(&self) -> Deck {
        match self.deck_size {
            Some(size) => Deck::first(size),
            None => Deck::standard(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.seed.is_empty() {
            return Err(invalid("deal.seed", "seed must not be empty"));
        }
        if self.players == 0 {
            return Err(invalid("deal.players", "at least one player is required"));
        }
        if self.cards == 0 {
            return Err(invalid("deal.cards", "each player needs at least one card"));
        }

        let deck_size = self.deck_size.unwrap_or(DECK_SIZE);
        if deck_size == 0 || deck_size > DECK_SIZE {
            return Err(invalid(
                "deal.deck_size",
                format!("deck size must be between 1 and {DECK_SIZE}"),
            ));
        }
        let Some(needed) = self.players.checked_mul(self.cards) else {
            return Err(invalid(
                "deal.cards",
                format!(
                    "{} players with {} cards overflow the card count",
                    self.players, self.cards
                ),
            ));
        };
        if needed > deck_size {
            return Err(invalid(
                "deal.cards",
                format!(
                    "{} players with {} cards need {needed} cards but the deck holds {deck_size}",
                    self.players, self.cards
                ),
            ));
        }

        if self.first_player >= self.players {
            return Err(invalid(
                "deal.first_player",
                format!("first player must be below {}", self.players),
            ));
        }

        // `cards >= 1`, so this cannot underflow.
        let playable = needed - self.players;
        if self.opening_plays > playable {
            return Err(invalid(
                "deal.opening_plays",
                format!("at most {playable} plays happen before the endgame"),
            ));
        }
        Ok(())
    }
}

/// Monte Carlo settings for the analysed position.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ValuationConfig {
    #[serde(default = "default_runs")]
    pub runs: usize,
    #[serde(default, deserialize_with = "optional_seed_text")]
    pub seed: Option<String>,
    /// Seat whose knowledge is kept; the active player when unset.
    #[serde(default)]
    pub anchor: Option<usize>,
    #[serde(default)]
    pub cross_player: bool,
    #[serde(default)]
    pub consistency: ConsistencyCheck,
    #[serde(default)]
    pub rollout_policy: Option<PolicyKind>,
    #[serde(default)]
    pub evaluate_moves: bool,
    #[serde(default = "default_move_runs")]
    pub move_runs: usize,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            seed: None,
            anchor: None,
            cross_player: false,
            consistency: ConsistencyCheck::default(),
            rollout_policy: None,
            evaluate_moves: false,
            move_runs: DEFAULT_MOVE_RUNS,
        }
    }
}

impl ValuationConfig {
    pub fn options(&self) -> MonteCarloOptions {
        let options = MonteCarloOptions::new(self.runs)
            .with_cross_player(self.cross_player)
            .with_consistency(self.consistency);
        match self.anchor {
            Some(anchor) => options.anchored(anchor),
            None => options,
        }
    }

    fn validate(&self, players: usize) -> Result<(), ValidationError> {
        if self.runs == 0 {
            return Err(invalid("valuation.runs", "runs must be greater than zero"));
        }
        if self.seed.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("valuation.seed", "seed must not be empty"));
        }
        if let Some(anchor) = self.anchor.filter(|&anchor| anchor >= players) {
            return Err(invalid(
                "valuation.anchor",
                format!("anchor {anchor} is outside a table of {players}"),
            ));
        }
        if self.evaluate_moves && self.move_runs == 0 {
            return Err(invalid(
                "valuation.move_runs",
                "move runs must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_runs() -> usize {
    DEFAULT_RUNS
}

fn default_move_runs() -> usize {
    DEFAULT_MOVE_RUNS
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        if self.jsonl.trim().is_empty() {
            return Err(invalid("outputs.jsonl", "path must not be empty"));
        }
        let resolved = resolve_template(run_id, &self.jsonl);
        if resolved.file_name().is_none() {
            return Err(invalid("outputs.jsonl", "resolved path has no file name"));
        }
        Ok(())
    }
}

/// Logging configuration defaults to plain text at `info`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.level().is_none() {
            return Err(invalid(
                "logging.tracing_level",
                format!("unknown level '{}'", self.tracing_level),
            ));
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedRepr {
    Text(String),
    Number(u64),
}

impl From<SeedRepr> for String {
    fn from(seed: SeedRepr) -> Self {
        match seed {
            SeedRepr::Text(text) => text,
            SeedRepr::Number(number) => number.to_string(),
        }
    }
}

fn seed_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    SeedRepr::deserialize(deserializer).map(String::from)
}

fn optional_seed_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<SeedRepr>::deserialize(deserializer).map(|seed| seed.map(String::from))
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(invalid("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
