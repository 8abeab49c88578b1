mod schedule;

pub use schedule::{CycleSchedule, LOBBY_SIZE, ScheduleError, generate_cycle};

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use foecast_core::cycle::CYCLE_LENGTH;
use foecast_core::model::PlayerId;
use foecast_core::predict::{Pattern, PredictionEngine};
use foecast_core::session::{GameMode, Session, SessionError, SimpleRoundInput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{PatternMix, ResolvedOutputs, SimulationConfig};
use crate::logging::{TELEMETRY_FILE_NAME, telemetry_dir};

const MODES: [GameMode; 2] = [GameMode::Simple, GameMode::Full];

/// Replays seeded synthetic cycles through both session modes and scores the predictions.
pub struct SimulationRunner {
    config: SimulationConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub cycles: usize,
    pub rounds_played: usize,
    pub rows_written: usize,
    pub tallies: Vec<Tally>,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn tally(&self, mode: GameMode, pattern: Pattern) -> Option<&Tally> {
        self.tallies
            .iter()
            .find(|t| t.mode == mode && t.pattern == pattern)
    }
}

/// Prediction counts for one mode and schedule pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub mode: GameMode,
    pub pattern: Pattern,
    pub rounds: usize,
    pub predicted: usize,
    pub hits: usize,
}

impl Tally {
    fn new(mode: GameMode, pattern: Pattern) -> Self {
        Self {
            mode,
            pattern,
            rounds: 0,
            predicted: 0,
            hits: 0,
        }
    }

    pub fn hit_rate(&self) -> Option<f64> {
        if self.predicted == 0 {
            None
        } else {
            Some(self.hits as f64 / self.predicted as f64)
        }
    }
}

#[derive(Debug, Serialize)]
struct RoundLogRow<'a> {
    run_id: &'a str,
    cycle: usize,
    round: u32,
    effective_round: u32,
    pattern: Pattern,
    mode: GameMode,
    engine: &'static str,
    predicted: Option<&'a str>,
    actual: &'a str,
    hit: Option<bool>,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode round row: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schedule generation failed: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("session rejected simulated round: {0}")]
    Session(#[from] SessionError),
    #[error("player '{0}' is missing from the session roster")]
    UnknownPlayer(String),
}

impl SimulationRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimulationConfig, outputs: ResolvedOutputs) -> Self {
        Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        }
    }

    /// Execute the simulation, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let params = &self.config.simulation;
        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(params.seed.unwrap_or(0));
        let mut lobby = Lobby::new(params.engine)?;
        let mut tallies: BTreeMap<(usize, usize), Tally> = BTreeMap::new();
        let mut rows_written = 0usize;

        for cycle_index in 0..params.cycles {
            let pattern = match params.pattern {
                PatternMix::Classic => Pattern::Classic,
                PatternMix::Alternate => Pattern::Alternate,
                PatternMix::Mixed if rng.gen_bool(0.5) => Pattern::Classic,
                PatternMix::Mixed => Pattern::Alternate,
                PatternMix::Unstructured => Pattern::Unknown,
            };
            let schedule = generate_cycle(&mut rng, pattern)?;

            let mut cycle_hits = 0usize;
            for effective in 1..=CYCLE_LENGTH as usize {
                let outcomes = lobby.play_round(&schedule, effective)?;
                for outcome in &outcomes {
                    let tally = tallies
                        .entry((mode_index(outcome.mode), pattern_index(pattern)))
                        .or_insert_with(|| Tally::new(outcome.mode, pattern));
                    tally.rounds += 1;
                    if outcome.predicted.is_some() {
                        tally.predicted += 1;
                    }
                    if outcome.hit() == Some(true) {
                        tally.hits += 1;
                        cycle_hits += 1;
                    }

                    let row = RoundLogRow {
                        run_id: &self.config.run_id,
                        cycle: cycle_index,
                        round: outcome.round,
                        effective_round: effective as u32,
                        pattern,
                        mode: outcome.mode,
                        engine: params.engine.as_str(),
                        predicted: outcome.predicted.as_deref(),
                        actual: &outcome.actual,
                        hit: outcome.hit(),
                    };
                    serde_json::to_writer(&mut writer, &row)?;
                    writer.write_all(b"\n")?;
                    rows_written += 1;
                }
            }

            log_cycle(cycle_index, pattern, cycle_hits);
        }

        writer.flush()?;

        let tallies: Vec<Tally> = tallies.into_values().collect();
        write_summary_markdown(&self.outputs.summary_md, &self.config, &tallies)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| telemetry_dir(&self.outputs).join(TELEMETRY_FILE_NAME));

        Ok(RunSummary {
            cycles: params.cycles,
            rounds_played: params.cycles * CYCLE_LENGTH as usize,
            rows_written,
            tallies,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }
}

struct RoundOutcome {
    mode: GameMode,
    round: u32,
    predicted: Option<String>,
    actual: String,
}

impl RoundOutcome {
    fn hit(&self) -> Option<bool> {
        self.predicted.as_ref().map(|name| *name == self.actual)
    }
}

/// One simple-mode and one full-mode session fed the same generated pairings.
struct Lobby {
    simple: Session,
    full: Session,
    /// Generated player id by display name.
    ids_by_name: HashMap<String, PlayerId>,
}

impl Lobby {
    fn new(engine: PredictionEngine) -> Result<Self, RunnerError> {
        let names: Vec<String> = (2..=LOBBY_SIZE).map(|id| player_name(PlayerId(id))).collect();
        let mut full = Session::with_engine(GameMode::Full, engine);
        full.start_full(&names)?;

        let ids_by_name = (1..=LOBBY_SIZE)
            .map(|id| (player_name(PlayerId(id)), PlayerId(id)))
            .collect();

        Ok(Self {
            simple: Session::with_engine(GameMode::Simple, engine),
            full,
            ids_by_name,
        })
    }

    fn play_round(
        &mut self,
        schedule: &CycleSchedule,
        effective: usize,
    ) -> Result<Vec<RoundOutcome>, RunnerError> {
        let actual = player_name(schedule.opponent(effective, PlayerId::ME)?);

        let mut outcomes = Vec::with_capacity(MODES.len());
        for mode in MODES {
            let session = self.session(mode);
            outcomes.push(RoundOutcome {
                mode,
                round: session.current_round(),
                predicted: session.predicted_opponent().map(|p| p.name.clone()),
                actual: actual.clone(),
            });
        }

        let mut input = SimpleRoundInput::new(actual);
        if let Some(key_player) = self.simple.key_player_for_round() {
            let key_name = self.simple.roster().label(key_player);
            let key_id = *self
                .ids_by_name
                .get(&key_name)
                .ok_or(RunnerError::UnknownPlayer(key_name))?;
            input = input.with_key_opponent(player_name(schedule.opponent(effective, key_id)?));
        }
        self.simple.submit_simple_round(&input)?;

        for matchup in &schedule.rounds()[effective - 1] {
            self.full.pair(matchup.player1, matchup.player2)?;
        }
        self.full.confirm_full_round()?;

        Ok(outcomes)
    }

    fn session(&self, mode: GameMode) -> &Session {
        match mode {
            GameMode::Simple => &self.simple,
            GameMode::Full => &self.full,
        }
    }
}

/// Names used for generated players; matches the full-mode roster labels.
fn player_name(id: PlayerId) -> String {
    if id.is_me() {
        "You".to_string()
    } else {
        format!("P{id}")
    }
}

const fn mode_index(mode: GameMode) -> usize {
    match mode {
        GameMode::Simple => 0,
        GameMode::Full => 1,
    }
}

const fn pattern_index(pattern: Pattern) -> usize {
    match pattern {
        Pattern::Classic => 0,
        Pattern::Alternate => 1,
        Pattern::Unknown => 2,
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_summary_markdown(
    path: &Path,
    config: &SimulationConfig,
    tallies: &[Tally],
) -> Result<(), RunnerError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# Simulation summary: {}", config.run_id)?;
    writeln!(out)?;
    writeln!(
        out,
        "- Seed: {}",
        config
            .simulation
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "0 (default)".to_string())
    )?;
    writeln!(out, "- Cycles: {}", config.simulation.cycles)?;
    writeln!(out, "- Engine: {}", config.simulation.engine.as_str())?;
    writeln!(out)?;
    writeln!(out, "| Mode | Pattern | Rounds | Predicted | Hits | Hit rate |")?;
    writeln!(out, "|------|---------|-------:|----------:|-----:|---------:|")?;
    for tally in tallies {
        let rate = tally
            .hit_rate()
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            tally.mode, tally.pattern, tally.rounds, tally.predicted, tally.hits, rate
        )?;
    }
    out.flush()?;
    Ok(())
}

fn log_cycle(cycle: usize, pattern: Pattern, hits: usize) {
    event!(
        target: "foecast_cli::simulate",
        Level::INFO,
        cycle,
        pattern = pattern.as_str(),
        hits,
        "cycle simulated"
    );
}
