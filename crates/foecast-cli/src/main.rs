use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use foecast_cli::config::{ResolvedOutputs, SimulationConfig};
use foecast_cli::logging::{init_console_logging, init_logging};
use foecast_cli::script::{SessionScript, replay};
use foecast_cli::simulate::SimulationRunner;
use foecast_core::AppInfo;
use foecast_core::export::{history_to_json, write_full_history_csv, write_simple_history_csv};
use foecast_core::predict::PredictionEngine;
use foecast_core::session::{GameMode, Session};

/// Opponent predictor for Magic Chess lobbies.
#[derive(Debug, Parser)]
#[command(
    name = "foecast",
    author,
    version,
    about = "Predicts the next Magic Chess opponent from the current cycle's pairings"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run seeded synthetic cycles and score the predictions.
    Simulate {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config/simulate.yaml")]
        config: PathBuf,

        /// Override the run identifier (substitutes {run_id} templates).
        #[arg(long, value_name = "RUN_ID")]
        run_id: Option<String>,

        /// Override the RNG seed for schedule generation.
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Override the number of cycles to simulate.
        #[arg(long, value_name = "CYCLES")]
        cycles: Option<usize>,

        /// Exit after validating the configuration (no simulation is run).
        #[arg(long)]
        validate_only: bool,
    },
    /// Replay a scripted session and print each round's prediction.
    Replay {
        /// Path to the YAML session script.
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Prediction engine: detecting or key_player.
        #[arg(long, value_name = "ENGINE")]
        engine: Option<String>,
    },
    /// Export a scripted session's history.
    Export {
        /// Path to the YAML session script.
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output file; stdout when omitted.
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Simulate {
            config,
            run_id,
            seed,
            cycles,
            validate_only,
        } => simulate(&config, run_id, seed, cycles, validate_only),
        Command::Replay { script, engine } => {
            init_console_logging(Level::WARN);
            replay_script(&script, engine.as_deref())
        }
        Command::Export {
            script,
            out,
            format,
        } => {
            init_console_logging(Level::WARN);
            export_script(&script, out.as_deref(), format)
        }
    }
}

fn simulate(
    path: &Path,
    run_id: Option<String>,
    seed: Option<u64>,
    cycles: Option<usize>,
    validate_only: bool,
) -> anyhow::Result<()> {
    let mut config = SimulationConfig::from_path(path)?;

    if let Some(run_id) = run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = seed {
        config.simulation.seed = Some(seed);
    }

    if let Some(cycles) = cycles {
        config.simulation.cycles = cycles;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let cycle_count = config.simulation.cycles;

    println!(
        "Loaded configuration '{run_id}' for {} {} ({cycle_count} cycle{}, {} engine)",
        AppInfo::name(),
        AppInfo::version(),
        if cycle_count == 1 { "" } else { "s" },
        config.simulation.engine.as_str()
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = SimulationRunner::new(config, outputs);

    if validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Simulation complete for '{run_id}': {} cycles, {} rounds -> {} rows at {}",
        summary.cycles,
        summary.rounds_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    for tally in &summary.tallies {
        let rate = tally
            .hit_rate()
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<6} {:<12} {}/{} predictions hit ({rate})",
            tally.mode.as_str(),
            tally.pattern.as_str(),
            tally.hits,
            tally.predicted
        );
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}

fn parse_engine(value: Option<&str>) -> anyhow::Result<PredictionEngine> {
    match value {
        None => Ok(PredictionEngine::default()),
        Some(raw) => match PredictionEngine::from_str(raw) {
            Some(engine) => Ok(engine),
            None => bail!("unknown prediction engine '{raw}' (expected detecting or key_player)"),
        },
    }
}

fn replay_script(path: &Path, engine: Option<&str>) -> anyhow::Result<()> {
    let engine = parse_engine(engine)?;
    let script = SessionScript::from_path(path)?;
    let rows = replay(&script, engine)?;

    println!(
        "Replaying {} session from {} ({} engine)",
        script.mode(),
        path.display(),
        engine.as_str()
    );
    for row in &rows {
        let predicted = row.predicted.as_deref().unwrap_or("Random / Unknown");
        match (&row.actual, row.hit()) {
            (Some(actual), Some(hit)) => println!(
                "Round {:>3} (cycle round {}): predicted {predicted}, faced {actual} [{}]",
                row.round,
                row.effective_round,
                if hit { "hit" } else { "miss" }
            ),
            (Some(actual), None) => println!(
                "Round {:>3} (cycle round {}): predicted {predicted}, faced {actual}",
                row.round, row.effective_round
            ),
            (None, _) => println!(
                "Next round {} (cycle round {}, {} pattern): {predicted}",
                row.round, row.effective_round, row.pattern
            ),
        }
    }
    Ok(())
}

fn export_script(path: &Path, out: Option<&Path>, format: ExportFormat) -> anyhow::Result<()> {
    let script = SessionScript::from_path(path)?;
    let session = script.play(PredictionEngine::default())?;

    match out {
        Some(out) => {
            let file = File::create(out)
                .with_context(|| format!("creating export file at {}", out.display()))?;
            let mut writer = BufWriter::new(file);
            write_export(&mut writer, &session, format)?;
            writer.flush()?;
            eprintln!("Exported {} rounds to {}", session.current_round() - 1, out.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_export(&mut writer, &session, format)?;
        }
    }
    Ok(())
}

fn write_export<W: Write>(writer: &mut W, session: &Session, format: ExportFormat) -> anyhow::Result<()> {
    match (format, session.mode()) {
        (ExportFormat::Csv, GameMode::Full) => {
            write_full_history_csv(writer, session.full_history(), session.roster())?
        }
        (ExportFormat::Csv, GameMode::Simple) => {
            write_simple_history_csv(writer, session.simple_history(), session.roster())?
        }
        (ExportFormat::Json, GameMode::Full) => {
            let json = history_to_json(session.roster(), session.full_history())?;
            writeln!(writer, "{json}")?;
        }
        (ExportFormat::Json, GameMode::Simple) => {
            let json = history_to_json(session.roster(), session.simple_history())?;
            writeln!(writer, "{json}")?;
        }
    }
    Ok(())
}
