use std::fs;
use std::path::Path;

use foecast_cli::config::SimulationConfig;
use foecast_cli::simulate::SimulationRunner;
use foecast_core::predict::Pattern;
use foecast_core::session::GameMode;
use tempfile::tempdir;

fn load_config(output_dir: &Path, pattern: &str, engine: &str) -> SimulationConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
simulation:
  seed: 4242
  cycles: 3
  pattern: "{pattern}"
  engine: "{engine}"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("rounds.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn run(dir: &Path, pattern: &str, engine: &str) -> foecast_cli::simulate::RunSummary {
    let config = load_config(dir, pattern, engine);
    let outputs = config.resolved_outputs();
    SimulationRunner::new(config, outputs)
        .run()
        .expect("simulation completes")
}

#[test]
fn alternate_cycles_are_tracked_through_the_key_player() {
    let dir = tempdir().expect("temp dir");
    let summary = run(dir.path(), "alternate", "detecting");

    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.rounds_played, 21);
    assert_eq!(summary.rows_written, 42);

    // Round 4 always guesses the round-1 opponent, which this schedule never repeats.
    let simple = summary
        .tally(GameMode::Simple, Pattern::Alternate)
        .expect("simple tally");
    assert_eq!((simple.rounds, simple.predicted, simple.hits), (21, 12, 9));

    // Full analysis never records a key matchup for cycle round 3, so round 7 stays open.
    let full = summary
        .tally(GameMode::Full, Pattern::Alternate)
        .expect("full tally");
    assert_eq!((full.rounds, full.predicted, full.hits), (21, 9, 6));

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    assert_eq!(jsonl.lines().count(), 42);
    for line in jsonl.lines() {
        let value: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        assert_eq!(value["run_id"], "test_smoke");
        assert_eq!(value["pattern"], "alternate");
        if value["effective_round"].as_u64().expect("effective round") <= 3 {
            assert!(value["predicted"].is_null());
            assert!(value["hit"].is_null());
        }
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("| simple | alternate | 21 | 12 | 9 | 75.0% |"));
    assert!(markdown.contains("| full | alternate | 21 | 9 | 6 | 66.7% |"));
    assert!(summary.telemetry_path.is_none());
}

#[test]
fn classic_cycles_hit_every_prediction() {
    let dir = tempdir().expect("temp dir");
    let summary = run(dir.path(), "classic", "detecting");

    for mode in [GameMode::Simple, GameMode::Full] {
        let tally = summary.tally(mode, Pattern::Classic).expect("tally");
        assert_eq!(tally.predicted, 6, "{mode}");
        assert_eq!(tally.hits, 6, "{mode}");
    }
}

#[test]
fn key_player_engine_ignores_classic_repeats() {
    let dir = tempdir().expect("temp dir");
    let summary = run(dir.path(), "alternate", "key_player");

    // No round-4 guess: only the key-player rounds 5 to 7 are predicted.
    let simple = summary
        .tally(GameMode::Simple, Pattern::Alternate)
        .expect("simple tally");
    assert_eq!((simple.predicted, simple.hits), (9, 9));
}

#[test]
fn same_seed_writes_identical_rows() {
    let first = tempdir().expect("temp dir");
    let second = tempdir().expect("temp dir");
    let a = run(first.path(), "mixed", "detecting");
    let b = run(second.path(), "mixed", "detecting");

    let rows_a = fs::read_to_string(&a.jsonl_path).expect("jsonl readable");
    let rows_b = fs::read_to_string(&b.jsonl_path).expect("jsonl readable");
    assert_eq!(rows_a, rows_b);
    assert_eq!(a.tallies, b.tallies);
}
