//! Pollution model runner: computes MEDUSA 2.0 loads for one rain event
//! over a catchment's buildings and roads, and stores them as a scenario.

mod input;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use medusa_core::config::RunConfig;
use medusa_core::feature::non_finite;
use medusa_core::{EventRunner, ScenarioStore, SqliteScenarioStore};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use input::FeatureFile;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "medusa",
    version,
    about = "Rain-event pollutant loading for roofs, roads and car parks"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the model for one event and persist it as a new scenario.
    Run(RunArgs),
    /// Print a persisted scenario as JSON.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Feature file with `buildings` and `roads`.
    #[arg(short, long)]
    features: String,

    /// JSON run configuration; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite scenario store.
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Days since the previous rainfall event.
    #[arg(long)]
    antecedent_dry_days: Option<f64>,

    /// Average rainfall intensity (mm/h).
    #[arg(long)]
    rain_intensity: Option<f64>,

    /// Event duration (h).
    #[arg(long)]
    duration: Option<f64>,

    /// Rainfall pH.
    #[arg(long)]
    ph: Option<f64>,

    /// Persist successful features even if some fail.
    #[arg(long)]
    allow_partial: bool,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[arg(short, long)]
    scenario: i64,

    #[arg(short, long, default_value = "data/pollution.sqlite")]
    database: PathBuf,
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn resolve_config(args: &RunArgs) -> Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(db) = &args.database { cfg.database = db.clone(); }
    if let Some(v) = args.antecedent_dry_days { cfg.event.antecedent_dry_days = v; }
    if let Some(v) = args.rain_intensity { cfg.event.avg_rain_intensity = v; }
    if let Some(v) = args.duration { cfg.event.event_duration = v; }
    if let Some(v) = args.ph { cfg.event.rainfall_ph = v; }
    cfg.allow_partial |= args.allow_partial;
    Ok(cfg)
}

fn run(args: RunArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;
    let scenario_id = run_with(&cfg, &args.features)?;
    println!("{scenario_id}");
    Ok(())
}

/// Evaluate the feature file under `cfg` and persist the successes as a new
/// scenario. Nothing is written unless the run is accepted as a whole.
fn run_with(cfg: &RunConfig, features: &str) -> Result<i64> {
    cfg.event.validate().context("invalid event parameters")?;

    let parsed = FeatureFile::read(features)?.into_features();
    info!(
        buildings = parsed.buildings.len(),
        roads = parsed.roads.len(),
        rejected = parsed.rejected.len(),
        "loaded features from {features}"
    );
    for err in &parsed.rejected {
        warn!("{err}");
    }

    let outcomes = EventRunner::new().evaluate(&parsed.buildings, &parsed.roads, &cfg.event);
    let total = outcomes.len() + parsed.rejected.len();
    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = parsed.rejected;
    for outcome in outcomes {
        match outcome {
            Ok(r) => results.push(r),
            Err(e) => failures.push(e),
        }
    }
    if let Some(first) = failures.first() {
        if !cfg.allow_partial {
            bail!("{} of {total} features failed; first: {first}", failures.len());
        }
        warn!(
            "{} of {total} features failed; persisting the remaining {}",
            failures.len(),
            results.len()
        );
    }
    if results.is_empty() {
        bail!("no feature produced a load; nothing persisted");
    }

    let bad = non_finite(&results);
    if !bad.is_empty() {
        bail!("non-finite loads for {} features (e.g. {}); nothing persisted", bad.len(), bad[0]);
    }

    let store = SqliteScenarioStore::open(&cfg.database)
        .with_context(|| format!("opening {}", cfg.database.display()))?;
    let scenario_id = store.record(&results).context("persisting scenario")?;
    info!(scenario_id, rows = results.len(), "scenario stored in {}", cfg.database.display());
    Ok(scenario_id)
}

fn show(args: ShowArgs) -> Result<()> {
    let store = SqliteScenarioStore::open(&args.database)
        .with_context(|| format!("opening {}", args.database.display()))?;
    let record = store.load_scenario(args.scenario)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Run(args) => run(args),
        Command::Show(args) => show(args),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn write_features(dir: &Path, json: &str) -> String {
        let path = dir.join("features.json");
        std::fs::write(&path, json).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config_in(dir: &Path, allow_partial: bool) -> RunConfig {
        RunConfig { database: dir.join("scenarios.sqlite"), allow_partial, ..RunConfig::default() }
    }

    const MIXED: &str = r#"{
        "buildings": [
            {"id": 1, "surface_type": "Cr", "area": 40.0},
            {"id": 2, "surface_type": "Slate", "area": 40.0}
        ],
        "roads": [
            {"id": 3, "length": 10.0},
            {"id": 4, "length": -3.0}
        ]
    }"#;

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::parse_from([
            "medusa", "run", "--features", "f.json", "--ph", "5.5", "--duration", "2",
        ]);
        assert_eq!(cli.log_level, Level::INFO);
        let Command::Run(args) = cli.command else { panic!("expected run") };
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.event.rainfall_ph, 5.5);
        assert_eq!(cfg.event.event_duration, 2.0);
        assert_eq!(cfg.event.antecedent_dry_days, 1.0);
        assert!(!cfg.allow_partial);
    }

    #[test]
    fn unknown_log_level_is_reported() {
        let args = ["medusa", "--log-level", "verbose", "show", "--scenario", "1"];
        let err = Cli::try_parse_from(args).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let cli = Cli::try_parse_from(["medusa", "-l", "DEBUG", "show", "-s", "1"]).unwrap();
        assert_eq!(cli.log_level, Level::DEBUG);
    }

    #[test]
    fn failing_features_abort_without_allow_partial() {
        let dir = tempfile::tempdir().unwrap();
        let features = write_features(dir.path(), MIXED);
        let cfg = config_in(dir.path(), false);

        let err = run_with(&cfg, &features).unwrap_err();
        assert!(err.to_string().contains("2 of 4 features failed"), "{err:#}");
        assert!(!cfg.database.exists());
    }

    #[test]
    fn allow_partial_persists_the_successful_subset() {
        let dir = tempfile::tempdir().unwrap();
        let features = write_features(dir.path(), MIXED);
        let cfg = config_in(dir.path(), true);

        let scenario_id = run_with(&cfg, &features).unwrap();
        assert_eq!(scenario_id, 1);

        let store = SqliteScenarioStore::open(&cfg.database).unwrap();
        let record = store.load_scenario(scenario_id).unwrap();
        let ids: Vec<_> = record.results.iter().map(|r| r.feature_id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);

        assert_eq!(run_with(&cfg, &features).unwrap(), 2);
    }

    #[test]
    fn non_finite_result_is_never_persisted() {
        let dir = tempfile::tempdir().unwrap();
        // Default event runs past the first-flush regime, where the copper
        // term squares and overflows for an area this large.
        let features = write_features(
            dir.path(),
            r#"{"buildings": [{"id": "huge", "surface_type": "Cr", "area": 1e200}]}"#,
        );
        let cfg = config_in(dir.path(), true);

        let err = run_with(&cfg, &features).unwrap_err();
        assert!(err.to_string().contains("non-finite loads"), "{err:#}");
        assert!(err.to_string().contains("huge"), "{err:#}");
        assert!(!cfg.database.exists());
    }

    #[test]
    fn run_with_nothing_to_persist_keeps_ids_unburned() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path(), true);

        let empty = write_features(dir.path(), r#"{"buildings": [], "roads": []}"#);
        let err = run_with(&cfg, &empty).unwrap_err();
        assert!(err.to_string().contains("nothing persisted"), "{err:#}");

        let all_bad = write_features(
            dir.path(),
            r#"{"buildings": [{"id": 5, "surface_type": "Slate", "area": 1.0}]}"#,
        );
        assert!(run_with(&cfg, &all_bad).is_err());
        assert!(!cfg.database.exists());

        let store = SqliteScenarioStore::open(&cfg.database).unwrap();
        assert_eq!(store.latest_scenario_id().unwrap(), None);
        assert_eq!(store.allocate_scenario_id().unwrap(), 1);
    }
}
