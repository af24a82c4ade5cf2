mod logic;
mod sink;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use architect_game::{EngineConfig, RowSink, ScoringKind};
use logic::{GameplayStrategy, LogicTester, ScenarioResult, SimulationRunner, SimulationSummary};
use sink::{CsvRowSink, DiscardSink};
use util::{parse_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "architect-tester", version)]
#[command(about = "Automated play-through QA for the Policy Architect 2050 engine")]
struct Args {
    /// Strategies to run (comma-separated, or `all`)
    #[arg(long, default_value = "balanced")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated, decimal or 0x-prefixed hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of consecutive seeds played from each listed seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Team name recorded on every session
    #[arg(long, default_value = "QA Delegation")]
    team: String,

    /// Scoring strategy for final results
    #[arg(long, default_value_t = ScoringKind::Weighted)]
    scoring: ScoringKind,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Append every persisted turn row to this CSV file
    #[arg(long)]
    rows: Option<PathBuf>,

    /// Engine configuration JSON overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip replaying each run to confirm determinism
    #[arg(long)]
    skip_determinism: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let strategies = expand_strategies(&args.strategies)?;
    let seeds = parse_seeds(&split_csv(&args.seeds))?;

    let runner = SimulationRunner::new(config, args.team.clone(), args.scoring).verbose(args.verbose);
    let tester = LogicTester::new(runner, !args.skip_determinism, args.verbose);

    let (results, runs) = match args.rows.as_deref() {
        Some(path) => {
            let mut sink = CsvRowSink::create(path)?;
            let outcome = run_strategies(&tester, &strategies, &seeds, args.iterations, &mut sink);
            sink.flush()
                .with_context(|| format!("failed to flush {}", path.display()))?;
            println!("🗂️  {} turn rows written to {}", sink.rows_written(), path.display());
            outcome
        }
        None => run_strategies(
            &tester,
            &strategies,
            &seeds,
            args.iterations,
            &mut DiscardSink::default(),
        ),
    };

    write_reports(&args, &results, &runs, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in GameplayStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:15} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏛️ Policy Architect Automated Tester".bright_cyan().bold());
    println!("{}", "=====================================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    EngineConfig::from_json(&raw).with_context(|| format!("invalid config in {}", path.display()))
}

fn expand_strategies(strategies_arg: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(strategies_arg) {
        if token.eq_ignore_ascii_case("all") {
            for strategy in GameplayStrategy::ALL {
                if !strategies.contains(&strategy) {
                    strategies.push(strategy);
                }
            }
            continue;
        }
        let strategy: GameplayStrategy = token.parse().map_err(anyhow::Error::msg)?;
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    Ok(strategies)
}

fn run_strategies(
    tester: &LogicTester,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
    iterations: usize,
    sink: &mut dyn RowSink,
) -> (Vec<ScenarioResult>, Vec<SimulationSummary>) {
    println!("{}", "🧠 Running Simulations".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let mut results = Vec::with_capacity(strategies.len());
    let mut all_runs = Vec::new();
    for &strategy in strategies {
        let (result, runs) = tester.run_strategy(strategy, seeds, iterations, &mut *sink);
        results.push(result);
        all_runs.extend(runs);
    }
    (results, all_runs)
}

fn write_reports(
    args: &Args,
    results: &[ScenarioResult],
    runs: &[SimulationSummary],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Policy Architect Simulation Results\n\n_No strategies executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, runs)?,
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No strategies executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    if matches!(args.report.as_str(), "console" | "markdown") {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_game::MemorySink;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            strategies: "balanced".to_string(),
            list_strategies: false,
            seeds: "1337".to_string(),
            iterations: 1,
            team: "QA Delegation".to_string(),
            scoring: ScoringKind::Weighted,
            report: "json".to_string(),
            output: None,
            rows: None,
            config: None,
            skip_determinism: false,
            verbose: false,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("architect-tester-{}-{name}", std::process::id()))
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Balanced".to_string(),
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            horizon_endings: 3,
            breach_endings: 0,
            stalled_runs: 0,
            mean_years: 26.0,
            mean_score: Some(58.25),
            best_score: Some(60.0),
            worst_score: Some(57.0),
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    #[test]
    fn expands_all_strategies_keyword() {
        let expanded = expand_strategies("idle,all").unwrap();
        assert_eq!(expanded[0], GameplayStrategy::Idle);
        assert_eq!(expanded.len(), GameplayStrategy::ALL.len());
    }

    #[test]
    fn expand_strategies_preserves_order_and_rejects_unknown() {
        let expanded = expand_strategies("monte-carlo, balanced").unwrap();
        assert_eq!(
            expanded,
            vec![GameplayStrategy::MonteCarlo, GameplayStrategy::Balanced]
        );
        assert!(expand_strategies("balanced,reckless").is_err());
    }

    #[test]
    fn load_config_defaults_without_path() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.calendar.start_year, EngineConfig::default().calendar.start_year);
    }

    #[test]
    fn load_config_reads_overrides() {
        let path = temp_path("config.json");
        let cfg = EngineConfig {
            event_chance: 0.0,
            ..EngineConfig::default()
        };
        std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert!(loaded.event_chance.abs() < f64::EPSILON);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/architect.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn maybe_list_strategies_writes_output() {
        let temp = temp_path("strategies.txt");
        let args = Args {
            list_strategies: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_strategies(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available strategies"));
        assert!(content.contains("monte-carlo"));
    }

    #[test]
    fn maybe_list_strategies_returns_false_when_disabled() {
        assert!(!maybe_list_strategies(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = temp_path("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(&temp).unwrap();
        assert!(content.contains("[]"));

        write_reports(&args, &[sample_result(true)], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_path("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No strategies executed"));
    }

    #[test]
    fn write_reports_emits_console_report() {
        let temp = temp_path("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("FAIL"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn run_strategies_emits_csv_rows_per_run() {
        let runner =
            SimulationRunner::new(EngineConfig::default(), "QA", ScoringKind::Weighted);
        let tester = LogicTester::new(runner, false, false);
        let mut sink = MemorySink::new();
        let (results, runs) = run_strategies(
            &tester,
            &[GameplayStrategy::Balanced, GameplayStrategy::Idle],
            &[3],
            2,
            &mut sink,
        );
        assert_eq!(results.len(), 2);
        assert_eq!(runs.len(), 4);

        let temp = temp_path("runs.csv");
        let args = Args {
            report: "csv".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &results, &runs, Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.starts_with("strategy,seed,status"));
        assert_eq!(content.lines().count(), 5);
        assert!(content.contains("idle,3,"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
