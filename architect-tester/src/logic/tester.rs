use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use architect_game::numbers::usize_to_f64;
use architect_game::{Ending, RowSink};

use crate::sink::DiscardSink;

use super::checks::{check_determinism, check_run};
use super::policy::GameplayStrategy;
use super::simulation::{RunStatus, SimulationRunner, SimulationSummary};

/// Aggregate outcome of every run of one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub horizon_endings: usize,
    pub breach_endings: usize,
    pub stalled_runs: usize,
    pub mean_years: f64,
    pub mean_score: Option<f64>,
    pub best_score: Option<f64>,
    pub worst_score: Option<f64>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    runner: SimulationRunner,
    replay: bool,
    verbose: bool,
}

impl LogicTester {
    #[must_use]
    pub const fn new(runner: SimulationRunner, replay: bool, verbose: bool) -> Self {
        Self {
            runner,
            replay,
            verbose,
        }
    }

    /// Play `iterations` sessions per seed and fold them into one result.
    pub fn run_strategy(
        &self,
        strategy: GameplayStrategy,
        seeds: &[u64],
        iterations: usize,
        sink: &mut dyn RowSink,
    ) -> (ScenarioResult, Vec<SimulationSummary>) {
        if self.verbose {
            println!(
                "🧪 Testing strategy: {} ({} seeds x {iterations})",
                strategy.label().bright_white(),
                seeds.len()
            );
        }

        let mut runs = Vec::new();
        let mut failures = Vec::new();
        let mut successes = 0;

        for &seed in seeds {
            for i in 0..iterations {
                let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
                let summary = self.runner.run(strategy, iteration_seed, &mut *sink);

                let mut problems = check_run(&summary, self.runner.config());
                if self.replay {
                    let replay = self
                        .runner
                        .run(strategy, iteration_seed, &mut DiscardSink::default());
                    problems.extend(check_determinism(&summary, &replay));
                }

                if problems.is_empty() {
                    successes += 1;
                    if self.verbose {
                        println!(
                            "  ✅ seed {iteration_seed}: {} after {} years ({:?})",
                            summary.status.label(),
                            summary.years_played(),
                            summary.duration
                        );
                    }
                } else {
                    for problem in &problems {
                        failures.push(format!(
                            "seed {iteration_seed} ({}, {} years): {problem}",
                            summary.status.label(),
                            summary.years_played()
                        ));
                    }
                    if self.verbose {
                        println!(
                            "  ❌ seed {iteration_seed} failed: {}",
                            problems.join("; ").red()
                        );
                    }
                }
                runs.push(summary);
            }
        }

        (aggregate(strategy, &runs, successes, failures), runs)
    }
}

fn aggregate(
    strategy: GameplayStrategy,
    runs: &[SimulationSummary],
    successes: usize,
    failures: Vec<String>,
) -> ScenarioResult {
    let count_status = |wanted: RunStatus| runs.iter().filter(|run| run.status == wanted).count();
    let scores: Vec<f64> = runs.iter().filter_map(|run| run.score).collect();
    let performance_data: Vec<Duration> = runs.iter().map(|run| run.duration).collect();

    let mean_years = if runs.is_empty() {
        0.0
    } else {
        usize_to_f64(runs.iter().map(SimulationSummary::years_played).sum::<usize>())
            / usize_to_f64(runs.len())
    };
    let mean_score =
        (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / usize_to_f64(scores.len()));
    let average_duration = if performance_data.is_empty() {
        Duration::ZERO
    } else {
        performance_data.iter().sum::<Duration>()
            / u32::try_from(performance_data.len()).unwrap_or(1)
    };

    ScenarioResult {
        scenario_name: strategy.label().to_string(),
        passed: failures.is_empty(),
        iterations_run: runs.len(),
        successful_iterations: successes,
        failures,
        horizon_endings: count_status(RunStatus::Ended(Ending::Horizon)),
        breach_endings: count_status(RunStatus::Ended(Ending::TemperatureBreach)),
        stalled_runs: count_status(RunStatus::Stalled),
        mean_years,
        mean_score,
        best_score: scores.iter().copied().reduce(f64::max),
        worst_score: scores.iter().copied().reduce(f64::min),
        average_duration,
        performance_data,
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
