use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use architect_game::numbers::usize_to_f64;

use super::simulation::SimulationSummary;
use super::tester::ScenarioResult;

fn success_rate(results: &[ScenarioResult]) -> f64 {
    let total = results.len();
    if total == 0 {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    usize_to_f64(passed) / usize_to_f64(total) * 100.0
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total strategies: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(out, "{} {}", status, result.scenario_name.bold())?;
        writeln!(
            out,
            "   Runs: {}/{} clean",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            out,
            "   Endings: {} horizon, {} breach, {} stalled",
            result.horizon_endings, result.breach_endings, result.stalled_runs
        )?;
        writeln!(
            out,
            "   Years: {:.1} avg | Score: {} avg, {} best, {} worst",
            result.mean_years,
            format_score(result.mean_score),
            format_score(result.best_score),
            format_score(result.worst_score)
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let ranked = results
        .iter()
        .filter_map(|r| r.mean_score.map(|score| (r, score)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((leader, score)) = ranked {
        writeln!(out, "{}", "🏆 Best Strategy".bright_yellow().bold())?;
        writeln!(out, "{}", "================".yellow())?;
        writeln!(out, "{} ({score:.2} mean score)", leader.scenario_name.green())?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(out, "# Policy Architect Simulation Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total strategies**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Strategy | Runs | Horizon | Breach | Stalled | Mean years | Mean score |")?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {status} {} | {}/{} | {} | {} | {} | {:.1} | {} |",
            result.scenario_name,
            result.successful_iterations,
            result.iterations_run,
            result.horizon_endings,
            result.breach_endings,
            result.stalled_runs,
            result.mean_years,
            format_score(result.mean_score)
        )?;
    }

    for result in results.iter().filter(|r| !r.failures.is_empty()) {
        writeln!(out, "\n### ❌ {}\n", result.scenario_name)?;
        for failure in &result.failures {
            writeln!(out, "- {failure}")?;
        }
    }
    Ok(())
}

const CSV_HEADER: [&str; 14] = [
    "strategy",
    "seed",
    "status",
    "years",
    "rejected",
    "events",
    "score",
    "gdp",
    "co2",
    "temp_rise",
    "approval",
    "capital",
    "renewables",
    "digest",
];

pub fn generate_csv_report<W: Write + ?Sized>(out: &mut W, runs: &[SimulationSummary]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for run in runs {
        let stats = &run.final_state.stats;
        writer.write_record([
            run.strategy.key().to_string(),
            run.seed.to_string(),
            run.status.label(),
            run.years_played().to_string(),
            run.rejected_submissions.to_string(),
            run.events_fired.to_string(),
            run.score.map_or_else(String::new, |score| format!("{score:.2}")),
            format!("{:.2}", stats.gdp),
            format!("{:.2}", stats.co2),
            format!("{:.2}", stats.temp_rise),
            format!("{:.2}", stats.public_approval),
            format!("{:.2}", stats.political_capital),
            format!("{:.2}", stats.renewable_pct),
            format!("{:016x}", run.digest),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::policy::GameplayStrategy;
    use crate::logic::simulation::SimulationRunner;
    use architect_game::{EngineConfig, MemorySink, ScoringKind};

    fn sample(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Balanced".to_string(),
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["seed 4: co2 negative (-1.00)".to_string()]
            },
            horizon_endings: 2,
            breach_endings: 0,
            stalled_runs: 0,
            mean_years: 26.0,
            mean_score: Some(61.5),
            best_score: Some(62.0),
            worst_score: Some(61.0),
            average_duration: Duration::from_millis(3),
            performance_data: vec![Duration::from_millis(3)],
        }
    }

    #[test]
    fn markdown_lists_failures() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &[sample(true), sample(false)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("# Policy Architect Simulation Results"));
        assert!(text.contains("| ✅ Balanced | 2/2 |"));
        assert!(text.contains("co2 negative"));
        assert!(text.contains("**Success rate**: 50.0%"));
    }

    #[test]
    fn json_roundtrips_durations_as_millis() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &[sample(true)]).unwrap();
        let parsed: Vec<ScenarioResult> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0].average_duration, Duration::from_millis(3));
        assert_eq!(parsed[0].mean_score, Some(61.5));
    }

    #[test]
    fn console_names_best_strategy() {
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &[sample(true)], Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Best Strategy"));
        assert!(text.contains("61.50 mean score"));
    }

    #[test]
    fn csv_report_has_one_record_per_run() {
        let runner = SimulationRunner::new(EngineConfig::default(), "QA", ScoringKind::Weighted);
        let runs: Vec<SimulationSummary> = [GameplayStrategy::Balanced, GameplayStrategy::Idle]
            .into_iter()
            .map(|strategy| runner.run(strategy, 3, &mut MemorySink::new()))
            .collect();
        let mut buf = Vec::new();
        generate_csv_report(&mut buf, &runs).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(headers, CSV_HEADER);
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), runs.len());
        assert!(records.iter().all(|r| r.len() == CSV_HEADER.len()));
        assert_eq!(&records[1][0], "idle");
        assert_eq!(&records[1][1], "3");
        assert_eq!(records[1][13].len(), 16);
    }
}
