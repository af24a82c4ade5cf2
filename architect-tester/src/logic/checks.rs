use architect_game::{EngineConfig, Ending, GameState, Metrics};
use twox_hash::XxHash64;

use super::simulation::{RunStatus, SimulationSummary};

const EPSILON: f64 = 1e-9;

/// Stable fingerprint of a session's recorded history and final metrics.
#[must_use]
pub fn history_digest(state: &GameState) -> u64 {
    let bytes = serde_json::to_vec(&(&state.history, &state.stats, state.ending)).unwrap_or_default();
    XxHash64::oneshot(0, &bytes)
}

fn check_bounds(label: &str, metrics: &Metrics) -> Option<String> {
    if metrics.co2 < 0.0 {
        return Some(format!("{label}: co2 negative ({:.2})", metrics.co2));
    }
    if !(0.0..=100.0).contains(&metrics.public_approval) {
        return Some(format!("{label}: approval out of range ({:.2})", metrics.public_approval));
    }
    if !(0.0..=100.0).contains(&metrics.renewable_pct) {
        return Some(format!("{label}: renewables out of range ({:.2})", metrics.renewable_pct));
    }
    if metrics.gdp <= 0.0 {
        return Some(format!("{label}: gdp not positive ({:.4})", metrics.gdp));
    }
    None
}

/// Every invariant violation observed in a finished run.
#[must_use]
pub fn check_run(summary: &SimulationSummary, cfg: &EngineConfig) -> Vec<String> {
    let state = &summary.final_state;
    let mut failures = Vec::new();

    if let Some(failure) = check_bounds("final", &state.stats) {
        failures.push(failure);
    }

    let mut expected_year = cfg.calendar.start_year;
    let mut previous_temp = state.initial_stats.temp_rise;
    for record in &state.history {
        if record.year != expected_year {
            failures.push(format!("history year {} where {expected_year} was expected", record.year));
        }
        if let Some(failure) = check_bounds(&record.year.to_string(), &record.metrics) {
            failures.push(failure);
        }
        if record.metrics.temp_rise + EPSILON < previous_temp {
            failures.push(format!("{}: temperature fell", record.year));
        }
        previous_temp = record.metrics.temp_rise;
        expected_year = expected_year.saturating_add(1);
    }

    if summary.turns.len() != state.history.len() {
        failures.push(format!(
            "{} accepted turns but {} history records",
            summary.turns.len(),
            state.history.len()
        ));
    }
    if summary.rows_persisted + usize::try_from(summary.persistence_failures).unwrap_or(0)
        != state.history.len()
    {
        failures.push(format!(
            "{} rows persisted for {} history records",
            summary.rows_persisted,
            state.history.len()
        ));
    }

    match summary.status {
        RunStatus::Ended(Ending::Horizon) => {
            if state.history.last().map(|record| record.year) != Some(cfg.calendar.end_year) {
                failures.push("horizon ending before the final year".to_string());
            }
        }
        RunStatus::Ended(Ending::TemperatureBreach) => {
            if state.stats.temp_rise < cfg.feedback.breach_temp {
                failures.push(format!(
                    "breach ending at {:.2} degrees",
                    state.stats.temp_rise
                ));
            }
        }
        RunStatus::Stalled => {
            if state.stats.political_capital >= 0.0 {
                failures.push("stalled with non-negative capital".to_string());
            }
        }
        RunStatus::Halted => failures.push("run never reached a terminal state".to_string()),
    }

    match (state.game_over, summary.score) {
        (true, Some(score)) if !score.is_finite() => failures.push("score not finite".to_string()),
        (true, None) => failures.push("finished run has no score".to_string()),
        (false, Some(_)) => failures.push("score reported for a running session".to_string()),
        _ => {}
    }

    failures
}

/// Compare two runs of the same strategy and seed.
#[must_use]
pub fn check_determinism(first: &SimulationSummary, replay: &SimulationSummary) -> Option<String> {
    (first.digest != replay.digest).then(|| {
        format!(
            "replay diverged: digest {:016x} vs {:016x}",
            first.digest, replay.digest
        )
    })
}
