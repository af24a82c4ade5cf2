//! End game result calculation
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::{ScoreBreakdown, ScoringKind, WeightedComposite};
use crate::state::{Ending, GameState, Metrics};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ResultError {
    #[error("session is still running; results are available once it ends")]
    SessionOngoing,
}

/// Complete summary of a finished session for display on the result screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub team: String,
    pub seed: u64,
    pub ending: Ending,
    pub headline: String,
    pub epilogue: String,
    /// Number of years enacted.
    pub years_played: usize,
    /// Last year recorded in history.
    pub final_year: u16,
    pub turns_rejected: u32,
    pub scoring: ScoringKind,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub initial: Metrics,
    pub stats: Metrics,
}

/// Headline shown for an ending.
#[must_use]
pub const fn headline(ending: Ending) -> &'static str {
    match ending {
        Ending::Horizon => "Mandate Complete",
        Ending::TemperatureBreach => "Climate Threshold Breached",
    }
}

fn epilogue(ending: Ending, state: &GameState) -> String {
    match ending {
        Ending::Horizon => format!(
            "{} steered the world to {} with warming held at {:.2} C.",
            state.team, state.year, state.stats.temp_rise
        ),
        Ending::TemperatureBreach => format!(
            "Warming reached {:.2} C in {}; the simulation was halted.",
            state.stats.temp_rise, state.year
        ),
    }
}

/// Generate the result summary from a finished game state.
///
/// # Errors
///
/// Returns [`ResultError::SessionOngoing`] if the session has not ended yet.
pub fn result_summary(state: &GameState, scoring: ScoringKind) -> Result<ResultSummary, ResultError> {
    let ending = match (state.game_over, state.ending) {
        (true, Some(ending)) => ending,
        _ => return Err(ResultError::SessionOngoing),
    };
    Ok(ResultSummary {
        team: state.team.clone(),
        seed: state.seed,
        ending,
        headline: headline(ending).to_string(),
        epilogue: epilogue(ending, state),
        years_played: state.turns_played(),
        final_year: state.history.last().map_or(state.year, |record| record.year),
        turns_rejected: state.turns_rejected,
        scoring,
        score: scoring.score(&state.initial_stats, &state.stats),
        breakdown: WeightedComposite::default().breakdown(&state.initial_stats, &state.stats),
        initial: state.initial_stats,
        stats: state.stats,
    })
}
