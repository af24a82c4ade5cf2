//! Per-turn row schema and the sink contract for external tabular logging.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::action::PolicyAction;
use crate::constants::{LOG_SINK_EXHAUSTED, LOG_SINK_RETRY, SINK_INITIAL_DELAY_MS, SINK_MAX_ATTEMPTS};
use crate::numbers::round_2dp;
use crate::scoring::{ScoringStrategy, WeightedComposite};
use crate::state::GameState;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sink transport failed: {0}")]
    Transport(String),
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<PersistenceError>,
    },
}

/// One row appended per accepted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRow {
    pub timestamp: String,
    pub team: String,
    pub year: u16,
    pub tax: u8,
    pub subsidy: u8,
    pub regulation: u8,
    pub gdp: f64,
    pub co2: f64,
    pub renewable_pct: f64,
    pub public_approval: f64,
    pub political_capital: f64,
    pub temp_rise: f64,
    pub event: String,
    pub status: String,
    pub score: f64,
}

impl TurnRow {
    pub const HEADER: [&'static str; 15] = [
        "timestamp",
        "team",
        "year",
        "tax",
        "subsidy",
        "regulation",
        "gdp",
        "co2",
        "renewable_pct",
        "public_approval",
        "political_capital",
        "temp_rise",
        "event",
        "status",
        "score",
    ];

    /// Row for the turn just applied to `state`.
    ///
    /// `year` is the enacted year from the latest history record; the score is
    /// the canonical weighted composite against the session's initial stats.
    #[must_use]
    pub fn from_state(state: &GameState, action: &PolicyAction, timestamp: DateTime<Utc>) -> Self {
        let stats = &state.stats;
        let year = state.history.last().map_or(state.year, |record| record.year);
        Self {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            team: state.team.clone(),
            year,
            tax: action.tax,
            subsidy: action.subsidy,
            regulation: action.regulation,
            gdp: round_2dp(stats.gdp),
            co2: round_2dp(stats.co2),
            renewable_pct: round_2dp(stats.renewable_pct),
            public_approval: stats.public_approval,
            political_capital: stats.political_capital,
            temp_rise: round_2dp(stats.temp_rise),
            event: state.last_event.clone(),
            status: state.status_label().to_string(),
            score: WeightedComposite::default().score(&state.initial_stats, stats),
        }
    }

    /// Field values in [`TurnRow::HEADER`] order.
    #[must_use]
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.team.clone(),
            self.year.to_string(),
            self.tax.to_string(),
            self.subsidy.to_string(),
            self.regulation.to_string(),
            format!("{:.2}", self.gdp),
            format!("{:.2}", self.co2),
            format!("{:.2}", self.renewable_pct),
            self.public_approval.to_string(),
            self.political_capital.to_string(),
            format!("{:.2}", self.temp_rise),
            self.event.clone(),
            self.status.clone(),
            self.score.to_string(),
        ]
    }
}

/// Destination for turn rows. Implementations perform a single attempt.
pub trait RowSink {
    /// Append one row.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when the transport rejects the write.
    fn append_row(&mut self, row: &TurnRow) -> Result<(), PersistenceError>;
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn append_row(&mut self, row: &TurnRow) -> Result<(), PersistenceError> {
        (**self).append_row(row)
    }
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    rows: Vec<TurnRow>,
}

impl MemorySink {
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    #[must_use]
    pub fn rows(&self) -> &[TurnRow] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<TurnRow> {
        self.rows
    }
}

impl RowSink for MemorySink {
    fn append_row(&mut self, row: &TurnRow) -> Result<(), PersistenceError> {
        self.rows.push(row.clone());
        Ok(())
    }
}

/// Blocks between retry attempts.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Records requested delays without sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    pub delays: Vec<Duration>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: SINK_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(SINK_INITIAL_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, given `attempt` failures so far (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

/// Append `row`, retrying with backoff until it lands or the policy is exhausted.
///
/// No delay follows the final failed attempt.
///
/// # Errors
///
/// Returns [`PersistenceError::Exhausted`] wrapping the last failure.
pub fn append_with_retry<S, Z>(
    sink: &mut S,
    row: &TurnRow,
    policy: &RetryPolicy,
    sleeper: &mut Z,
) -> Result<(), PersistenceError>
where
    S: RowSink + ?Sized,
    Z: Sleeper + ?Sized,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match sink.append_row(row) {
            Ok(()) => return Ok(()),
            Err(err) if attempt >= attempts => {
                log::error!(
                    target: LOG_SINK_EXHAUSTED,
                    "row for {} {} dropped after {attempt} attempts: {err}",
                    row.team,
                    row.year
                );
                return Err(PersistenceError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            Err(err) => {
                let delay = policy.delay_after(attempt);
                log::warn!(
                    target: LOG_SINK_RETRY,
                    "append attempt {attempt}/{attempts} failed: {err}; retrying in {delay:?}"
                );
                sleeper.sleep(delay);
                attempt += 1;
            }
        }
    }
}
