use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::constants::{
    GDP_FLOOR, INITIAL_APPROVAL, INITIAL_CAPITAL, INITIAL_CO2, INITIAL_GDP,
    INITIAL_RENEWABLE_PCT, INITIAL_TEMP_RISE, PCT_MAX, PCT_MIN, START_YEAR, WELCOME_NARRATIVE,
};
use crate::engine::TurnOutcome;
use crate::history::HistoryLog;

/// Identifier for one of the six world indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Gdp,
    Co2,
    TempRise,
    PublicApproval,
    PoliticalCapital,
    RenewablePct,
}

impl MetricKey {
    pub const ALL: [Self; 6] = [
        Self::Gdp,
        Self::Co2,
        Self::TempRise,
        Self::PublicApproval,
        Self::PoliticalCapital,
        Self::RenewablePct,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gdp => "gdp",
            Self::Co2 => "co2",
            Self::TempRise => "temp_rise",
            Self::PublicApproval => "public_approval",
            Self::PoliticalCapital => "political_capital",
            Self::RenewablePct => "renewable_pct",
        }
    }

    /// Human readable label used in narratives and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gdp => "GDP",
            Self::Co2 => "CO2",
            Self::TempRise => "Temp Rise",
            Self::PublicApproval => "Public Approval",
            Self::PoliticalCapital => "Political Capital",
            Self::RenewablePct => "Renewables",
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Gdp => "T",
            Self::Co2 => " Gt",
            Self::TempRise => " C",
            Self::PublicApproval | Self::RenewablePct => "%",
            Self::PoliticalCapital => "",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

/// Snapshot of world condition: the six scalar indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Trillions of currency units.
    pub gdp: f64,
    /// Gigatons, never negative after a turn.
    pub co2: f64,
    /// Degrees above baseline.
    pub temp_rise: f64,
    pub public_approval: f64,
    pub political_capital: f64,
    pub renewable_pct: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            gdp: INITIAL_GDP,
            co2: INITIAL_CO2,
            temp_rise: INITIAL_TEMP_RISE,
            public_approval: INITIAL_APPROVAL,
            political_capital: INITIAL_CAPITAL,
            renewable_pct: INITIAL_RENEWABLE_PCT,
        }
    }
}

impl Metrics {
    #[must_use]
    pub const fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Gdp => self.gdp,
            MetricKey::Co2 => self.co2,
            MetricKey::TempRise => self.temp_rise,
            MetricKey::PublicApproval => self.public_approval,
            MetricKey::PoliticalCapital => self.political_capital,
            MetricKey::RenewablePct => self.renewable_pct,
        }
    }

    pub const fn get_mut(&mut self, key: MetricKey) -> &mut f64 {
        match key {
            MetricKey::Gdp => &mut self.gdp,
            MetricKey::Co2 => &mut self.co2,
            MetricKey::TempRise => &mut self.temp_rise,
            MetricKey::PublicApproval => &mut self.public_approval,
            MetricKey::PoliticalCapital => &mut self.political_capital,
            MetricKey::RenewablePct => &mut self.renewable_pct,
        }
    }

    /// Add `delta` to a metric without clamping.
    pub fn apply_delta(&mut self, key: MetricKey, delta: f64) {
        *self.get_mut(key) += delta;
    }

    /// Enforce the field bounds that hold after every turn.
    ///
    /// `political_capital` and `temp_rise` are left untouched.
    pub fn clamp(&mut self) {
        self.co2 = self.co2.max(0.0);
        self.gdp = self.gdp.max(GDP_FLOOR);
        self.public_approval = self.public_approval.clamp(PCT_MIN, PCT_MAX);
        self.renewable_pct = self.renewable_pct.clamp(PCT_MIN, PCT_MAX);
    }
}

/// Terminal condition reached by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// The final horizon year was enacted.
    Horizon,
    /// Warming reached the breach threshold.
    TemperatureBreach,
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizon => write!(f, "horizon"),
            Self::TemperatureBreach => write!(f, "temperature_breach"),
        }
    }
}

/// Complete per-team session data. Mutated only by the turn engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Opaque team identity supplied by the authentication layer.
    pub team: String,
    pub seed: u64,
    /// Year the next policy will be enacted for.
    pub year: u16,
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<Ending>,
    pub last_event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<TurnOutcome>,
    pub stats: Metrics,
    /// Baseline used by scoring.
    pub initial_stats: Metrics,
    #[serde(default)]
    pub history: HistoryLog,
    #[serde(default)]
    pub turns_rejected: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            team: String::new(),
            seed: 0,
            year: START_YEAR,
            game_over: false,
            ending: None,
            last_event: WELCOME_NARRATIVE.to_string(),
            last_outcome: None,
            stats: Metrics::default(),
            initial_stats: Metrics::default(),
            history: HistoryLog::new(),
            turns_rejected: 0,
        }
    }
}

impl GameState {
    /// Fresh state for a team using the configured calendar and starting world.
    #[must_use]
    pub fn new(team: impl Into<String>, seed: u64, cfg: &EngineConfig) -> Self {
        Self {
            team: team.into(),
            seed,
            year: cfg.calendar.start_year,
            stats: cfg.initial,
            initial_stats: cfg.initial,
            ..Self::default()
        }
    }

    /// Number of turns that were accepted and recorded.
    #[must_use]
    pub fn turns_played(&self) -> usize {
        self.history.len()
    }

    /// Status label used by persistence rows.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.game_over { "ENDED" } else { "ONGOING" }
    }
}
