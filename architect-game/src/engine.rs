//! Per-year turn resolution.
//!
//! A turn charges political capital for the chosen levers, moves the economy,
//! emissions, renewables, temperature and approval, records a history snapshot,
//! and then either ends the session or advances the calendar and rolls for a
//! random event.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{Lever, PolicyAction};
use crate::config::EngineConfig;
use crate::constants::{
    BREACH_NARRATIVE, HORIZON_NARRATIVE, LOG_SESSION_ENDED, LOG_TURN_ENACTED, LOG_TURN_REJECTED,
    MSG_FINAL_POLICY_ENACTED, MSG_POLICY_ENACTED, MSG_TEMPERATURE_BREACH, STABLE_NARRATIVE,
};
use crate::events::{EventCatalog, EventOutcome, catalog};
use crate::history::HistoryRecord;
use crate::state::{Ending, GameState};

/// Reasons a submitted turn is refused. State is unchanged in every case.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TurnError {
    #[error("invalid action: {lever} must be between 0 and {max} (got {value})")]
    InvalidAction { lever: Lever, value: i64, max: u8 },
    #[error("insufficient political capital: policy costs {cost}, only {available:.1} available")]
    InsufficientCapital { cost: u32, available: f64 },
    #[error("session has ended; reset to play again")]
    GameOver,
}

/// Record of an accepted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Year the policy was enacted for.
    pub year: u16,
    pub action: PolicyAction,
    pub cost: u32,
    pub growth_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<Ending>,
    pub message: String,
}

impl TurnOutcome {
    /// Narrative for the event slot of this turn.
    #[must_use]
    pub fn narrative(&self) -> &str {
        match (&self.event, self.ending) {
            (Some(event), _) => &event.narrative,
            (None, Some(Ending::Horizon)) => HORIZON_NARRATIVE,
            (None, Some(Ending::TemperatureBreach)) => BREACH_NARRATIVE,
            (None, None) => STABLE_NARRATIVE,
        }
    }
}

/// Stateless turn resolver bound to a configuration and an event catalog.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    cfg: EngineConfig,
    catalog: EventCatalog,
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TurnEngine {
    /// Engine using the embedded event catalog, gated by the configured chance.
    #[must_use]
    pub fn new(cfg: EngineConfig) -> Self {
        let catalog = catalog().clone().with_chance(cfg.event_chance);
        Self { cfg, catalog }
    }

    /// Engine with an explicit catalog. The catalog's own chance is used as-is.
    #[must_use]
    pub const fn with_catalog(cfg: EngineConfig, catalog: EventCatalog) -> Self {
        Self { cfg, catalog }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// `base_rate - tax_drag*tax - regulation_drag*regulation + subsidy_boost*subsidy`
    #[must_use]
    pub fn growth_rate(&self, action: &PolicyAction) -> f64 {
        let growth = &self.cfg.growth;
        growth.base_rate - growth.tax_drag * f64::from(action.tax)
            - growth.regulation_drag * f64::from(action.regulation)
            + growth.subsidy_boost * f64::from(action.subsidy)
    }

    /// Resolve one year of policy against `state`.
    ///
    /// # Errors
    ///
    /// * [`TurnError::GameOver`] when the session already ended.
    /// * [`TurnError::InvalidAction`] when a lever exceeds the configured limits.
    /// * [`TurnError::InsufficientCapital`] when the action costs more political
    ///   capital than is available; only the rejection counter changes.
    pub fn enact<R>(
        &self,
        state: &mut GameState,
        action: PolicyAction,
        rng: &mut R,
    ) -> Result<TurnOutcome, TurnError>
    where
        R: Rng + ?Sized,
    {
        if state.game_over {
            return Err(TurnError::GameOver);
        }
        action.validate(&self.cfg.limits)?;

        let cost = action.cost(&self.cfg.costs);
        let available = state.stats.political_capital;
        if available < f64::from(cost) {
            state.turns_rejected = state.turns_rejected.saturating_add(1);
            log::debug!(
                target: LOG_TURN_REJECTED,
                "{} rejected {action} in {}: cost {cost} > capital {available:.1}",
                state.team,
                state.year
            );
            return Err(TurnError::InsufficientCapital { cost, available });
        }

        let growth_rate = self.apply_policy(state, &action, cost);
        let enacted_year = state.year;
        state.history.append(HistoryRecord {
            year: enacted_year,
            metrics: state.stats,
        });

        let mut outcome = TurnOutcome {
            year: enacted_year,
            action,
            cost,
            growth_rate,
            event: None,
            ending: None,
            message: MSG_POLICY_ENACTED.to_string(),
        };

        if let Some(ending) = self.terminal_after_update(state, enacted_year) {
            Self::finish(state, &mut outcome, ending);
            return Ok(outcome);
        }

        state.year = enacted_year.saturating_add(1);
        outcome.event = self.catalog.roll(&mut state.stats, rng);
        state.stats.clamp();
        state.last_event = outcome.narrative().to_string();

        if state.stats.temp_rise >= self.cfg.feedback.breach_temp {
            Self::finish(state, &mut outcome, Ending::TemperatureBreach);
            return Ok(outcome);
        }

        log::debug!(
            target: LOG_TURN_ENACTED,
            "{} enacted {action} for {enacted_year}: cost {cost}, growth {growth_rate:.4}, event {}",
            state.team,
            outcome.event.as_ref().map_or("none", |event| event.event_id.as_str())
        );
        state.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Deterministic part of the turn: capital, economy, emissions, climate, approval.
    fn apply_policy(&self, state: &mut GameState, action: &PolicyAction, cost: u32) -> f64 {
        let cfg = &self.cfg;
        let stats = &mut state.stats;

        stats.political_capital -= f64::from(cost);
        stats.political_capital += cfg.capital_regen;

        let growth_rate = self.growth_rate(action);
        stats.gdp *= 1.0 + growth_rate;

        let cut = cfg.emissions.per_tax * f64::from(action.tax)
            + cfg.emissions.per_subsidy * f64::from(action.subsidy)
            + cfg.emissions.per_regulation * f64::from(action.regulation);
        stats.co2 = (stats.co2 - cut).max(0.0);

        stats.renewable_pct += cfg.emissions.renewable_per_subsidy * f64::from(action.subsidy);

        stats.temp_rise += if stats.co2 > cfg.feedback.co2_threshold {
            cfg.feedback.hot_step
        } else {
            cfg.feedback.mild_step
        };

        let mut approval_delta = 0.0;
        if growth_rate < 0.0 {
            approval_delta -= cfg.approval.recession_penalty;
        }
        if stats.temp_rise > cfg.approval.heat_threshold {
            approval_delta -= cfg.approval.heat_penalty;
        }
        if action.subsidy > cfg.approval.subsidy_threshold {
            approval_delta += cfg.approval.subsidy_bonus;
        }
        stats.public_approval += approval_delta;

        stats.clamp();
        growth_rate
    }

    fn terminal_after_update(&self, state: &GameState, enacted_year: u16) -> Option<Ending> {
        if state.stats.temp_rise >= self.cfg.feedback.breach_temp {
            Some(Ending::TemperatureBreach)
        } else if enacted_year >= self.cfg.calendar.end_year {
            Some(Ending::Horizon)
        } else {
            None
        }
    }

    fn finish(state: &mut GameState, outcome: &mut TurnOutcome, ending: Ending) {
        state.game_over = true;
        state.ending = Some(ending);
        outcome.ending = Some(ending);
        outcome.message = match ending {
            Ending::Horizon => MSG_FINAL_POLICY_ENACTED,
            Ending::TemperatureBreach => MSG_TEMPERATURE_BREACH,
        }
        .to_string();
        if outcome.event.is_none() {
            state.last_event = outcome.narrative().to_string();
        }
        log::info!(
            target: LOG_SESSION_ENDED,
            "{} session ended ({ending}) after enacting {}",
            state.team,
            outcome.year
        );
        state.last_outcome = Some(outcome.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Metrics;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn quiet_engine() -> TurnEngine {
        TurnEngine::new(EngineConfig {
            event_chance: 0.0,
            ..EngineConfig::default()
        })
    }

    fn fresh_state() -> GameState {
        GameState::new("Delegation", 1, &EngineConfig::default())
    }

    #[test]
    fn reference_turn_matches_expected_metrics() {
        let engine = quiet_engine();
        let mut state = fresh_state();
        let mut rng = SmallRng::seed_from_u64(1);
        let action = PolicyAction::new(5, 5, 3).unwrap();

        let outcome = engine.enact(&mut state, action, &mut rng).unwrap();

        assert_eq!(outcome.cost, 37);
        assert_eq!(outcome.year, 2025);
        assert_eq!(outcome.message, "policy enacted");
        assert!((state.stats.political_capital - 81.0).abs() < 1e-9);
        assert!((state.stats.co2 - 413.9).abs() < 1e-9);
        assert!((state.stats.temp_rise - 1.15).abs() < 1e-9);
        assert!((state.stats.renewable_pct - 21.0).abs() < 1e-9);
        assert!((state.stats.gdp - 5.0875).abs() < 1e-9);
        assert!((state.stats.public_approval - 60.0).abs() < 1e-9);
        assert_eq!(state.year, 2026);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.last().map(|r| r.year), Some(2025));
        assert_eq!(state.last_event, STABLE_NARRATIVE);
    }

    #[test]
    fn oversized_cost_weights_reject_instead_of_panicking() {
        let mut cfg = EngineConfig::default();
        cfg.costs.tax = 300_000_000;
        let engine = TurnEngine::new(cfg);
        let mut state = fresh_state();
        let mut rng = SmallRng::seed_from_u64(1);

        let err = engine
            .enact(&mut state, PolicyAction::new(20, 0, 0).unwrap(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, TurnError::InsufficientCapital { cost: u32::MAX, .. }));
        assert!(state.history.is_empty());
    }

    #[test]
    fn unaffordable_turn_leaves_state_untouched() {
        let engine = TurnEngine::default();
        let mut state = fresh_state();
        state.stats.political_capital = 5.0;
        let before = state.clone();
        let mut rng = SmallRng::seed_from_u64(2);

        let err = engine
            .enact(&mut state, PolicyAction::new(5, 5, 3).unwrap(), &mut rng)
            .unwrap_err();

        assert!(err.to_string().contains("insufficient political capital"));
        assert_eq!(state.stats, before.stats);
        assert_eq!(state.history, before.history);
        assert_eq!(state.year, before.year);
        assert_eq!(state.turns_rejected, 1);
    }

    #[test]
    fn approval_rules_stack() {
        let engine = quiet_engine();
        let mut state = fresh_state();
        state.stats.temp_rise = 1.6;
        let mut rng = SmallRng::seed_from_u64(3);
        // growth = 0.023 - 0.04 - 0.01 + 0.009 < 0, subsidy 6 > 5, temp above 1.5
        let action = PolicyAction::new(20, 6, 10).unwrap();
        state.stats.political_capital = 200.0;

        let outcome = engine.enact(&mut state, action, &mut rng).unwrap();

        assert!(outcome.growth_rate < 0.0);
        assert!((state.stats.public_approval - (60.0 - 2.0 - 5.0 + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn low_emissions_take_the_mild_feedback_step() {
        let engine = quiet_engine();
        let mut state = fresh_state();
        state.stats.co2 = 100.0;
        let mut rng = SmallRng::seed_from_u64(4);

        engine
            .enact(&mut state, PolicyAction::default(), &mut rng)
            .unwrap();

        assert!((state.stats.temp_rise - 1.11).abs() < 1e-9);
        assert!((state.stats.political_capital - 118.0).abs() < 1e-9);
    }

    #[test]
    fn co2_and_renewables_are_clamped() {
        let engine = quiet_engine();
        let mut state = fresh_state();
        state.stats.co2 = 10.0;
        state.stats.renewable_pct = 95.0;
        let mut rng = SmallRng::seed_from_u64(5);

        engine
            .enact(&mut state, PolicyAction::new(0, 20, 0).unwrap(), &mut rng)
            .unwrap();

        assert!((state.stats.co2 - 0.0).abs() < f64::EPSILON);
        assert!((state.stats.renewable_pct - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn final_year_ends_without_event_or_increment() {
        let engine = TurnEngine::with_catalog(
            EngineConfig::default(),
            catalog().clone().with_chance(1.0),
        );
        let mut state = fresh_state();
        state.year = 2050;
        let mut rng = SmallRng::seed_from_u64(6);

        let outcome = engine
            .enact(&mut state, PolicyAction::default(), &mut rng)
            .unwrap();

        assert!(state.game_over);
        assert_eq!(state.ending, Some(Ending::Horizon));
        assert_eq!(state.year, 2050);
        assert!(outcome.event.is_none());
        assert_eq!(outcome.message, MSG_FINAL_POLICY_ENACTED);
        assert_eq!(state.last_event, HORIZON_NARRATIVE);
        assert_eq!(
            engine.enact(&mut state, PolicyAction::default(), &mut rng),
            Err(TurnError::GameOver)
        );
    }

    #[test]
    fn temperature_breach_is_terminal() {
        let engine = TurnEngine::with_catalog(
            EngineConfig::default(),
            catalog().clone().with_chance(1.0),
        );
        let mut state = fresh_state();
        state.stats.temp_rise = 1.96;
        let mut rng = SmallRng::seed_from_u64(7);

        let outcome = engine
            .enact(&mut state, PolicyAction::default(), &mut rng)
            .unwrap();

        assert_eq!(outcome.ending, Some(Ending::TemperatureBreach));
        assert!(state.game_over);
        assert_eq!(state.year, 2025);
        assert!(outcome.event.is_none());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn event_effects_follow_history_snapshot() {
        let engine = TurnEngine::with_catalog(
            EngineConfig::default(),
            catalog().clone().with_chance(1.0),
        );
        let mut state = fresh_state();
        let mut rng = SmallRng::seed_from_u64(8);

        let outcome = engine
            .enact(&mut state, PolicyAction::default(), &mut rng)
            .unwrap();

        let event = outcome.event.as_ref().expect("certain event");
        let snapshot = state.history.last().expect("record").metrics;
        let mut expected = snapshot;
        for delta in &event.impact {
            expected.apply_delta(delta.metric, delta.delta);
        }
        expected.clamp();
        assert_eq!(state.stats, expected);
        assert_eq!(state.last_event, event.narrative);
    }

    #[test]
    fn levers_above_configured_limits_are_invalid() {
        let engine = TurnEngine::new(EngineConfig {
            limits: crate::config::LeverLimits {
                regulation_max: 5,
                ..crate::config::LeverLimits::default()
            },
            ..EngineConfig::default()
        });
        let mut state = fresh_state();
        let mut rng = SmallRng::seed_from_u64(9);
        let err = engine
            .enact(&mut state, PolicyAction::new(0, 0, 6).unwrap(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, TurnError::InvalidAction { lever: Lever::Regulation, .. }));
        assert_eq!(state.stats, Metrics::default());
        assert_eq!(state.turns_rejected, 0);
    }
}
