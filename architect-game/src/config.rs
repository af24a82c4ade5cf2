//! Tunable engine coefficients.
//!
//! Every field has a serde default equal to the reference balance in
//! [`crate::constants`], so a partial JSON document only needs to name the
//! values it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    APPROVAL_HEAT_PENALTY, APPROVAL_HEAT_THRESHOLD, APPROVAL_RECESSION_PENALTY,
    APPROVAL_SUBSIDY_BONUS, APPROVAL_SUBSIDY_THRESHOLD, BREACH_TEMP, CAPITAL_REGEN,
    CO2_PER_REGULATION, CO2_PER_SUBSIDY, CO2_PER_TAX, COST_PER_REGULATION, COST_PER_SUBSIDY,
    COST_PER_TAX, END_YEAR, EVENT_CHANCE, FEEDBACK_CO2_THRESHOLD, FEEDBACK_HOT_STEP,
    FEEDBACK_MILD_STEP, GROWTH_BASE_RATE, GROWTH_REGULATION_DRAG, GROWTH_SUBSIDY_BOOST,
    GROWTH_TAX_DRAG, REGULATION_MAX, RENEWABLE_PER_SUBSIDY, START_YEAR, SUBSIDY_MAX, TAX_MAX,
};
use crate::state::Metrics;

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min:.4} (got {value:.4})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.4} and {max:.4} (got {value:.4})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("cost weights overflow: the most expensive action costs more than {max}")]
    CostOverflow { max: u32 },
    #[error("calendar invalid (start {start} > end {end})")]
    CalendarRange { start: u16, end: u16 },
    #[error("invalid engine config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Upper bounds for each lever; the lower bound is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverLimits {
    #[serde(default = "LeverLimits::default_tax_max")]
    pub tax_max: u8,
    #[serde(default = "LeverLimits::default_subsidy_max")]
    pub subsidy_max: u8,
    #[serde(default = "LeverLimits::default_regulation_max")]
    pub regulation_max: u8,
}

impl LeverLimits {
    const fn default_tax_max() -> u8 {
        TAX_MAX
    }

    const fn default_subsidy_max() -> u8 {
        SUBSIDY_MAX
    }

    const fn default_regulation_max() -> u8 {
        REGULATION_MAX
    }
}

impl Default for LeverLimits {
    fn default() -> Self {
        Self {
            tax_max: Self::default_tax_max(),
            subsidy_max: Self::default_subsidy_max(),
            regulation_max: Self::default_regulation_max(),
        }
    }
}

/// Political capital charged per lever step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    pub tax: u32,
    pub subsidy: u32,
    pub regulation: u32,
}

impl CostWeights {
    /// `tax*w_tax + subsidy*w_subsidy + regulation*w_regulation`, `None` on overflow.
    #[must_use]
    pub fn checked_cost(&self, tax: u8, subsidy: u8, regulation: u8) -> Option<u32> {
        self.tax
            .checked_mul(u32::from(tax))?
            .checked_add(self.subsidy.checked_mul(u32::from(subsidy))?)?
            .checked_add(self.regulation.checked_mul(u32::from(regulation))?)
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            tax: COST_PER_TAX,
            subsidy: COST_PER_SUBSIDY,
            regulation: COST_PER_REGULATION,
        }
    }
}

/// `growth = base_rate - tax_drag*tax - regulation_drag*regulation + subsidy_boost*subsidy`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub base_rate: f64,
    pub tax_drag: f64,
    pub regulation_drag: f64,
    pub subsidy_boost: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            base_rate: GROWTH_BASE_RATE,
            tax_drag: GROWTH_TAX_DRAG,
            regulation_drag: GROWTH_REGULATION_DRAG,
            subsidy_boost: GROWTH_SUBSIDY_BOOST,
        }
    }
}

/// Emission cuts per lever step plus the renewable build-out rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionsConfig {
    pub per_tax: f64,
    pub per_subsidy: f64,
    pub per_regulation: f64,
    pub renewable_per_subsidy: f64,
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        Self {
            per_tax: CO2_PER_TAX,
            per_subsidy: CO2_PER_SUBSIDY,
            per_regulation: CO2_PER_REGULATION,
            renewable_per_subsidy: RENEWABLE_PER_SUBSIDY,
        }
    }
}

/// Temperature feedback. Both steps are non-negative so warming never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub co2_threshold: f64,
    pub hot_step: f64,
    pub mild_step: f64,
    pub breach_temp: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            co2_threshold: FEEDBACK_CO2_THRESHOLD,
            hot_step: FEEDBACK_HOT_STEP,
            mild_step: FEEDBACK_MILD_STEP,
            breach_temp: BREACH_TEMP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    pub recession_penalty: f64,
    pub heat_threshold: f64,
    pub heat_penalty: f64,
    pub subsidy_threshold: u8,
    pub subsidy_bonus: f64,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            recession_penalty: APPROVAL_RECESSION_PENALTY,
            heat_threshold: APPROVAL_HEAT_THRESHOLD,
            heat_penalty: APPROVAL_HEAT_PENALTY,
            subsidy_threshold: APPROVAL_SUBSIDY_THRESHOLD,
            subsidy_bonus: APPROVAL_SUBSIDY_BONUS,
        }
    }
}

/// First and last enactable years, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    #[serde(default = "Calendar::default_start_year")]
    pub start_year: u16,
    #[serde(default = "Calendar::default_end_year")]
    pub end_year: u16,
}

impl Calendar {
    const fn default_start_year() -> u16 {
        START_YEAR
    }

    const fn default_end_year() -> u16 {
        END_YEAR
    }

    /// Number of turns in a session that reaches the horizon.
    #[must_use]
    pub const fn horizon_turns(&self) -> u16 {
        self.end_year.saturating_sub(self.start_year).saturating_add(1)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            start_year: Self::default_start_year(),
            end_year: Self::default_end_year(),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub limits: LeverLimits,
    #[serde(default)]
    pub costs: CostWeights,
    #[serde(default = "EngineConfig::default_capital_regen")]
    pub capital_regen: f64,
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default)]
    pub emissions: EmissionsConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub approval: ApprovalConfig,
    #[serde(default)]
    pub calendar: Calendar,
    #[serde(default = "EngineConfig::default_event_chance")]
    pub event_chance: f64,
    #[serde(default)]
    pub initial: Metrics,
}

impl EngineConfig {
    const fn default_capital_regen() -> f64 {
        CAPITAL_REGEN
    }

    const fn default_event_chance() -> f64 {
        EVENT_CHANCE
    }

    /// Parse a (possibly partial) JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input, or the first
    /// validation failure.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar.start_year > self.calendar.end_year {
            return Err(ConfigError::CalendarRange {
                start: self.calendar.start_year,
                end: self.calendar.end_year,
            });
        }
        let limits = &self.limits;
        if self
            .costs
            .checked_cost(limits.tax_max, limits.subsidy_max, limits.regulation_max)
            .is_none()
        {
            return Err(ConfigError::CostOverflow { max: u32::MAX });
        }
        if !(0.0..=1.0).contains(&self.event_chance) {
            return Err(ConfigError::RangeViolation {
                field: "event_chance",
                min: 0.0,
                max: 1.0,
                value: self.event_chance,
            });
        }
        let floors = [
            ("capital_regen", self.capital_regen),
            ("emissions.per_tax", self.emissions.per_tax),
            ("emissions.per_subsidy", self.emissions.per_subsidy),
            ("emissions.per_regulation", self.emissions.per_regulation),
            (
                "emissions.renewable_per_subsidy",
                self.emissions.renewable_per_subsidy,
            ),
            ("feedback.hot_step", self.feedback.hot_step),
            ("feedback.mild_step", self.feedback.mild_step),
            ("approval.recession_penalty", self.approval.recession_penalty),
            ("approval.heat_penalty", self.approval.heat_penalty),
            ("approval.subsidy_bonus", self.approval.subsidy_bonus),
            ("initial.gdp", self.initial.gdp),
            ("initial.co2", self.initial.co2),
            ("initial.temp_rise", self.initial.temp_rise),
        ];
        for (field, value) in floors {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 0.0,
                    value,
                });
            }
        }
        for (field, value) in [
            ("initial.public_approval", self.initial.public_approval),
            ("initial.renewable_pct", self.initial.renewable_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 100.0,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: LeverLimits::default(),
            costs: CostWeights::default(),
            capital_regen: Self::default_capital_regen(),
            growth: GrowthConfig::default(),
            emissions: EmissionsConfig::default(),
            feedback: FeedbackConfig::default(),
            approval: ApprovalConfig::default(),
            calendar: Calendar::default(),
            event_chance: Self::default_event_chance(),
            initial: Metrics::default(),
        }
    }
}
