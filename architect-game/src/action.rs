//! Policy levers chosen once per simulated year.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CostWeights, LeverLimits};
use crate::engine::TurnError;

/// One of the three policy levers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    Tax,
    Subsidy,
    Regulation,
}

impl Lever {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tax => "tax",
            Self::Subsidy => "subsidy",
            Self::Regulation => "regulation",
        }
    }
}

impl fmt::Display for Lever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated lever triple for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PolicyAction {
    pub tax: u8,
    pub subsidy: u8,
    pub regulation: u8,
}

impl PolicyAction {
    /// Build an action from raw lever inputs, checking the default lever limits.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::InvalidAction`] when any lever lies outside its range.
    /// Values are never clamped.
    pub fn new(tax: i64, subsidy: i64, regulation: i64) -> Result<Self, TurnError> {
        Self::with_limits(tax, subsidy, regulation, &LeverLimits::default())
    }

    /// Build an action from raw lever inputs against explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::InvalidAction`] when any lever lies outside its range.
    pub fn with_limits(
        tax: i64,
        subsidy: i64,
        regulation: i64,
        limits: &LeverLimits,
    ) -> Result<Self, TurnError> {
        Ok(Self {
            tax: checked_lever(Lever::Tax, tax, limits.tax_max)?,
            subsidy: checked_lever(Lever::Subsidy, subsidy, limits.subsidy_max)?,
            regulation: checked_lever(Lever::Regulation, regulation, limits.regulation_max)?,
        })
    }

    /// Re-check an already constructed action against `limits`.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::InvalidAction`] for the first lever above its limit.
    pub fn validate(&self, limits: &LeverLimits) -> Result<(), TurnError> {
        Self::with_limits(
            i64::from(self.tax),
            i64::from(self.subsidy),
            i64::from(self.regulation),
            limits,
        )
        .map(|_| ())
    }

    /// Political capital charged to enact this action. Saturates at `u32::MAX`,
    /// which no capital balance can afford.
    #[must_use]
    pub fn cost(&self, weights: &CostWeights) -> u32 {
        weights
            .checked_cost(self.tax, self.subsidy, self.regulation)
            .unwrap_or(u32::MAX)
    }

    #[must_use]
    pub const fn level(&self, lever: Lever) -> u8 {
        match lever {
            Lever::Tax => self.tax,
            Lever::Subsidy => self.subsidy,
            Lever::Regulation => self.regulation,
        }
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tax={} subsidy={} regulation={}",
            self.tax, self.subsidy, self.regulation
        )
    }
}

fn checked_lever(lever: Lever, value: i64, max: u8) -> Result<u8, TurnError> {
    u8::try_from(value)
        .ok()
        .filter(|level| *level <= max)
        .ok_or(TurnError::InvalidAction { lever, value, max })
}
