//! End-of-game scoring strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numbers::{clamp_pct, percent_change, round_2dp};
use crate::state::Metrics;

/// Pure function from initial and final metrics to a composite score.
pub trait ScoringStrategy {
    fn name(&self) -> &'static str;

    /// Score a finished session. Must not depend on anything but its inputs.
    fn score(&self, initial: &Metrics, fin: &Metrics) -> f64;
}

/// Component weights for [`WeightedComposite`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub capital: f64,
    pub gdp: f64,
    pub carbon: f64,
    pub temperature: f64,
    pub renewables: f64,
    pub approval: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            capital: 0.15,
            gdp: 0.25,
            carbon: 0.20,
            temperature: 0.20,
            renewables: 0.13,
            approval: 0.07,
        }
    }
}

/// Each component normalized to `[0, 100]` before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub capital: f64,
    pub gdp: f64,
    pub carbon: f64,
    pub temperature: f64,
    pub renewables: f64,
    pub approval: f64,
}

/// Step function over final warming.
#[must_use]
pub fn temperature_band(temp_rise: f64) -> f64 {
    if temp_rise <= 1.3 {
        100.0
    } else if temp_rise <= 1.5 {
        80.0
    } else if temp_rise <= 1.7 {
        40.0
    } else {
        0.0
    }
}

/// Canonical six-component weighted score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedComposite {
    pub weights: ScoreWeights,
}

impl WeightedComposite {
    #[must_use]
    pub const fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn breakdown(&self, initial: &Metrics, fin: &Metrics) -> ScoreBreakdown {
        ScoreBreakdown {
            capital: clamp_pct(fin.political_capital),
            gdp: clamp_pct(50.0 + percent_change(initial.gdp, fin.gdp)),
            carbon: clamp_pct(-percent_change(initial.co2, fin.co2)),
            temperature: temperature_band(fin.temp_rise),
            renewables: clamp_pct(fin.renewable_pct),
            approval: clamp_pct(fin.public_approval),
        }
    }
}

impl ScoringStrategy for WeightedComposite {
    fn name(&self) -> &'static str {
        ScoringKind::Weighted.as_str()
    }

    fn score(&self, initial: &Metrics, fin: &Metrics) -> f64 {
        let parts = self.breakdown(initial, fin);
        let w = &self.weights;
        round_2dp(
            parts.capital * w.capital
                + parts.gdp * w.gdp
                + parts.carbon * w.carbon
                + parts.temperature * w.temperature
                + parts.renewables * w.renewables
                + parts.approval * w.approval,
        )
    }
}

/// Simplified unweighted score: `gdp + (100 - co2/10) + approval`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearSum;

impl ScoringStrategy for LinearSum {
    fn name(&self) -> &'static str {
        ScoringKind::Linear.as_str()
    }

    fn score(&self, _initial: &Metrics, fin: &Metrics) -> f64 {
        round_2dp(fin.gdp + (100.0 - fin.co2 / 10.0) + fin.public_approval)
    }
}

/// Selectable scoring strategy name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringKind {
    #[default]
    Weighted,
    Linear,
}

impl ScoringKind {
    pub const ALL: [Self; 2] = [Self::Weighted, Self::Linear];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Linear => "linear",
        }
    }

    #[must_use]
    pub fn strategy(self) -> Box<dyn ScoringStrategy> {
        match self {
            Self::Weighted => Box::new(WeightedComposite::default()),
            Self::Linear => Box::new(LinearSum),
        }
    }

    #[must_use]
    pub fn score(self, initial: &Metrics, fin: &Metrics) -> f64 {
        match self {
            Self::Weighted => WeightedComposite::default().score(initial, fin),
            Self::Linear => LinearSum.score(initial, fin),
        }
    }
}

impl fmt::Display for ScoringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" | "composite" => Ok(Self::Weighted),
            "linear" | "simple" => Ok(Self::Linear),
            other => Err(format!("unknown scoring strategy '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        let total = w.capital + w.gdp + w.carbon + w.temperature + w.renewables + w.approval;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn starting_world_scores_predictably() {
        let start = Metrics::default();
        let parts = WeightedComposite::default().breakdown(&start, &start);
        assert!((parts.capital - 100.0).abs() < f64::EPSILON);
        assert!((parts.gdp - 50.0).abs() < f64::EPSILON);
        assert!((parts.carbon - 0.0).abs() < f64::EPSILON);
        assert!((parts.temperature - 100.0).abs() < f64::EPSILON);
        // 15 + 12.5 + 0 + 20 + 1.95 + 4.2
        let score = WeightedComposite::default().score(&start, &start);
        assert!((score - 53.65).abs() < 1e-9);
    }

    #[test]
    fn zero_co2_baseline_yields_zero_carbon_component() {
        let initial = Metrics {
            co2: 0.0,
            ..Metrics::default()
        };
        let fin = Metrics {
            co2: 120.0,
            ..Metrics::default()
        };
        let parts = WeightedComposite::default().breakdown(&initial, &fin);
        assert!((parts.carbon - 0.0).abs() < f64::EPSILON);
        assert!(WeightedComposite::default().score(&initial, &fin).is_finite());
    }

    #[test]
    fn carbon_component_rewards_reduction() {
        let initial = Metrics::default();
        let fin = Metrics {
            co2: 225.0,
            ..Metrics::default()
        };
        let parts = WeightedComposite::default().breakdown(&initial, &fin);
        assert!((parts.carbon - 50.0).abs() < 1e-9);
    }

    #[test]
    fn components_are_clamped() {
        let initial = Metrics::default();
        let fin = Metrics {
            political_capital: -40.0,
            gdp: 50.0,
            ..Metrics::default()
        };
        let parts = WeightedComposite::default().breakdown(&initial, &fin);
        assert!((parts.capital - 0.0).abs() < f64::EPSILON);
        assert!((parts.gdp - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn temperature_band_steps() {
        assert!((temperature_band(1.3) - 100.0).abs() < f64::EPSILON);
        assert!((temperature_band(1.45) - 80.0).abs() < f64::EPSILON);
        assert!((temperature_band(1.7) - 40.0).abs() < f64::EPSILON);
        assert!((temperature_band(2.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scoring_is_idempotent() {
        let initial = Metrics::default();
        let fin = Metrics {
            gdp: 6.3,
            co2: 301.7,
            temp_rise: 1.62,
            ..Metrics::default()
        };
        for kind in ScoringKind::ALL {
            assert_eq!(kind.score(&initial, &fin), kind.score(&initial, &fin));
            assert_eq!(kind.strategy().score(&initial, &fin), kind.score(&initial, &fin));
        }
    }

    #[test]
    fn linear_sum_matches_formula() {
        let fin = Metrics {
            gdp: 6.0,
            co2: 300.0,
            public_approval: 55.0,
            ..Metrics::default()
        };
        assert!((LinearSum.score(&Metrics::default(), &fin) - 131.0).abs() < 1e-9);
        assert_eq!(LinearSum.name(), "linear");
    }

    #[test]
    fn kinds_parse_from_cli_names() {
        assert_eq!("weighted".parse(), Ok(ScoringKind::Weighted));
        assert_eq!("Linear".parse(), Ok(ScoringKind::Linear));
        assert!("median".parse::<ScoringKind>().is_err());
    }
}
