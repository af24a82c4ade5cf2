use std::fmt;
use std::str::FromStr;

use architect_game::{
    EngineConfig, GameState, PolicyAction, ScoringStrategy, TurnEngine, WeightedComposite,
};
use rand::rngs::mock::StepRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: PolicyAction,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(action: PolicyAction, rationale: Option<String>) -> Self {
        Self { action, rationale }
    }

    #[must_use]
    pub const fn hold() -> Self {
        Self::new(
            PolicyAction {
                tax: 0,
                subsidy: 0,
                regulation: 0,
            },
            None,
        )
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick the levers for the current year.
    fn decide(&mut self, state: &GameState, cfg: &EngineConfig) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameplayStrategy {
    Conservative,
    Aggressive,
    Balanced,
    Idle,
    MonteCarlo,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Conservative,
        Self::Aggressive,
        Self::Balanced,
        Self::Idle,
        Self::MonteCarlo,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Aggressive => "aggressive",
            Self::Balanced => "balanced",
            Self::Idle => "idle",
            Self::MonteCarlo => "monte-carlo",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Aggressive => "Aggressive",
            Self::Balanced => "Balanced",
            Self::Idle => "Idle",
            Self::MonteCarlo => "Monte Carlo",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Conservative => "Light sustainable package that never outspends regeneration",
            Self::Aggressive => "Largest affordable package every year",
            Self::Balanced => "Mid-sized package, easing off when capital runs low",
            Self::Idle => "Never pulls a lever",
            Self::MonteCarlo => "Samples affordable packages and keeps the best one-year score",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Conservative => Box::new(ConservativePolicy),
            Self::Aggressive => Box::new(AggressivePolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Idle => Box::new(IdlePolicy),
            Self::MonteCarlo => Box::new(MonteCarloPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key() == key)
            .ok_or_else(|| format!("unknown strategy '{s}'"))
    }
}

fn affordable(action: &PolicyAction, state: &GameState, cfg: &EngineConfig) -> bool {
    f64::from(action.cost(&cfg.costs)) <= state.stats.political_capital
}

/// First affordable package from `ladder`, or hold.
fn first_affordable(
    ladder: &[(u8, u8, u8)],
    state: &GameState,
    cfg: &EngineConfig,
) -> PolicyDecision {
    ladder
        .iter()
        .map(|&(tax, subsidy, regulation)| PolicyAction {
            tax: tax.min(cfg.limits.tax_max),
            subsidy: subsidy.min(cfg.limits.subsidy_max),
            regulation: regulation.min(cfg.limits.regulation_max),
        })
        .find(|action| affordable(action, state, cfg))
        .map_or_else(PolicyDecision::hold, |action| {
            PolicyDecision::new(action, Some(format!("cost {}", action.cost(&cfg.costs))))
        })
}

struct ConservativePolicy;
struct AggressivePolicy;
struct BalancedPolicy;
struct IdlePolicy;

struct MonteCarloPolicy {
    rng: ChaCha20Rng,
    samples: u32,
}

impl MonteCarloPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            samples: 12,
        }
    }

    fn sample(&mut self, cfg: &EngineConfig) -> PolicyAction {
        PolicyAction {
            tax: self.rng.gen_range(0..=cfg.limits.tax_max),
            subsidy: self.rng.gen_range(0..=cfg.limits.subsidy_max),
            regulation: self.rng.gen_range(0..=cfg.limits.regulation_max),
        }
    }
}

impl PlayerPolicy for ConservativePolicy {
    fn name(&self) -> &'static str {
        "Conservative"
    }

    fn decide(&mut self, state: &GameState, cfg: &EngineConfig) -> PolicyDecision {
        first_affordable(&[(2, 2, 1), (1, 1, 0)], state, cfg)
    }
}

impl PlayerPolicy for AggressivePolicy {
    fn name(&self) -> &'static str {
        "Aggressive"
    }

    fn decide(&mut self, state: &GameState, cfg: &EngineConfig) -> PolicyDecision {
        first_affordable(
            &[(20, 20, 10), (10, 10, 5), (5, 5, 3), (2, 2, 1)],
            state,
            cfg,
        )
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn decide(&mut self, state: &GameState, cfg: &EngineConfig) -> PolicyDecision {
        first_affordable(&[(5, 5, 3), (2, 3, 1)], state, cfg)
    }
}

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn decide(&mut self, _state: &GameState, _cfg: &EngineConfig) -> PolicyDecision {
        PolicyDecision::hold()
    }
}

impl PlayerPolicy for MonteCarloPolicy {
    fn name(&self) -> &'static str {
        "Monte Carlo"
    }

    fn decide(&mut self, state: &GameState, cfg: &EngineConfig) -> PolicyDecision {
        // Project one year ahead without events.
        let projector = TurnEngine::new(EngineConfig {
            event_chance: 0.0,
            ..cfg.clone()
        });
        let scoring = WeightedComposite::default();
        let mut quiet = StepRng::new(0, 0);

        let mut best = PolicyDecision::hold();
        let mut best_score = f64::NEG_INFINITY;
        for _ in 0..self.samples.max(1) {
            let candidate = self.sample(cfg);
            if !affordable(&candidate, state, cfg) {
                continue;
            }
            let mut projected = state.clone();
            if projector.enact(&mut projected, candidate, &mut quiet).is_err() {
                continue;
            }
            let score = scoring.score(&projected.initial_stats, &projected.stats);
            if score > best_score {
                best_score = score;
                best = PolicyDecision::new(candidate, Some(format!("projected {score:.2}")));
            }
        }
        best
    }
}
