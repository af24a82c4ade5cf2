//! Session wrapper that owns a team's state, turn engine, and RNG streams.

use crate::action::PolicyAction;
use crate::config::EngineConfig;
use crate::engine::{TurnEngine, TurnError, TurnOutcome};
use crate::rng::RngBundle;
use crate::scoring::ScoringStrategy;
use crate::state::GameState;

/// One team's play-through. Callers hold it exclusively and mutate it through
/// `&mut self`.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    engine: TurnEngine,
    rng: RngBundle,
}

impl GameSession {
    /// Construct a fresh session for `team` with the starting world from `cfg`.
    #[must_use]
    pub fn new(team: impl Into<String>, seed: u64, cfg: EngineConfig) -> Self {
        let state = GameState::new(team, seed, &cfg);
        Self::from_state(state, cfg)
    }

    /// Build a session from an existing game state, e.g. a persisted snapshot.
    ///
    /// Event draws continue from the turn count recorded in the history, so a
    /// restored session plays out exactly as the original would have.
    #[must_use]
    pub fn from_state(state: GameState, cfg: EngineConfig) -> Self {
        let rng = RngBundle::from_user_seed(state.seed);
        Self {
            state,
            engine: TurnEngine::new(cfg),
            rng,
        }
    }

    /// Session with an explicit engine, for custom event catalogs.
    #[must_use]
    pub fn with_engine(team: impl Into<String>, seed: u64, engine: TurnEngine) -> Self {
        let state = GameState::new(team, seed, engine.config());
        Self {
            state,
            engine,
            rng: RngBundle::from_user_seed(seed),
        }
    }

    /// Enact one year of policy.
    ///
    /// # Errors
    ///
    /// Propagates [`TurnError`] from the engine; a rejected turn leaves the
    /// world untouched.
    pub fn enact(&mut self, action: PolicyAction) -> Result<TurnOutcome, TurnError> {
        let turn = self.state.turns_played();
        let rng = self.rng.events_for_turn(turn);
        self.engine.enact(&mut self.state, action, rng)
    }

    /// Return to the starting world, keeping team, seed and configuration.
    pub fn reset(&mut self) {
        let team = std::mem::take(&mut self.state.team);
        let seed = self.state.seed;
        self.state = GameState::new(team, seed, self.engine.config());
        self.rng = RngBundle::from_user_seed(seed);
        log::debug!("session for {} reset", self.state.team);
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    #[must_use]
    pub const fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state.game_over
    }

    /// Total RNG draws consumed by this session since construction or reset.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.total_draws()
    }

    /// Score against the session's initial stats; `None` while the game is running.
    #[must_use]
    pub fn final_score(&self, scoring: &dyn ScoringStrategy) -> Option<f64> {
        self.state
            .game_over
            .then(|| scoring.score(&self.state.initial_stats, &self.state.stats))
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}
