//! Policy Architect Game Engine
//!
//! Platform-agnostic core simulation for the Policy Architect 2050 classroom game.
//! Teams pull three policy levers each year; this crate resolves the turn, rolls
//! world events, scores the finished session, and emits one persistence row per
//! accepted turn. It has no UI or transport dependencies.

pub mod action;
pub mod config;
pub mod constants;
pub mod engine;
pub mod events;
pub mod history;
pub mod numbers;
pub mod persistence;
pub mod result;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod state;

use chrono::Utc;
use thiserror::Error;

// Re-export commonly used types
pub use action::{Lever, PolicyAction};
pub use config::{
    ApprovalConfig, Calendar, ConfigError, CostWeights, EmissionsConfig, EngineConfig,
    FeedbackConfig, GrowthConfig, LeverLimits,
};
pub use constants::{HORIZON_NARRATIVE, STABLE_NARRATIVE, WELCOME_NARRATIVE};
pub use engine::{TurnEngine, TurnError, TurnOutcome};
pub use events::{EventCatalog, EventDef, EventOutcome, MetricDelta, catalog};
pub use history::{HistoryLog, HistoryRecord};
pub use persistence::{
    MemorySink, PersistenceError, RecordingSleeper, RetryPolicy, RowSink, Sleeper, ThreadSleeper,
    TurnRow, append_with_retry,
};
pub use result::{ResultError, ResultSummary, result_summary};
pub use rng::{CountingRng, RngBundle};
pub use scoring::{
    LinearSum, ScoreBreakdown, ScoreWeights, ScoringKind, ScoringStrategy, WeightedComposite,
    temperature_band,
};
pub use session::GameSession;
pub use state::{Ending, GameState, MetricKey, Metrics};

/// Trait for abstracting save/load of session snapshots.
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Accepted and persisted turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReceipt {
    pub outcome: TurnOutcome,
    pub row: TurnRow,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Turn(#[from] TurnError),
    /// The turn was applied to the session but its row never reached the sink.
    #[error("turn for {} was applied but not persisted: {source}", .outcome.year)]
    Persistence {
        outcome: Box<TurnOutcome>,
        source: PersistenceError,
    },
}

impl SubmitError {
    /// Outcome of a turn that was applied despite the error, if any.
    #[must_use]
    pub fn applied_outcome(&self) -> Option<&TurnOutcome> {
        match self {
            Self::Turn(_) => None,
            Self::Persistence { outcome, .. } => Some(outcome.as_ref()),
        }
    }
}

/// Main game engine: starts sessions and runs each submission through the
/// turn engine and the persistence sink.
pub struct GameEngine<K, Z = ThreadSleeper>
where
    K: RowSink,
    Z: Sleeper,
{
    config: EngineConfig,
    sink: K,
    retry: RetryPolicy,
    sleeper: Z,
}

impl<K: RowSink> GameEngine<K, ThreadSleeper> {
    /// Create an engine that blocks the calling thread between sink retries.
    pub fn new(config: EngineConfig, sink: K) -> Self {
        Self::with_sleeper(config, sink, ThreadSleeper)
    }
}

impl<K, Z> GameEngine<K, Z>
where
    K: RowSink,
    Z: Sleeper,
{
    pub fn with_sleeper(config: EngineConfig, sink: K, sleeper: Z) -> Self {
        Self {
            config,
            sink,
            retry: RetryPolicy::default(),
            sleeper,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn sink(&self) -> &K {
        &self.sink
    }

    pub const fn sleeper(&self) -> &Z {
        &self.sleeper
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Start a fresh session for a team.
    #[must_use]
    pub fn new_session(&self, team: &str, seed: u64) -> GameSession {
        log::debug!("new session for {team} (seed {seed})");
        GameSession::new(team, seed, self.config.clone())
    }

    /// Resume a session from a snapshot.
    #[must_use]
    pub fn resume_session(&self, state: GameState) -> GameSession {
        GameSession::from_state(state, self.config.clone())
    }

    /// Validate raw lever input, enact it, and append the resulting row.
    ///
    /// # Errors
    ///
    /// * [`SubmitError::Turn`] when the action is invalid, unaffordable, or the
    ///   session already ended. Nothing was applied or persisted.
    /// * [`SubmitError::Persistence`] when the sink kept failing. The turn has
    ///   already been applied to `session` and is not rolled back.
    pub fn submit_turn(
        &mut self,
        session: &mut GameSession,
        tax: i64,
        subsidy: i64,
        regulation: i64,
    ) -> Result<TurnReceipt, SubmitError> {
        let action = PolicyAction::with_limits(tax, subsidy, regulation, &session.config().limits)?;
        let outcome = session.enact(action)?;
        let row = TurnRow::from_state(session.state(), &action, Utc::now());
        match append_with_retry(&mut self.sink, &row, &self.retry, &mut self.sleeper) {
            Ok(()) => Ok(TurnReceipt { outcome, row }),
            Err(source) => Err(SubmitError::Persistence {
                outcome: Box::new(outcome),
                source,
            }),
        }
    }

    /// Save a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_session<S: GameStorage>(
        &self,
        storage: &S,
        save_name: &str,
        session: &GameSession,
    ) -> Result<(), S::Error> {
        storage.save_game(save_name, session.state())
    }

    /// Load a session snapshot and resume it with this engine's configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    pub fn load_session<S: GameStorage>(
        &self,
        storage: &S,
        save_name: &str,
    ) -> Result<Option<GameSession>, S::Error> {
        Ok(storage
            .load_game(save_name)?
            .map(|state| self.resume_session(state)))
    }
}
