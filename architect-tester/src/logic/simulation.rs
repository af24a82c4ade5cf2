use std::time::{Duration, Instant};

use architect_game::{
    EngineConfig, Ending, GameEngine, GameState, PolicyAction, RowSink, ScoringKind, SubmitError,
    TurnError,
};
use serde::Serialize;

use super::checks::history_digest;
use super::policy::{GameplayStrategy, PolicyDecision};

/// One accepted year as seen by the tester.
#[derive(Debug, Clone, Serialize)]
pub struct TurnLogEntry {
    pub year: u16,
    pub action: PolicyAction,
    pub cost: u32,
    pub event_id: Option<String>,
    pub rationale: Option<String>,
}

/// How an automated run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ended(Ending),
    /// Capital fell below zero, so not even the zero-cost package was admitted.
    Stalled,
    /// The turn guard tripped before any terminal state.
    Halted,
}

impl RunStatus {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Ended(ending) => ending.to_string(),
            Self::Stalled => "stalled".to_string(),
            Self::Halted => "halted".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub strategy: GameplayStrategy,
    pub seed: u64,
    pub status: RunStatus,
    pub turns: Vec<TurnLogEntry>,
    pub rejected_submissions: u32,
    pub persistence_failures: u32,
    pub rows_persisted: usize,
    pub scoring: ScoringKind,
    pub score: Option<f64>,
    pub events_fired: usize,
    pub digest: u64,
    #[serde(skip)]
    pub duration: Duration,
    #[serde(skip)]
    pub final_state: GameState,
}

impl SimulationSummary {
    #[must_use]
    pub fn years_played(&self) -> usize {
        self.final_state.history.len()
    }
}

/// Plays complete sessions for a given configuration.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    config: EngineConfig,
    team: String,
    scoring: ScoringKind,
    verbose: bool,
}

impl SimulationRunner {
    #[must_use]
    pub fn new(config: EngineConfig, team: impl Into<String>, scoring: ScoringKind) -> Self {
        Self {
            config,
            team: team.into(),
            scoring,
            verbose: false,
        }
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Upper bound on submissions for one run.
    fn turn_guard(&self) -> usize {
        usize::from(self.config.calendar.horizon_turns()).saturating_mul(4).max(8)
    }

    /// Play one session to its end, handing each accepted row to `sink`.
    pub fn run(&self, strategy: GameplayStrategy, seed: u64, sink: &mut dyn RowSink) -> SimulationSummary {
        let started = Instant::now();
        let mut engine = GameEngine::new(self.config.clone(), sink);
        let mut session = engine.new_session(&self.team, seed);
        let mut policy = strategy.create_policy(seed);
        log::debug!("seed {seed}: playing as {}", policy.name());

        let mut turns = Vec::new();
        let mut rejected = 0u32;
        let mut persistence_failures = 0u32;
        let mut rows = 0usize;
        let mut status = RunStatus::Halted;

        for _ in 0..self.turn_guard() {
            if let Some(ending) = session.state().ending {
                status = RunStatus::Ended(ending);
                break;
            }
            let decision = policy.decide(session.state(), session.config());
            let submitted = submit(&mut engine, &mut session, &decision);
            let outcome = match submitted {
                Ok(outcome) => {
                    rows += 1;
                    outcome
                }
                Err(SubmitError::Persistence { outcome, source }) => {
                    log::warn!("{} seed {seed}: {source}", strategy.key());
                    persistence_failures += 1;
                    *outcome
                }
                Err(SubmitError::Turn(err)) => {
                    rejected += 1;
                    if self.verbose {
                        println!("  ↳ {} seed {seed}: {err}", strategy.label());
                    }
                    match fall_back_to_hold(&mut engine, &mut session, &decision, err) {
                        Some(Ok(outcome)) => {
                            rows += 1;
                            outcome
                        }
                        Some(Err(SubmitError::Persistence { outcome, .. })) => {
                            persistence_failures += 1;
                            *outcome
                        }
                        Some(Err(SubmitError::Turn(_))) => {
                            rejected += 1;
                            status = RunStatus::Stalled;
                            break;
                        }
                        None => {
                            status = RunStatus::Stalled;
                            break;
                        }
                    }
                }
            };
            turns.push(TurnLogEntry {
                year: outcome.year,
                action: outcome.action,
                cost: outcome.cost,
                event_id: outcome.event.as_ref().map(|event| event.event_id.clone()),
                rationale: decision.rationale.clone(),
            });
        }
        if let Some(ending) = session.state().ending {
            status = RunStatus::Ended(ending);
        }

        let scoring = self.scoring.strategy();
        let score = session.final_score(scoring.as_ref());
        let final_state = session.into_state();
        let events_fired = turns.iter().filter(|turn| turn.event_id.is_some()).count();
        log::info!(
            "{} seed {seed}: {} after {} years",
            strategy.key(),
            status.label(),
            final_state.history.len()
        );

        SimulationSummary {
            strategy,
            seed,
            status,
            turns,
            rejected_submissions: rejected,
            persistence_failures,
            rows_persisted: rows,
            scoring: self.scoring,
            score,
            events_fired,
            digest: history_digest(&final_state),
            duration: started.elapsed(),
            final_state,
        }
    }
}

type Submitted = Result<architect_game::TurnOutcome, SubmitError>;

fn submit<K: RowSink>(
    engine: &mut GameEngine<K>,
    session: &mut architect_game::GameSession,
    decision: &PolicyDecision,
) -> Submitted {
    let action = decision.action;
    engine
        .submit_turn(
            session,
            i64::from(action.tax),
            i64::from(action.subsidy),
            i64::from(action.regulation),
        )
        .map(|receipt| receipt.outcome)
}

/// Retry a rejected package as a zero-cost hold. `None` when holding is pointless.
fn fall_back_to_hold<K: RowSink>(
    engine: &mut GameEngine<K>,
    session: &mut architect_game::GameSession,
    decision: &PolicyDecision,
    err: TurnError,
) -> Option<Submitted> {
    let hold = PolicyDecision::hold();
    let retry = matches!(err, TurnError::InsufficientCapital { .. }) && decision.action != hold.action;
    retry.then(|| submit(engine, session, &hold))
}
