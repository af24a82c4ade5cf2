//! Centralized balance and tuning constants for the policy engine.
//!
//! These values are the reference defaults for [`crate::config::EngineConfig`].
//! Keeping them together means the shipped balance can only drift through
//! reviewed code changes; deployments that want other numbers override them
//! through configuration instead of editing call sites.

// Calendar -----------------------------------------------------------------
pub(crate) const START_YEAR: u16 = 2025;
pub(crate) const END_YEAR: u16 = 2050;

// Lever limits -------------------------------------------------------------
pub(crate) const TAX_MAX: u8 = 20;
pub(crate) const SUBSIDY_MAX: u8 = 20;
pub(crate) const REGULATION_MAX: u8 = 10;

// Political capital --------------------------------------------------------
pub(crate) const COST_PER_TAX: u32 = 2;
pub(crate) const COST_PER_SUBSIDY: u32 = 3;
pub(crate) const COST_PER_REGULATION: u32 = 4;
pub(crate) const CAPITAL_REGEN: f64 = 18.0;

// Economy ------------------------------------------------------------------
pub(crate) const GROWTH_BASE_RATE: f64 = 0.023;
pub(crate) const GROWTH_TAX_DRAG: f64 = 0.002;
pub(crate) const GROWTH_REGULATION_DRAG: f64 = 0.001;
pub(crate) const GROWTH_SUBSIDY_BOOST: f64 = 0.0015;
pub(crate) const GDP_FLOOR: f64 = 0.01;

// Emissions ----------------------------------------------------------------
pub(crate) const CO2_PER_TAX: f64 = 3.2;
pub(crate) const CO2_PER_SUBSIDY: f64 = 2.7;
pub(crate) const CO2_PER_REGULATION: f64 = 2.2;
pub(crate) const RENEWABLE_PER_SUBSIDY: f64 = 1.2;

// Climate feedback ---------------------------------------------------------
pub(crate) const FEEDBACK_CO2_THRESHOLD: f64 = 400.0;
pub(crate) const FEEDBACK_HOT_STEP: f64 = 0.05;
pub(crate) const FEEDBACK_MILD_STEP: f64 = 0.01;
pub(crate) const BREACH_TEMP: f64 = 2.0;

// Approval -----------------------------------------------------------------
pub(crate) const APPROVAL_RECESSION_PENALTY: f64 = 2.0;
pub(crate) const APPROVAL_HEAT_THRESHOLD: f64 = 1.5;
pub(crate) const APPROVAL_HEAT_PENALTY: f64 = 5.0;
pub(crate) const APPROVAL_SUBSIDY_THRESHOLD: u8 = 5;
pub(crate) const APPROVAL_SUBSIDY_BONUS: f64 = 3.0;

// Events -------------------------------------------------------------------
pub(crate) const EVENT_CHANCE: f64 = 0.4;

// Starting world -----------------------------------------------------------
pub(crate) const INITIAL_GDP: f64 = 5.0;
pub(crate) const INITIAL_CO2: f64 = 450.0;
pub(crate) const INITIAL_TEMP_RISE: f64 = 1.1;
pub(crate) const INITIAL_APPROVAL: f64 = 60.0;
pub(crate) const INITIAL_CAPITAL: f64 = 100.0;
pub(crate) const INITIAL_RENEWABLE_PCT: f64 = 15.0;

// Percent-style metrics ----------------------------------------------------
pub(crate) const PCT_MIN: f64 = 0.0;
pub(crate) const PCT_MAX: f64 = 100.0;

// Narrative strings --------------------------------------------------------
pub const WELCOME_NARRATIVE: &str = "Welcome, Delegate.";
pub const STABLE_NARRATIVE: &str = "Global situation stable.";
pub const HORIZON_NARRATIVE: &str = "The 2050 horizon has been reached.";
pub const BREACH_NARRATIVE: &str = "Warming has crossed the catastrophic threshold.";
pub const MSG_POLICY_ENACTED: &str = "policy enacted";
pub const MSG_FINAL_POLICY_ENACTED: &str = "final policy enacted";
pub const MSG_TEMPERATURE_BREACH: &str = "policy enacted; temperature breach ended the session";

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_TURN_ENACTED: &str = "log.turn.enacted";
pub(crate) const LOG_TURN_REJECTED: &str = "log.turn.rejected";
pub(crate) const LOG_EVENT_TRIGGERED: &str = "log.event.triggered";
pub(crate) const LOG_SESSION_ENDED: &str = "log.session.ended";
pub(crate) const LOG_SINK_RETRY: &str = "log.sink.retry";
pub(crate) const LOG_SINK_EXHAUSTED: &str = "log.sink.exhausted";

// Persistence --------------------------------------------------------------
pub(crate) const SINK_MAX_ATTEMPTS: u32 = 5;
pub(crate) const SINK_INITIAL_DELAY_MS: u64 = 1_000;
