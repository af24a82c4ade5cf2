//! Random world events applied after a turn's deterministic update.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::OnceLock;

use crate::constants::EVENT_CHANCE;
use crate::state::{MetricKey, Metrics};

const DEFAULT_EVENTS_DATA: &str = include_str!("../assets/events.json");

const fn default_chance() -> f64 {
    EVENT_CHANCE
}

/// Signed change to a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: MetricKey,
    pub delta: f64,
}

impl MetricDelta {
    #[must_use]
    pub const fn new(metric: MetricKey, delta: f64) -> Self {
        Self { metric, delta }
    }
}

pub type Effects = SmallVec<[MetricDelta; 3]>;

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub effects: Effects,
}

impl EventDef {
    /// Narrative line shown to the team and written to persistence rows.
    #[must_use]
    pub fn narrative(&self) -> String {
        if self.message.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.message)
        }
    }
}

/// Result of a triggered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event_id: String,
    pub name: String,
    pub narrative: String,
    pub impact: Effects,
    /// Uniform draw that passed the trigger gate.
    pub chance_roll: f64,
}

impl EventOutcome {
    /// Readable summary of the applied deltas, e.g. `Renewables +5.00%, CO2 -10.00 Gt`.
    #[must_use]
    pub fn describe_impact(&self) -> String {
        self.impact
            .iter()
            .map(|delta| {
                format!(
                    "{} {:+.2}{}",
                    delta.metric.label(),
                    delta.delta,
                    delta.metric.unit()
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Fixed catalog of events plus the per-turn trigger probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCatalog {
    #[serde(default = "default_chance")]
    pub chance: f64,
    #[serde(default)]
    pub events: Vec<EventDef>,
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self {
            chance: default_chance(),
            events: Vec::new(),
        }
    }
}

impl EventCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_EVENTS_DATA).unwrap_or_default()
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown metric.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Same catalog with a different trigger probability.
    #[must_use]
    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = chance;
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EventDef> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Roll for an event and apply its effects to `metrics`.
    ///
    /// With probability `chance` one entry is picked uniformly and each of its
    /// deltas is added to the metrics unclamped; otherwise nothing changes and
    /// `None` is returned.
    pub fn roll<R>(&self, metrics: &mut Metrics, rng: &mut R) -> Option<EventOutcome>
    where
        R: Rng + ?Sized,
    {
        let chance = if self.chance.is_nan() {
            0.0
        } else {
            self.chance.clamp(0.0, 1.0)
        };
        if chance <= 0.0 || self.events.is_empty() {
            return None;
        }
        let chance_roll = rng.r#gen::<f64>();
        if chance_roll >= chance {
            return None;
        }
        let selected = &self.events[rng.gen_range(0..self.events.len())];
        for effect in &selected.effects {
            metrics.apply_delta(effect.metric, effect.delta);
        }
        log::debug!(
            target: crate::constants::LOG_EVENT_TRIGGERED,
            "event {} fired (roll {chance_roll:.3} < {chance:.2})",
            selected.id
        );
        Some(EventOutcome {
            event_id: selected.id.clone(),
            name: selected.name.clone(),
            narrative: selected.narrative(),
            impact: selected.effects.clone(),
            chance_roll,
        })
    }
}

/// Process-wide default catalog, parsed once from the embedded asset.
#[must_use]
pub fn catalog() -> &'static EventCatalog {
    static CATALOG: OnceLock<EventCatalog> = OnceLock::new();
    CATALOG.get_or_init(EventCatalog::load_from_static)
}
