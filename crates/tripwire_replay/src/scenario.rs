//! Scripted contact timelines
//!
//! A scenario is a volume config plus a list of timed enter/exit contacts.
//! Stay contacts are synthesized every step for objects that are inside.
//!
//! ```json
//! {
//!   "config": { "enter_delay": 0.2, "stay_delay": 0.5, "stay_interval": 1.0 },
//!   "step": 0.1,
//!   "duration": 4.0,
//!   "contacts": [
//!     { "time": 0.0, "object": 1, "tag": "Player", "phase": "enter" },
//!     { "time": 3.0, "object": 1, "tag": "Player", "phase": "exit" }
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tripwire_core::{Layer, ObjectId};
use tripwire_triggers::{
    ContactEvent, ContactPhase, DetectedObject, TriggerConfig, TriggerEvent, TriggerSystem,
    TriggerVolume,
};

/// Scenario loading errors
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading the scenario file failed
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    /// The scenario was not valid JSON
    #[error("Invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),

    /// Step length must advance the clock by at least one microsecond
    #[error("Invalid step length: {0}")]
    InvalidStep(f32),
}

/// One scripted contact
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedContact {
    /// Seconds from the start of the replay
    pub time: f32,
    /// Collider index
    pub object: u32,
    /// Owning entity index (defaults to the collider)
    #[serde(default)]
    pub entity: Option<u32>,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub tag: Option<String>,
    /// Only `enter` and `exit` are meaningful; stays are synthesized
    pub phase: ContactPhase,
}

impl ScriptedContact {
    fn detected(&self) -> DetectedObject {
        let id = ObjectId::new(self.object, 0);
        let mut object = DetectedObject::new(id)
            .with_entity(ObjectId::new(self.entity.unwrap_or(self.object), 0))
            .with_layer(self.layer);
        if let Some(tag) = &self.tag {
            object = object.with_tag(tag.clone());
        }
        object
    }
}

fn default_step() -> f32 {
    0.02
}

/// A replayable scenario
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: TriggerConfig,
    /// Physics step in seconds
    #[serde(default = "default_step")]
    pub step: f32,
    /// Seconds to simulate
    pub duration: f32,
    #[serde(default)]
    pub contacts: Vec<ScriptedContact>,
}

impl Scenario {
    /// Parse a scenario, sorting its contacts by time
    pub fn from_json_str(json: &str) -> Result<Self, ReplayError> {
        let mut scenario: Self = serde_json::from_str(json)?;
        if tripwire_sched::seconds(scenario.step).is_zero() {
            return Err(ReplayError::InvalidStep(scenario.step));
        }
        scenario.config.validate();
        scenario.contacts.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(scenario)
    }

    /// Load a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// What happened during a replay
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Delivered notifications, in order
    pub events: Vec<TriggerEvent>,
    /// Visual feedback transitions (time, triggered)
    pub feedback_changes: Vec<(Duration, bool)>,
}

fn log_event(event: &TriggerEvent) {
    match &event.object {
        Some(object) => log::info!(
            "[{:>8.3}s] {} by {} (tag {}, {})",
            event.fired_at.as_secs_f32(),
            event.event_type,
            object.id,
            object.tag,
            object.layer
        ),
        None => log::info!(
            "[{:>8.3}s] {} after one-shot reset",
            event.fired_at.as_secs_f32(),
            event.event_type
        ),
    }
}

/// Run a scenario through a single trigger volume
pub fn replay(scenario: &Scenario) -> ReplayReport {
    let volume_id = ObjectId::new(0, u32::MAX);
    let volume = TriggerVolume::new(scenario.config.clone())
        .on_enter(log_event)
        .on_stay(log_event)
        .on_exit(log_event);

    let mut system = TriggerSystem::new();
    system.register(volume_id, volume);

    let step = tripwire_sched::seconds(scenario.step);
    let steps = (scenario.duration.max(0.0) / scenario.step).ceil() as u32;

    let mut report = ReplayReport::default();
    let mut inside: Vec<DetectedObject> = Vec::new();
    let mut next_contact = 0;
    let mut triggered = false;

    for k in 0..=steps {
        let now = step * k;
        let dt = if k == 0 { Duration::ZERO } else { step };

        let mut contacts = Vec::new();
        let mut entered_now = Vec::new();
        while let Some(scripted) = scenario.contacts.get(next_contact) {
            if tripwire_sched::seconds(scripted.time) > now {
                break;
            }
            next_contact += 1;

            let object = scripted.detected();
            match scripted.phase {
                ContactPhase::Enter => {
                    entered_now.push(object.id);
                    inside.push(object.clone());
                }
                ContactPhase::Exit => inside.retain(|o| o.id != object.id),
                ContactPhase::Stay => continue,
            }
            contacts.push(ContactEvent {
                volume: volume_id,
                object,
                phase: scripted.phase,
            });
        }
        contacts.extend(
            inside
                .iter()
                .filter(|o| !entered_now.contains(&o.id))
                .map(|o| ContactEvent::stay(volume_id, o.clone())),
        );

        system.step(dt, &contacts);
        report
            .events
            .extend(system.drain_events().into_iter().map(|e| e.event));

        let is_triggered = system
            .get(volume_id)
            .map(|v| v.is_triggered())
            .unwrap_or(false);
        if is_triggered != triggered {
            log::info!(
                "[{:>8.3}s] volume {}",
                now.as_secs_f32(),
                if is_triggered { "triggered" } else { "cleared" }
            );
            report.feedback_changes.push((now, is_triggered));
            triggered = is_triggered;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripwire_triggers::TriggerEventType;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    const SCENARIO: &str = r#"{
        "config": {
            "filter": { "specific_tag": "Player" },
            "enter_delay": 0.2,
            "stay_delay": 0.5,
            "stay_interval": 1.0
        },
        "step": 0.1,
        "duration": 4.0,
        "contacts": [
            { "time": 3.0, "object": 1, "tag": "Player", "phase": "exit" },
            { "time": 0.0, "object": 1, "tag": "Player", "phase": "enter" },
            { "time": 1.0, "object": 2, "tag": "Crate", "phase": "enter" }
        ]
    }"#;

    #[test]
    fn test_parse_sorts_contacts() {
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        let times: Vec<f32> = scenario.contacts.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_rejects_bad_step() {
        let err = Scenario::from_json_str(r#"{ "step": 0, "duration": 1 }"#).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidStep(_)));
    }

    #[test]
    fn test_rejects_step_below_clock_resolution() {
        let err = Scenario::from_json_str(r#"{ "step": 1e-7, "duration": 1e-5 }"#).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidStep(_)));

        // One microsecond is the smallest step the clock can take
        let scenario = Scenario::from_json_str(r#"{ "step": 1e-6, "duration": 1e-5 }"#).unwrap();
        assert_eq!(tripwire_sched::seconds(scenario.step), Duration::from_micros(1));
    }

    #[test]
    fn test_replay_timeline() {
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        let report = replay(&scenario);

        let timeline: Vec<(TriggerEventType, Duration)> = report
            .events
            .iter()
            .map(|e| (e.event_type, e.fired_at))
            .collect();

        // Stays start the step after entry, so the first one lands at 0.6s
        assert_eq!(
            timeline,
            vec![
                (TriggerEventType::Enter, ms(200)),
                (TriggerEventType::Stay, ms(600)),
                (TriggerEventType::Stay, ms(1600)),
                (TriggerEventType::Stay, ms(2600)),
                (TriggerEventType::Exit, ms(3100)),
            ]
        );
        assert_eq!(report.feedback_changes, vec![(ms(0), true), (ms(3000), false)]);
    }
}
