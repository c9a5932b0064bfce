//! Trigger volume configuration

use crate::collider::Override;
use crate::error::ConfigError;
use crate::filter::TriggerFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Everything a trigger volume is configured with. Set once at build time.
///
/// Delays are authored in seconds.
///
/// ```json
/// {
///   "trigger_once": true,
///   "trigger_once_reset_time": 2.0,
///   "filter": { "layers": 8, "specific_tag": "Player" },
///   "enter_delay": 0.2,
///   "stay_delay": 0.5,
///   "stay_interval": 1.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Fire the enter notification at most once until reset
    pub trigger_once: bool,
    /// Seconds after a full exit before a one-shot volume re-arms (0 = manual only)
    pub trigger_once_reset_time: f32,
    /// Treat all overlapping objects as one logical trigger
    pub merge_trigger_detection: bool,
    /// Convex override for mesh colliders
    pub override_convex: Override,
    /// Trigger-flag override for colliders
    pub override_is_trigger: Override,
    /// What may activate the volume
    pub filter: TriggerFilter,
    /// Seconds between an enter and its notification
    pub enter_delay: f32,
    /// Seconds before the first stay notification
    pub stay_delay: f32,
    /// Seconds between subsequent stay notifications
    pub stay_interval: f32,
    /// Seconds between an exit and its notification
    pub exit_delay: f32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            trigger_once: false,
            trigger_once_reset_time: 0.0,
            merge_trigger_detection: true,
            override_convex: Override::NoOverride,
            override_is_trigger: Override::NoOverride,
            filter: TriggerFilter::new(),
            enter_delay: 0.0,
            stay_delay: 0.0,
            stay_interval: 0.0,
            exit_delay: 0.0,
        }
    }
}

impl TriggerConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::debug!("Loaded trigger config from {}", path.display());
        Ok(config)
    }

    /// Clamp out-of-range values. Never fails.
    pub fn validate(&mut self) {
        clamp_delay("trigger_once_reset_time", &mut self.trigger_once_reset_time);
        clamp_delay("enter_delay", &mut self.enter_delay);
        clamp_delay("stay_delay", &mut self.stay_delay);
        clamp_delay("stay_interval", &mut self.stay_interval);
        clamp_delay("exit_delay", &mut self.exit_delay);

        if self.filter.specific_tag.as_deref() == Some("") {
            self.filter.specific_tag = None;
        }
    }

    /// Consume and return the validated config
    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }

    /// One-shot mode with an optional automatic reset
    pub fn with_trigger_once(mut self, reset_time: f32) -> Self {
        self.trigger_once = true;
        self.trigger_once_reset_time = reset_time;
        self
    }

    /// Set merge detection
    pub fn with_merge_detection(mut self, merge: bool) -> Self {
        self.merge_trigger_detection = merge;
        self
    }

    /// Set filter
    pub fn with_filter(mut self, filter: TriggerFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set collider overrides
    pub fn with_overrides(mut self, convex: Override, is_trigger: Override) -> Self {
        self.override_convex = convex;
        self.override_is_trigger = is_trigger;
        self
    }

    /// Set enter delay
    pub fn with_enter_delay(mut self, delay: f32) -> Self {
        self.enter_delay = delay;
        self
    }

    /// Set stay delay and repeat interval
    pub fn with_stay_timing(mut self, delay: f32, interval: f32) -> Self {
        self.stay_delay = delay;
        self.stay_interval = interval;
        self
    }

    /// Set exit delay
    pub fn with_exit_delay(mut self, delay: f32) -> Self {
        self.exit_delay = delay;
        self
    }

    /// Enter delay as a clock duration
    pub fn enter_delay(&self) -> Duration {
        tripwire_sched::seconds(self.enter_delay)
    }

    /// First stay wait as a clock duration
    pub fn stay_delay(&self) -> Duration {
        tripwire_sched::seconds(self.stay_delay)
    }

    /// Repeat stay wait as a clock duration
    pub fn stay_interval(&self) -> Duration {
        tripwire_sched::seconds(self.stay_interval)
    }

    /// Exit delay as a clock duration
    pub fn exit_delay(&self) -> Duration {
        tripwire_sched::seconds(self.exit_delay)
    }

    /// One-shot reset delay, if automatic reset is configured
    pub fn reset_delay(&self) -> Option<Duration> {
        if self.trigger_once && self.trigger_once_reset_time > 0.0 {
            Some(tripwire_sched::seconds(self.trigger_once_reset_time))
        } else {
            None
        }
    }
}

fn clamp_delay(name: &str, value: &mut f32) {
    if !value.is_finite() || *value < 0.0 {
        log::warn!("Trigger config `{}` = {} is invalid, using 0", name, value);
        *value = 0.0;
    }
}
