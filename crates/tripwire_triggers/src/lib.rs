//! Tripwire Triggers - Trigger Volume Coordinator
//!
//! Converts raw enter/stay/exit contacts from a collision detector into
//! filtered, debounced, optionally delayed notifications.
//!
//! # Features
//!
//! - Object, layer and tag filtering
//! - Merged detection (many overlapping objects act as one trigger)
//! - One-shot volumes with manual or timed re-arming
//! - Enter/exit delays, stay delay plus repeat interval
//! - Visual feedback through a [`FeedbackSink`] such as [`GizmoRenderer`]
//! - Collider convex/trigger overrides applied at build time
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tripwire_core::ObjectId;
//! use tripwire_triggers::prelude::*;
//!
//! let config = TriggerConfig::default()
//!     .with_filter(TriggerFilter::new().with_tag("Player"))
//!     .with_enter_delay(0.2);
//! let mut volume = TriggerVolume::new(config)
//!     .on_enter(|event| println!("{:?} entered", event.object_id()));
//!
//! let player = DetectedObject::new(ObjectId::new(1, 0)).with_tag("Player");
//! volume.on_trigger_enter(&player);
//!
//! assert!(volume.advance(Duration::from_millis(100)).is_empty());
//! assert_eq!(volume.advance(Duration::from_millis(100)).len(), 1);
//! ```

pub mod collider;
pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
pub mod filter;
pub mod system;
pub mod trigger;

pub mod prelude {
    pub use crate::collider::{ColliderShape, Override, VolumeCollider};
    pub use crate::config::TriggerConfig;
    pub use crate::error::{ConfigError, TriggerError};
    pub use crate::events::{TriggerEvent, TriggerEventType};
    pub use crate::feedback::{FeedbackSink, GizmoRenderer, GizmoSettings, Rgba, SharedFeedback};
    pub use crate::filter::{DetectedObject, TriggerFilter};
    pub use crate::system::{ContactEvent, ContactPhase, TriggerSystem, VolumeEvent};
    pub use crate::trigger::TriggerVolume;
}

pub use prelude::*;
