//! Trigger notifications

use crate::filter::DetectedObject;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tripwire_core::ObjectId;

/// Type of trigger notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEventType {
    /// Something entered the volume
    Enter,
    /// Something is still inside the volume
    Stay,
    /// Something left the volume
    Exit,
}

impl std::fmt::Display for TriggerEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enter => write!(f, "enter"),
            Self::Stay => write!(f, "stay"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// A delivered trigger notification
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    /// Type of event
    pub event_type: TriggerEventType,
    /// The object that caused it. `None` when raised by a one-shot reset.
    pub object: Option<DetectedObject>,
    /// Volume clock at delivery
    pub fired_at: Duration,
}

impl TriggerEvent {
    /// Create an enter event
    pub fn enter(object: Option<DetectedObject>) -> Self {
        Self::new(TriggerEventType::Enter, object)
    }

    /// Create a stay event
    pub fn stay(object: DetectedObject) -> Self {
        Self::new(TriggerEventType::Stay, Some(object))
    }

    /// Create an exit event
    pub fn exit(object: DetectedObject) -> Self {
        Self::new(TriggerEventType::Exit, Some(object))
    }

    fn new(event_type: TriggerEventType, object: Option<DetectedObject>) -> Self {
        Self {
            event_type,
            object,
            fired_at: Duration::ZERO,
        }
    }

    /// ID of the causing object, if any
    pub fn object_id(&self) -> Option<ObjectId> {
        self.object.as_ref().map(|o| o.id)
    }

    /// Check if this is an enter event
    pub fn is_enter(&self) -> bool {
        self.event_type == TriggerEventType::Enter
    }

    /// Check if this is a stay event
    pub fn is_stay(&self) -> bool {
        self.event_type == TriggerEventType::Stay
    }

    /// Check if this is an exit event
    pub fn is_exit(&self) -> bool {
        self.event_type == TriggerEventType::Exit
    }
}
