//! Trigger system routing physics contacts to volumes

use crate::error::{Result, TriggerError};
use crate::events::TriggerEvent;
use crate::filter::DetectedObject;
use crate::trigger::TriggerVolume;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tripwire_core::ObjectId;

/// Which callback a contact maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPhase {
    /// Overlap started this step
    Enter,
    /// Overlap continues
    Stay,
    /// Overlap ended this step
    Exit,
}

/// A contact reported by the collision detector for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Volume the contact belongs to
    pub volume: ObjectId,
    /// Overlapping object
    pub object: DetectedObject,
    /// Callback kind
    pub phase: ContactPhase,
}

impl ContactEvent {
    pub fn enter(volume: ObjectId, object: DetectedObject) -> Self {
        Self {
            volume,
            object,
            phase: ContactPhase::Enter,
        }
    }

    pub fn stay(volume: ObjectId, object: DetectedObject) -> Self {
        Self {
            volume,
            object,
            phase: ContactPhase::Stay,
        }
    }

    pub fn exit(volume: ObjectId, object: DetectedObject) -> Self {
        Self {
            volume,
            object,
            phase: ContactPhase::Exit,
        }
    }
}

/// A notification tagged with the volume that raised it
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeEvent {
    /// Raising volume
    pub volume: ObjectId,
    /// The notification
    pub event: TriggerEvent,
}

/// Owns every trigger volume of a scene and drives them step by step
pub struct TriggerSystem {
    /// Registered volumes (volume id -> volume)
    volumes: HashMap<ObjectId, TriggerVolume>,
    /// Notifications delivered during the last step
    last_events: Vec<VolumeEvent>,
}

impl TriggerSystem {
    /// Create a new trigger system
    pub fn new() -> Self {
        Self {
            volumes: HashMap::new(),
            last_events: Vec::new(),
        }
    }

    /// Register a volume, replacing any volume with the same ID
    pub fn register(&mut self, id: ObjectId, volume: TriggerVolume) -> Option<TriggerVolume> {
        self.volumes.insert(id, volume)
    }

    /// Unregister a volume. Its pending notifications are dropped with it.
    pub fn unregister(&mut self, id: ObjectId) -> Option<TriggerVolume> {
        self.volumes.remove(&id)
    }

    /// Get a volume
    pub fn get(&self, id: ObjectId) -> Option<&TriggerVolume> {
        self.volumes.get(&id)
    }

    /// Get a mutable volume
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut TriggerVolume> {
        self.volumes.get_mut(&id)
    }

    /// Re-arm a one-shot volume
    pub fn reset_trigger_once(&mut self, id: ObjectId) -> Result<()> {
        let volume = self
            .volumes
            .get_mut(&id)
            .ok_or(TriggerError::VolumeNotFound(id))?;
        volume.reset_trigger_once();
        Ok(())
    }

    /// Run one physics step.
    ///
    /// Every volume clears its step counters and advances its clock by `dt`,
    /// then the step's contacts are delivered in the order given. Volumes
    /// advance in ascending id order, so notifications from the same step are
    /// collected in that order.
    pub fn step(&mut self, dt: Duration, contacts: &[ContactEvent]) {
        self.last_events.clear();

        let mut ids: Vec<ObjectId> = self.volumes.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let Some(volume) = self.volumes.get_mut(&id) else {
                continue;
            };
            volume.begin_step();
            self.last_events.extend(
                volume
                    .advance(dt)
                    .into_iter()
                    .map(|event| VolumeEvent { volume: id, event }),
            );
        }

        for contact in contacts {
            let Some(volume) = self.volumes.get_mut(&contact.volume) else {
                log::warn!("Contact for unknown trigger volume {}", contact.volume);
                continue;
            };
            match contact.phase {
                ContactPhase::Enter => volume.on_trigger_enter(&contact.object),
                ContactPhase::Stay => volume.on_trigger_stay(&contact.object),
                ContactPhase::Exit => volume.on_trigger_exit(&contact.object),
            }
        }
    }

    /// Get events from the last step
    pub fn get_events(&self) -> &[VolumeEvent] {
        &self.last_events
    }

    /// Drain events from the last step
    pub fn drain_events(&mut self) -> Vec<VolumeEvent> {
        std::mem::take(&mut self.last_events)
    }

    /// Get all volume IDs
    pub fn volume_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.volumes.keys().copied()
    }

    /// Get volume count
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }
}

impl Default for TriggerSystem {
    fn default() -> Self {
        Self::new()
    }
}
