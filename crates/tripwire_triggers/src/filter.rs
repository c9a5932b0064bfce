//! Filtering what may activate a trigger volume

use serde::{Deserialize, Serialize};
use tripwire_core::{Layer, LayerMask, ObjectId};

/// Tag carried by objects nobody tagged
pub const UNTAGGED: &str = "Untagged";

/// A body reported by the collision detector, with the metadata the filter reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// The overlapping collider
    pub id: ObjectId,
    /// Entity the collider belongs to
    pub entity: ObjectId,
    /// Layer of the owning entity
    #[serde(default)]
    pub layer: Layer,
    /// Tag of the owning entity
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_tag() -> String {
    UNTAGGED.to_string()
}

impl DetectedObject {
    /// A collider that is its own entity, on the default layer, untagged
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            entity: id,
            layer: Layer::DEFAULT,
            tag: default_tag(),
        }
    }

    /// Set the owning entity
    pub fn with_entity(mut self, entity: ObjectId) -> Self {
        self.entity = entity;
        self
    }

    /// Set layer
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Set tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

/// Admission rules for a trigger volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerFilter {
    /// Only this entity may trigger (None = any)
    pub specific_object: Option<ObjectId>,
    /// Layers that may trigger
    pub layers: LayerMask,
    /// Exact tag required (None = any)
    pub specific_tag: Option<String>,
}

impl TriggerFilter {
    /// Create a new filter that accepts everything
    pub fn new() -> Self {
        Self {
            specific_object: None,
            layers: LayerMask::ALL,
            specific_tag: None,
        }
    }

    /// Only accept colliders of one entity
    pub fn with_object(mut self, entity: ObjectId) -> Self {
        self.specific_object = Some(entity);
        self
    }

    /// Set accepted layers
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Require an exact tag. An empty tag means no tag requirement.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.specific_tag = if tag.is_empty() { None } else { Some(tag) };
        self
    }

    /// Returns true when the object must be ignored
    pub fn rejects(&self, object: &DetectedObject) -> bool {
        if let Some(entity) = self.specific_object {
            if object.entity != entity {
                return true;
            }
        }

        if !self.layers.contains(object.layer) {
            return true;
        }

        match self.specific_tag.as_deref() {
            None | Some("") => false,
            Some(tag) => object.tag != tag,
        }
    }
}

impl Default for TriggerFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(index: u32) -> DetectedObject {
        DetectedObject::new(ObjectId::new(index, 0))
    }

    #[test]
    fn test_default_accepts_everything() {
        let filter = TriggerFilter::new();
        assert!(!filter.rejects(&object(1)));
        assert!(!filter.rejects(&object(2).with_layer(Layer::PLAYER).with_tag("Enemy")));
    }

    #[test]
    fn test_filter_layers() {
        let filter = TriggerFilter::new().with_layers(LayerMask::from_layers(&[Layer::PLAYER]));

        assert!(!filter.rejects(&object(1).with_layer(Layer::PLAYER)));
        assert!(filter.rejects(&object(2)));
    }

    #[test]
    fn test_filter_tags() {
        let filter = TriggerFilter::new().with_tag("Player");

        assert!(!filter.rejects(&object(1).with_tag("Player")));
        assert!(filter.rejects(&object(2).with_tag("Enemy")));
        assert!(filter.rejects(&object(3)));
    }

    #[test]
    fn test_empty_tag_means_no_requirement() {
        let filter = TriggerFilter::new().with_tag("");
        assert_eq!(filter.specific_tag, None);
        assert!(!filter.rejects(&object(1).with_tag("Anything")));

        // Also when the empty tag arrives through a config
        let filter = TriggerFilter {
            specific_tag: Some(String::new()),
            ..TriggerFilter::new()
        };
        assert!(!filter.rejects(&object(1).with_tag("Anything")));
    }

    #[test]
    fn test_specific_object_compares_entity() {
        let player = ObjectId::new(10, 0);
        let filter = TriggerFilter::new().with_object(player);

        // A child collider of the player entity passes
        assert!(!filter.rejects(&object(11).with_entity(player)));
        // The same collider index on another entity does not
        assert!(filter.rejects(&object(10).with_entity(ObjectId::new(12, 0))));
    }
}
