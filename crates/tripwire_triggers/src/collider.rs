//! Collider components attached to a trigger volume and the override policy
//! applied to them when the volume is built.

use serde::{Deserialize, Serialize};

/// Collider shapes a volume can be made of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderShape {
    /// Box in local space
    Box {
        /// Local center
        center: [f32; 3],
        /// Full size
        size: [f32; 3],
    },
    /// Sphere
    Sphere {
        /// Local center
        center: [f32; 3],
        /// Radius
        radius: f32,
    },
    /// Capsule
    Capsule {
        /// Local center
        center: [f32; 3],
        /// Radius
        radius: f32,
        /// Total height including caps
        height: f32,
        /// Axis (0 = X, 1 = Y, 2 = Z)
        direction: u8,
    },
    /// Arbitrary mesh
    Mesh {
        /// Whether the mesh is treated as its convex hull
        convex: bool,
    },
    /// Heightfield terrain
    Terrain,
    /// Vehicle wheel
    Wheel,
}

impl ColliderShape {
    /// Box collider centered at the origin
    pub fn cube(size: f32) -> Self {
        Self::Box {
            center: [0.0; 3],
            size: [size; 3],
        }
    }

    /// Sphere collider centered at the origin
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            center: [0.0; 3],
            radius,
        }
    }

    /// Mesh collider
    pub fn mesh(convex: bool) -> Self {
        Self::Mesh { convex }
    }
}

/// A collider component on the volume's object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeCollider {
    /// Shape
    pub shape: ColliderShape,
    /// Whether the collider only reports overlaps instead of blocking
    #[serde(default)]
    pub is_trigger: bool,
}

impl VolumeCollider {
    /// Create a solid collider
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_trigger: false,
        }
    }

    /// Create an overlap-only collider
    pub fn trigger(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_trigger: true,
        }
    }

    /// Convex flag, for mesh colliders only
    pub fn convex(&self) -> Option<bool> {
        match self.shape {
            ColliderShape::Mesh { convex } => Some(convex),
            _ => None,
        }
    }
}

/// How a volume rewrites a boolean collider property at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Override {
    /// Leave the colliders as authored
    #[default]
    NoOverride,
    /// Force the property on
    EnableAll,
    /// Force the property off
    DisableAll,
}

impl Override {
    /// The forced value, if any
    pub fn value(&self) -> Option<bool> {
        match self {
            Self::NoOverride => None,
            Self::EnableAll => Some(true),
            Self::DisableAll => Some(false),
        }
    }
}

/// Set the convex flag on every mesh collider
pub fn override_convex(colliders: &mut [VolumeCollider], policy: Override) {
    let Some(value) = policy.value() else {
        return;
    };
    for collider in colliders.iter_mut() {
        if let ColliderShape::Mesh { convex } = &mut collider.shape {
            *convex = value;
        }
    }
}

/// Set the trigger flag on every collider. Concave meshes cannot be
/// triggers and are skipped.
pub fn override_is_trigger(colliders: &mut [VolumeCollider], policy: Override) {
    let Some(value) = policy.value() else {
        return;
    };
    for collider in colliders.iter_mut() {
        if collider.convex() == Some(false) {
            continue;
        }
        collider.is_trigger = value;
    }
}

/// Apply both overrides, convex first so newly convex meshes take the trigger flag
pub fn apply_overrides(colliders: &mut [VolumeCollider], convex: Override, is_trigger: Override) {
    override_convex(colliders, convex);
    override_is_trigger(colliders, is_trigger);
}
