//! Physics layers and layer masks

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Layer errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayerError {
    /// Layer index does not fit in a 32-bit mask
    #[error("Layer index out of range: {0} (expected 0..32)")]
    OutOfRange(u32),
}

/// A physics layer a body lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Layer(u8);

impl Layer {
    /// Default layer
    pub const DEFAULT: Self = Self(0);
    /// Layer ignored by raycasts
    pub const IGNORE_RAYCAST: Self = Self(2);
    /// Player layer
    pub const PLAYER: Self = Self(3);
    /// Number of addressable layers
    pub const COUNT: u32 = 32;

    /// Create a layer, rejecting indices outside the mask width
    pub fn new(index: u32) -> Result<Self, LayerError> {
        if index < Self::COUNT {
            Ok(Self(index as u8))
        } else {
            Err(LayerError::OutOfRange(index))
        }
    }

    /// Layer index
    pub fn index(&self) -> u32 {
        self.0 as u32
    }

    /// Get the layer as a bitmask
    pub fn as_mask(&self) -> u32 {
        1 << self.0
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Layer {
    type Error = LayerError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<Layer> for u32 {
    fn from(layer: Layer) -> Self {
        layer.index()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {}", self.0)
    }
}

/// Set of layers a volume reacts to
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer
    pub const ALL: Self = Self(u32::MAX);
    /// No layer
    pub const NONE: Self = Self(0);

    /// Build a mask from a list of layers
    pub fn from_layers(layers: &[Layer]) -> Self {
        Self(layers.iter().fold(0u32, |acc, l| acc | l.as_mask()))
    }

    /// Check whether a layer is part of this mask
    pub fn contains(&self, layer: Layer) -> bool {
        self.0 & layer.as_mask() != 0
    }

    /// Add a layer
    pub fn with(mut self, layer: Layer) -> Self {
        self.0 |= layer.as_mask();
        self
    }

    /// Remove a layer
    pub fn without(mut self, layer: Layer) -> Self {
        self.0 &= !layer.as_mask();
        self
    }

    /// Raw bits
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Debug for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerMask({:#034b})", self.0)
    }
}
