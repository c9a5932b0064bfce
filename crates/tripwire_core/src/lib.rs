//! # tripwire_core - Shared Primitives
//!
//! Identity and layer types shared by every Tripwire crate:
//! - [`ObjectId`]: opaque handle for a detected physical body
//! - [`Layer`] / [`LayerMask`]: physics layer membership and filtering

pub mod id;
pub mod layer;

pub use id::*;
pub use layer::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::ObjectId;
    pub use crate::layer::{Layer, LayerError, LayerMask};
}
