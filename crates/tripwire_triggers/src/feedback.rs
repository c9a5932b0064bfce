//! Visual feedback for trigger volumes
//!
//! A volume pushes its triggered/untriggered state into an optional
//! [`FeedbackSink`]. [`GizmoRenderer`] is the stock sink: it keeps the editor
//! gizmo color in sync with the volume.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Receives the triggered state of a volume
pub trait FeedbackSink: Send {
    /// Called whenever the volume becomes triggered or untriggered
    fn set_triggered(&mut self, triggered: bool);
}

/// Sink shared between a volume and whatever renders it
pub type SharedFeedback = Arc<Mutex<dyn FeedbackSink>>;

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Gizmo display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoSettings {
    /// Draw gizmos at all
    pub draw_gizmos: bool,
    /// Only draw while the volume is selected
    pub draw_only_while_selected: bool,
    /// Draw a transform-sized box when the volume has no colliders
    pub draw_default_box: bool,
    /// Untriggered color
    pub color: Rgba,
    /// Per-channel shift applied to get the triggered color
    pub triggered_color_difference: f32,
    /// Draw the wireframe on top of the solid gizmo
    pub draw_wireframe: bool,
    /// Wireframe alpha (0..=1)
    pub wireframe_opacity: f32,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            draw_gizmos: true,
            draw_only_while_selected: false,
            draw_default_box: false,
            color: Rgba::new(0.2, 1.0, 0.2, 0.25),
            triggered_color_difference: 0.3,
            draw_wireframe: true,
            wireframe_opacity: 0.25,
        }
    }
}

/// Gizmo color state driven by a trigger volume
#[derive(Debug, Clone)]
pub struct GizmoRenderer {
    settings: GizmoSettings,
    triggered_color: Rgba,
    current: Rgba,
    triggered: bool,
}

impl GizmoRenderer {
    /// Create a renderer, deriving the triggered color from the settings
    pub fn new(mut settings: GizmoSettings) -> Self {
        settings.wireframe_opacity = settings.wireframe_opacity.clamp(0.0, 1.0);
        let triggered_color = triggered_color(settings.color, settings.triggered_color_difference);
        Self {
            current: settings.color,
            settings,
            triggered_color,
            triggered: false,
        }
    }

    /// Wrap into a sink a volume can share
    pub fn shared(self) -> Arc<Mutex<GizmoRenderer>> {
        Arc::new(Mutex::new(self))
    }

    pub fn settings(&self) -> &GizmoSettings {
        &self.settings
    }

    /// Replace the settings, keeping the triggered state
    pub fn set_settings(&mut self, settings: GizmoSettings) {
        let triggered = self.triggered;
        *self = Self::new(settings);
        self.set_triggered(triggered);
    }

    /// Last state pushed by the volume
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Color to draw the solid gizmo with
    pub fn current_color(&self) -> Rgba {
        self.current
    }

    /// Color of the triggered state
    pub fn triggered_color(&self) -> Rgba {
        self.triggered_color
    }

    /// Color to draw the wireframe with, if wireframes are on
    pub fn wireframe_color(&self) -> Option<Rgba> {
        self.settings
            .draw_wireframe
            .then(|| self.current.with_alpha(self.settings.wireframe_opacity))
    }

    /// Whether gizmos are drawn given the editor selection state
    pub fn is_visible(&self, selected: bool) -> bool {
        self.settings.draw_gizmos && (!self.settings.draw_only_while_selected || selected)
    }

    /// Whether the fallback box is drawn for a volume with this many colliders
    pub fn draws_default_box(&self, collider_count: usize) -> bool {
        collider_count == 0 && self.settings.draw_default_box
    }
}

impl Default for GizmoRenderer {
    fn default() -> Self {
        Self::new(GizmoSettings::default())
    }
}

impl FeedbackSink for GizmoRenderer {
    fn set_triggered(&mut self, triggered: bool) {
        self.triggered = triggered;
        self.current = if triggered {
            self.triggered_color
        } else {
            self.settings.color
        };
    }
}

/// Shift each channel toward the opposite half of its range
fn triggered_color(color: Rgba, difference: f32) -> Rgba {
    let shift = |c: f32| if c > 0.5 { c - difference } else { c + difference };
    Rgba::new(shift(color.r), shift(color.g), shift(color.b), color.a)
}
