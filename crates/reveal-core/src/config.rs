//! # Configuration
//!
//! Tunables for a single transition. Every field has a default, so an empty
//! JSON object is a valid configuration.

use crate::animation::EasingType;
use serde::{Deserialize, Serialize};

/// What the sequencer does when it is cancelled between phases.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Jump to the end shape's geometry and release the surface.
    #[default]
    SnapToEnd,
    /// Leave the surface holding whatever geometry it has reached.
    HoldCurrent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Length of the whole transition in seconds.
    pub total_duration: f64,
    /// Timing curve attached to every instruction.
    pub timing: EasingType,
    pub cancel_policy: CancelPolicy,
    /// When false the animating surface has no shadow layers, so no
    /// instruction targets a shadow or mask layer.
    pub install_shadow_layers: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            total_duration: 10.0,
            timing: EasingType::Linear,
            cancel_policy: CancelPolicy::SnapToEnd,
            install_shadow_layers: true,
        }
    }
}

impl TransitionConfig {
    pub fn with_duration(mut self, total_duration: f64) -> Self {
        self.total_duration = total_duration;
        self
    }
}
