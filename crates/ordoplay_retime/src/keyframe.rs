// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions.
//!
//! Retiming only ever changes [`Keyframe::time`]. Values, interpolation and
//! tangents travel with the key untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpolation mode between keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum InterpolationMode {
    /// Constant (step)
    Constant,
    /// Linear interpolation
    #[default]
    Linear,
    /// Cubic bezier interpolation
    Bezier,
    /// Auto-smooth
    Auto,
}

/// Value stored in a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyframeValue {
    /// Float value
    Float(f32),
    /// 3D vector
    Vec3([f32; 3]),
    /// 4D vector / quaternion
    Vec4([f32; 4]),
    /// Boolean
    Bool(bool),
    /// Event (string identifier)
    Event(String),
}

impl Default for KeyframeValue {
    fn default() -> Self {
        Self::Float(0.0)
    }
}

/// A keyframe on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    #[serde(default)]
    pub id: KeyframeId,
    /// Time in frames
    pub time: f64,
    /// Value at this keyframe
    #[serde(default)]
    pub value: KeyframeValue,
    /// Interpolation mode to next keyframe
    #[serde(default)]
    pub interpolation: InterpolationMode,
    /// In-tangent for bezier curves
    #[serde(default)]
    pub in_tangent: Option<[f32; 2]>,
    /// Out-tangent for bezier curves
    #[serde(default)]
    pub out_tangent: Option<[f32; 2]>,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f64, value: KeyframeValue) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            value,
            interpolation: InterpolationMode::Linear,
            in_tangent: None,
            out_tangent: None,
        }
    }

    /// Create a keyframe holding a default value, handy when only timing matters
    pub fn at(time: f64) -> Self {
        Self::new(time, KeyframeValue::default())
    }

    /// Set interpolation mode
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }

    /// Set tangents for bezier interpolation
    pub fn with_tangents(mut self, in_tangent: [f32; 2], out_tangent: [f32; 2]) -> Self {
        self.in_tangent = Some(in_tangent);
        self.out_tangent = Some(out_tangent);
        self
    }
}
