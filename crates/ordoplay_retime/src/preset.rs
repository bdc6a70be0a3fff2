// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retime presets, one per toolbar button.

use crate::schedule::{RetimeMode, RetimeRequest};
use serde::{Deserialize, Serialize};

/// A named delta/mode pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetimePreset {
    /// Button label, e.g. `"3f"` or `"-1f"`
    pub label: String,
    /// Delta in frames
    pub delta: f64,
    /// Spacing mode
    pub mode: RetimeMode,
}

impl RetimePreset {
    /// Absolute spacing preset labelled `"{delta}f"`
    pub fn absolute(delta: u32) -> Self {
        Self {
            label: format!("{delta}f"),
            delta: f64::from(delta),
            mode: RetimeMode::Absolute,
        }
    }

    /// Incremental preset labelled `"+{delta}f"` / `"-{delta}f"`
    pub fn incremental(delta: i32) -> Self {
        Self {
            label: format!("{delta:+}f"),
            delta: f64::from(delta),
            mode: RetimeMode::Incremental,
        }
    }

    /// Absolute 1f to 6f, then incremental -2f, -1f, +1f, +2f
    pub fn defaults() -> Vec<Self> {
        (1..=6)
            .map(Self::absolute)
            .chain([-2, -1, 1, 2].into_iter().map(Self::incremental))
            .collect()
    }

    /// Find a preset by label.
    ///
    /// Incremental labels match with or without the leading `+`.
    pub fn find<'a>(presets: &'a [Self], label: &str) -> Option<&'a Self> {
        let label = label.trim();
        presets.iter().find(|p| {
            p.label == label
                || (p.mode == RetimeMode::Incremental
                    && p.label.strip_prefix('+') == Some(label))
        })
    }

    /// Build a request from this preset
    pub fn request(&self, reposition: bool) -> RetimeRequest {
        RetimeRequest {
            delta: self.delta,
            mode: self.mode,
            reposition,
        }
    }
}
