// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe retiming for OrdoPlay Editor.
//!
//! This crate redistributes keyframe timing on a timeline:
//! - Absolute spacing (every gap in the selection becomes `delta` frames)
//! - Incremental spacing (`delta` is added to every gap in the selection)
//! - Conflict-free application (no two keys ever share a time, even mid-edit)
//! - Playhead placement after a retime
//!
//! ## Architecture
//!
//! A retime runs as a pipeline over the [`Timeline`] collaborator:
//! - [`range::resolve`] finds the start keyframe and the last keyframe
//! - [`schedule::compute`] walks the keys and builds the target times
//! - [`apply::apply`] renames keys in an order that never collides
//! - [`cursor::reposition`] picks the new playhead time
//!
//! [`Retimer`] ties the stages together against a host that also implements
//! [`TimeControl`]. [`Track`] and [`Sequence`] provide an in-memory host.

pub mod apply;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod keyframe;
pub mod preset;
pub mod range;
pub mod schedule;
pub mod sequence;
pub mod timeline;
pub mod track;

pub use apply::Rename;
pub use engine::{RetimeOutcome, Retimer};
pub use error::{RetimeError, RetimeFailure, TimelineError};
pub use keyframe::{InterpolationMode, Keyframe, KeyframeId, KeyframeValue};
pub use preset::RetimePreset;
pub use range::{ResolvedRange, SelectionRange};
pub use schedule::{RetimeMode, RetimeRequest, Schedule, MIN_SPACING};
pub use sequence::{Sequence, SequenceError, SequenceId, SequenceTimeline};
pub use timeline::{TimeControl, Timeline, TIME_EPSILON};
pub use track::{Track, TrackId};
