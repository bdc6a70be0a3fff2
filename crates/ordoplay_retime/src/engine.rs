// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retime pipeline entry point.

use crate::apply::{self, Rename};
use crate::cursor;
use crate::error::{Result, RetimeFailure};
use crate::range::{self, ResolvedRange, SelectionRange};
use crate::schedule::{self, RetimeRequest, Schedule};
use crate::timeline::{TimeControl, Timeline};
use serde::Serialize;

/// Report of a successful retime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetimeOutcome {
    /// Keys the retime was anchored on
    pub resolved: ResolvedRange,
    /// Target times that were applied
    pub schedule: Schedule,
    /// Renames in the order they were performed
    pub renames: Vec<Rename>,
    /// Playhead time after the retime
    pub playhead: f64,
}

impl RetimeOutcome {
    /// Renames that had to wait for later keys
    pub fn deferred_count(&self) -> usize {
        self.renames.iter().filter(|r| r.deferred).count()
    }

    /// Renames that actually changed a key's time
    pub fn moved_count(&self) -> usize {
        self.renames.iter().filter(|r| r.from != r.to).count()
    }
}

/// Runs resolve, schedule, apply and reposition as one invocation
pub struct Retimer;

impl Retimer {
    /// Retime the host's selected range
    pub fn retime<H>(host: &mut H, request: &RetimeRequest) -> std::result::Result<RetimeOutcome, RetimeFailure>
    where
        H: Timeline + TimeControl + ?Sized,
    {
        let range = host.selected_range();
        Self::retime_range(host, range, request)
    }

    /// Retime an explicit range instead of the host selection
    pub fn retime_range<H>(
        host: &mut H,
        range: SelectionRange,
        request: &RetimeRequest,
    ) -> std::result::Result<RetimeOutcome, RetimeFailure>
    where
        H: Timeline + TimeControl + ?Sized,
    {
        Self::run(host, range, request).map_err(|source| {
            tracing::warn!(
                "Retime of {}..={} ({}, delta {}) failed: {}",
                range.start,
                range.end,
                request.mode,
                request.delta,
                source
            );
            RetimeFailure {
                range,
                mode: request.mode,
                delta: request.delta,
                source,
            }
        })
    }

    /// Compute the schedule a retime would apply, without touching anything
    pub fn preview<T>(
        timeline: &T,
        range: SelectionRange,
        request: &RetimeRequest,
    ) -> std::result::Result<Schedule, RetimeFailure>
    where
        T: Timeline + ?Sized,
    {
        let plan = || -> Result<Schedule> {
            let range = SelectionRange::new(range.start, range.end)?;
            let resolved = range::resolve(timeline, range)?;
            schedule::compute(timeline, &resolved, request)
        };
        plan().map_err(|source| RetimeFailure {
            range,
            mode: request.mode,
            delta: request.delta,
            source,
        })
    }

    fn run<H>(host: &mut H, range: SelectionRange, request: &RetimeRequest) -> Result<RetimeOutcome>
    where
        H: Timeline + TimeControl + ?Sized,
    {
        let range = SelectionRange::new(range.start, range.end)?;
        let resolved = range::resolve(&*host, range)?;
        let schedule = schedule::compute(&*host, &resolved, request)?;

        let renames = if schedule.needs_mutation() {
            apply::apply(host, resolved.start_keyframe, &schedule)?
        } else {
            Vec::new()
        };

        let playhead = cursor::reposition(&*host, range, resolved.start_keyframe, request);
        host.set_playhead(playhead);

        let outcome = RetimeOutcome {
            resolved,
            schedule,
            renames,
            playhead,
        };
        tracing::info!(
            "Retimed {}..={} ({}, delta {}): {} keys moved, {} deferred, playhead {}",
            range.start,
            range.end,
            request.mode,
            request.delta,
            outcome.moved_count(),
            outcome.deferred_count(),
            playhead
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetimeError;
    use crate::schedule::RetimeMode;
    use crate::sequence::Sequence;
    use crate::track::{Track, TrackId};

    fn sequence(times: &[f64], start: f64, end: f64) -> (Sequence, TrackId) {
        let mut sequence = Sequence::new("test");
        let id = sequence.add_track(Track::with_times("keys", times).unwrap());
        sequence.selection = SelectionRange::new(start, end).unwrap();
        (sequence, id)
    }

    fn retime(sequence: &mut Sequence, id: TrackId, request: RetimeRequest) -> std::result::Result<RetimeOutcome, RetimeFailure> {
        let mut timeline = sequence.timeline(id).unwrap();
        Retimer::retime(&mut timeline, &request)
    }

    fn times(sequence: &Sequence, id: TrackId) -> Vec<f64> {
        sequence.track(id).unwrap().times()
    }

    #[test]
    fn test_absolute_inside_selection() {
        let (mut seq, id) = sequence(&[0.0, 10.0, 20.0, 30.0], 10.0, 20.0);
        let outcome = retime(&mut seq, id, RetimeRequest::absolute(5.0)).unwrap();

        assert_eq!(outcome.schedule.targets(), &[10.0, 15.0, 20.0]);
        assert_eq!(times(&seq, id), vec![0.0, 10.0, 15.0, 20.0]);
        assert_eq!(outcome.playhead, 10.0);
        assert_eq!(seq.playhead, 10.0);
    }

    #[test]
    fn test_single_keyframe_selection() {
        let (mut seq, id) = sequence(&[0.0, 5.0], 5.0, 5.0);
        let outcome = retime(&mut seq, id, RetimeRequest::absolute(3.0)).unwrap();

        assert_eq!(outcome.schedule.len(), 1);
        assert!(outcome.renames.is_empty());
        assert_eq!(times(&seq, id), vec![0.0, 5.0]);
        assert_eq!(seq.playhead, 5.0);
    }

    #[test]
    fn test_expansion_order() {
        let (mut seq, id) = sequence(&[0.0, 2.0, 4.0, 6.0], 0.0, 6.0);
        let outcome = retime(&mut seq, id, RetimeRequest::absolute(5.0)).unwrap();

        let order: Vec<(f64, f64)> = outcome.renames.iter().map(|r| (r.from, r.to)).collect();
        let six = order.iter().position(|&m| m == (6.0, 15.0)).unwrap();
        let four = order.iter().position(|&m| m == (4.0, 10.0)).unwrap();
        assert!(six < four);
        assert_eq!(outcome.deferred_count(), 2);
        assert_eq!(times(&seq, id), vec![0.0, 5.0, 10.0, 15.0]);
    }

    #[test]
    fn test_compression_order() {
        let (mut seq, id) = sequence(&[0.0, 10.0, 20.0, 30.0], 0.0, 30.0);
        let outcome = retime(&mut seq, id, RetimeRequest::absolute(1.0)).unwrap();

        assert_eq!(outcome.deferred_count(), 0);
        assert_eq!(outcome.moved_count(), 3);
        assert_eq!(times(&seq, id), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_uniform_spacing_is_identity() {
        let original = [0.0, 5.0, 10.0, 15.0, 20.0, 27.0];
        let (mut seq, id) = sequence(&original, 5.0, 10.0);
        retime(&mut seq, id, RetimeRequest::absolute(5.0)).unwrap();
        assert_eq!(times(&seq, id), original.to_vec());
    }

    #[test]
    fn test_preceding_key_never_moves() {
        let (mut seq, id) = sequence(&[0.0, 10.0, 20.0], 4.0, 6.0);
        let outcome = retime(&mut seq, id, RetimeRequest::incremental(2.0)).unwrap();

        assert_eq!(outcome.resolved.start_keyframe, 0.0);
        assert_eq!(times(&seq, id), vec![0.0, 12.0, 22.0]);
    }

    #[test]
    fn test_move_to_next_frame() {
        let (mut seq, id) = sequence(&[0.0, 2.0, 4.0, 6.0], 0.0, 6.0);
        retime(&mut seq, id, RetimeRequest::absolute(5.0).with_reposition(true)).unwrap();
        assert_eq!(seq.playhead, 5.0);
    }

    #[test]
    fn test_failure_carries_context() {
        let (mut seq, id) = sequence(&[5.0, 10.0], 0.0, 2.0);
        seq.playhead = 1.0;
        let failure = retime(&mut seq, id, RetimeRequest::incremental(-1.0)).unwrap_err();

        assert_eq!(failure.range, SelectionRange { start: 0.0, end: 2.0 });
        assert_eq!(failure.mode, RetimeMode::Incremental);
        assert_eq!(failure.delta, -1.0);
        assert_eq!(failure.source, RetimeError::NoPrecedingKeyframe { range_start: 0.0 });
        // Nothing was touched
        assert_eq!(times(&seq, id), vec![5.0, 10.0]);
        assert_eq!(seq.playhead, 1.0);
    }

    #[test]
    fn test_invalid_delta_rejected_before_mutation() {
        let (mut seq, id) = sequence(&[0.0, 10.0], 0.0, 10.0);
        let failure = retime(&mut seq, id, RetimeRequest::absolute(0.0)).unwrap_err();
        assert!(matches!(failure.source, RetimeError::InvalidDelta { .. }));
        assert_eq!(times(&seq, id), vec![0.0, 10.0]);
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let track = Track::with_times("t", &[0.0, 2.0, 4.0]).unwrap();
        let range = SelectionRange::new(0.0, 4.0).unwrap();
        let schedule = Retimer::preview(&track, range, &RetimeRequest::incremental(1.0)).unwrap();

        assert_eq!(schedule.targets(), &[0.0, 3.0, 6.0]);
        assert_eq!(track.times(), vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_explicit_range() {
        let (mut seq, id) = sequence(&[0.0, 10.0, 20.0], 0.0, 0.0);
        {
            let mut timeline = seq.timeline(id).unwrap();
            let range = SelectionRange::new(10.0, 10.0).unwrap();
            Retimer::retime_range(&mut timeline, range, &RetimeRequest::absolute(2.0)).unwrap();
        }
        assert_eq!(times(&seq, id), vec![0.0, 10.0, 12.0]);
    }
}
