use super::loader::{load_points, read_points, RawPoint};
use super::sampler::{sample, TrackPoint};
use crate::error::{RideError, RideResult};
use crate::sim::{wrap_distance, OrientedPoint, TrackParams};
use log::{info, warn};
use std::path::Path;

/// Index of the last sample whose `distance` is at or below `distance`.
///
/// Distances below the first sample resolve to 0. `points` must be sorted by
/// distance and non-empty.
pub fn bracket_index(points: &[TrackPoint], distance: f32) -> usize {
    debug_assert!(!points.is_empty(), "bracket_index called with empty points");
    points
        .partition_point(|p| p.distance <= distance)
        .saturating_sub(1)
}

/// The sampled closed loop. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Track {
    points: Vec<TrackPoint>,
    length: f32,
}

impl Track {
    /// Samples `raw`. Fewer than 2 points gives an empty track.
    pub fn from_raw(raw: &[RawPoint], params: &TrackParams) -> Self {
        if raw.len() < 2 {
            warn!("track has {} points, need at least 2", raw.len());
        }
        let (points, length) = sample(raw, params);
        if !points.is_empty() {
            info!(
                "sampled track: {} points, loop length {:.2}",
                points.len(),
                length
            );
        }
        Self { points, length }
    }

    /// Loads and samples a track file; an unreadable file gives an empty track.
    pub fn load<P: AsRef<Path>>(path: P, params: &TrackParams) -> Self {
        Self::from_raw(&load_points(path), params)
    }

    /// Like [`Track::load`] but reports unreadable files and tracks with
    /// fewer than 2 points as errors.
    pub fn read<P: AsRef<Path>>(path: P, params: &TrackParams) -> RideResult<Self> {
        let raw = read_points(path)?;
        if raw.len() < 2 {
            return Err(RideError::EmptyTrack(raw.len()));
        }
        Ok(Self::from_raw(&raw, params))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closed loop length, including the segment back to point 0.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Wraps any index onto the loop.
    pub fn wrap_index(&self, index: usize) -> usize {
        if self.points.is_empty() {
            0
        } else {
            index % self.points.len()
        }
    }

    pub fn next_index(&self, index: usize) -> usize {
        self.wrap_index(index + 1)
    }

    /// Sample bracketing `distance` after wrapping it onto the loop.
    pub fn point_at(&self, distance: f32) -> Option<&TrackPoint> {
        if self.points.is_empty() {
            return None;
        }
        let wrapped = wrap_distance(distance, self.length);
        Some(&self.points[bracket_index(&self.points, wrapped)])
    }

    /// Sample bracketing `distance` without wrapping; out-of-range distances
    /// resolve to the first or last sample.
    pub fn point_at_clamped(&self, distance: f32) -> Option<&TrackPoint> {
        if self.points.is_empty() {
            return None;
        }
        Some(&self.points[bracket_index(&self.points, distance)])
    }

    /// Frame of the sample bracketing `distance`, identity on an empty track.
    pub fn oriented_at(&self, distance: f32) -> OrientedPoint {
        self.point_at(distance)
            .map(TrackPoint::oriented)
            .unwrap_or(OrientedPoint::IDENTITY)
    }

    /// As [`Track::oriented_at`] but clamped to the ends instead of wrapped.
    pub fn oriented_at_clamped(&self, distance: f32) -> OrientedPoint {
        self.point_at_clamped(distance)
            .map(TrackPoint::oriented)
            .unwrap_or(OrientedPoint::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Float3;
    use approx::assert_relative_eq;
    use std::io::Write;

    const TOLERANCE: f32 = 1e-4;

    fn make_point(distance: f32) -> TrackPoint {
        TrackPoint::new(
            distance,
            0.0,
            Float3::new(distance, 0.0, 0.0),
            Float3::FORWARD,
        )
    }

    fn oval() -> Track {
        let raw: Vec<RawPoint> = (0..64)
            .map(|i| {
                let t = i as f32 / 64.0 * std::f32::consts::TAU;
                RawPoint::new(0.5 - 0.5 * t.cos(), 0.1 + 0.05 * (3.0 * t).sin())
            })
            .collect();
        Track::from_raw(&raw, &TrackParams::default())
    }

    #[test]
    fn bracket_index_finds_segment_start() {
        let points = [make_point(0.0), make_point(10.0), make_point(20.0)];

        assert_eq!(bracket_index(&points, -5.0), 0);
        assert_eq!(bracket_index(&points, 0.0), 0);
        assert_eq!(bracket_index(&points, 9.99), 0);
        assert_eq!(bracket_index(&points, 10.0), 1);
        assert_eq!(bracket_index(&points, 25.0), 2);
    }

    #[test]
    fn bracket_index_matches_linear_scan() {
        let points: Vec<TrackPoint> = (0..50).map(|i| make_point(i as f32 * 1.7)).collect();
        for step in 0..200 {
            let d = step as f32 * 0.43;
            let linear = points
                .iter()
                .rposition(|p| p.distance <= d)
                .unwrap_or(0);
            assert_eq!(bracket_index(&points, d), linear);
        }
    }

    #[test]
    fn empty_track_answers_safely() {
        let track = Track::empty();

        assert!(track.is_empty());
        assert_eq!(track.length(), 0.0);
        assert!(track.point_at(3.0).is_none());
        assert!(track.point_at_clamped(3.0).is_none());
        assert_eq!(track.oriented_at(3.0), OrientedPoint::IDENTITY);
        assert_eq!(track.wrap_index(7), 0);
    }

    #[test]
    fn read_rejects_short_tracks() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "0.5 0.5").expect("write");

        let err = Track::read(file.path(), &TrackParams::default()).unwrap_err();
        assert!(matches!(err, RideError::EmptyTrack(1)));
        assert!(Track::load(file.path(), &TrackParams::default()).is_empty());
    }

    #[test]
    fn read_samples_valid_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "0 0\n1 0\n1 1\n0 1").expect("write");

        let track = Track::read(file.path(), &TrackParams::default()).expect("read");
        assert_eq!(track.len(), 4);
    }

    #[test]
    fn single_point_track_is_empty() {
        let track = Track::from_raw(&[RawPoint::new(0.0, 0.0)], &TrackParams::default());
        assert!(track.is_empty());
    }

    #[test]
    fn loop_closes() {
        let track = oval();
        let points = track.points();
        let last = points[points.len() - 1];

        let closing = last.center.distance(points[track.next_index(points.len() - 1)].center);
        assert_relative_eq!(last.distance + closing, track.length(), epsilon = TOLERANCE);
        assert_eq!(track.next_index(points.len() - 1), 0);
        for pair in points.windows(2) {
            assert!(pair[1].distance >= pair[0].distance);
        }
    }

    #[test]
    fn point_at_wraps_both_ways() {
        let track = oval();
        let length = track.length();
        let d = track.points()[10].distance + 0.01;

        assert_eq!(track.point_at(d), Some(&track.points()[10]));
        assert_eq!(track.point_at(d + length), Some(&track.points()[10]));
        assert_eq!(track.point_at(d - length), Some(&track.points()[10]));
    }

    #[test]
    fn clamped_lookup_does_not_wrap() {
        let track = oval();
        let last = track.len() - 1;

        assert_eq!(track.point_at_clamped(-10.0), Some(&track.points()[0]));
        assert_eq!(
            track.point_at_clamped(track.length() * 2.0),
            Some(&track.points()[last])
        );
    }

    #[test]
    fn oriented_at_is_orthonormal() {
        let track = oval();
        for i in 0..40 {
            let frame = track.oriented_at(i as f32 * 3.1);
            assert_relative_eq!(frame.forward.magnitude(), 1.0, epsilon = TOLERANCE);
            assert_relative_eq!(frame.up.magnitude(), 1.0, epsilon = TOLERANCE);
            assert_relative_eq!(frame.forward.dot(frame.up), 0.0, epsilon = TOLERANCE);
        }
    }
}
