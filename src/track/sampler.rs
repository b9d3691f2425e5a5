use super::loader::RawPoint;
use super::lookup::bracket_index;
use crate::sim::{Float3, OrientedPoint, TrackParams};

/// One sample of the closed track loop.
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackPoint {
    /// Arc length from point 0.
    pub distance: f32,
    /// Smoothed slope in radians, positive when climbing.
    pub pitch: f32,
    pub center: Float3,
    /// Horizontal unit vector to the right of travel.
    pub perp: Float3,
}

impl TrackPoint {
    pub const fn new(distance: f32, pitch: f32, center: Float3, perp: Float3) -> Self {
        Self {
            distance,
            pitch,
            center,
            perp,
        }
    }

    pub const DEFAULT: Self = Self::new(0.0, 0.0, Float3::ZERO, Float3::FORWARD);

    /// Frame of a car sitting on this sample.
    pub fn oriented(&self) -> OrientedPoint {
        OrientedPoint::from_track_sample(self.center, self.perp, self.pitch)
    }
}

impl Default for TrackPoint {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Indices of the leftmost and rightmost inputs plus the lowest height.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EllipseExtremes {
    left: usize,
    right: usize,
    min_y: f32,
}

/// Samples the closed loop described by `raw`.
///
/// Returns no points for fewer than 2 inputs.
pub fn sample(raw: &[RawPoint], params: &TrackParams) -> (Vec<TrackPoint>, f32) {
    if raw.len() < 2 {
        return (Vec::new(), 0.0);
    }

    let extremes = find_extremes(raw);
    let mut points = compute_centers(raw, extremes, params);
    let length = compute_distances_and_perps(&mut points, params.min_direction);
    compute_pitch(&mut points, length, params.wheel_base);
    smooth_pitch(&mut points, params.pitch_smoothing);

    (points, length)
}

fn find_extremes(raw: &[RawPoint]) -> EllipseExtremes {
    let mut extremes = EllipseExtremes {
        left: 0,
        right: 0,
        min_y: raw[0].y,
    };
    for (i, p) in raw.iter().enumerate().skip(1) {
        if p.x < raw[extremes.left].x {
            extremes.left = i;
        }
        if p.x > raw[extremes.right].x {
            extremes.right = i;
        }
        extremes.min_y = extremes.min_y.min(p.y);
    }
    extremes
}

/// Projects the 2D profile onto an ellipse in the ground plane.
///
/// Input x spans the major axis; the half of the loop between the leftmost
/// and rightmost points (in traversal order) goes on the far side.
fn compute_centers(
    raw: &[RawPoint],
    extremes: EllipseExtremes,
    params: &TrackParams,
) -> Vec<TrackPoint> {
    let a = params.ellipse_a;
    let b = params.ellipse_b;
    let left_x = raw[extremes.left].x;
    let span = raw[extremes.right].x - left_x;

    raw.iter()
        .enumerate()
        .map(|(i, p)| {
            let y = (p.y - extremes.min_y) * params.height_scale + params.thickness;
            let x = if span > f32::EPSILON {
                (p.x - left_x) / span * 2.0 * a - a
            } else {
                0.0
            };
            let mut z = b * (1.0 - (x * x) / (a * a)).max(0.0).sqrt();
            if on_far_side(i, extremes) {
                z = -z;
            }
            TrackPoint::new(0.0, 0.0, Float3::new(x, y, z), Float3::FORWARD)
        })
        .collect()
}

fn on_far_side(i: usize, extremes: EllipseExtremes) -> bool {
    if extremes.left <= extremes.right {
        i > extremes.left && i < extremes.right
    } else {
        i > extremes.left || i < extremes.right
    }
}

/// Fills `distance` and `perp`, returning the closed loop length.
///
/// A near-vertical or duplicate step keeps the previous perp.
fn compute_distances_and_perps(points: &mut [TrackPoint], min_direction: f32) -> f32 {
    let n = points.len();
    let mut total = 0.0;
    let mut last_perp = Float3::FORWARD;

    for i in 0..n {
        let next = points[(i + 1) % n].center;
        let here = points[i].center;
        points[i].distance = total;
        total += here.distance(next);

        let dir = (next - here).flatten();
        if dir.magnitude() > min_direction {
            let dir = dir.normalize();
            last_perp = Float3::new(-dir.z, 0.0, dir.x);
        }
        points[i].perp = last_perp;
    }

    total
}

/// Slope between the axle positions half a wheel base ahead and behind.
fn compute_pitch(points: &mut [TrackPoint], length: f32, wheel_base: f32) {
    let half = wheel_base * 0.5;
    let raw_pitch: Vec<f32> = points
        .iter()
        .map(|p| {
            let mut front = p.distance + half;
            let mut back = p.distance - half;
            if front >= length {
                front -= length;
            }
            if back < 0.0 {
                back += length;
            }

            let front_center = points[bracket_index(points, front)].center;
            let back_center = points[bracket_index(points, back)].center;
            let d = front_center - back_center;
            d.y.atan2(d.x.hypot(d.z))
        })
        .collect();

    for (p, pitch) in points.iter_mut().zip(raw_pitch) {
        p.pitch = pitch;
    }
}

/// Single-pole low-pass over the loop, seeded with the last point's value.
pub fn smooth_pitch(points: &mut [TrackPoint], alpha: f32) {
    let Some(last) = points.last() else {
        return;
    };
    let mut prev = last.pitch;
    for p in points.iter_mut() {
        p.pitch = prev + (p.pitch - prev) * alpha;
        prev = p.pitch;
    }
}
