//! Frame-step constants and easing helpers shared by the train states.

/// Frame time substituted for an implausibly long step.
pub const NOMINAL_DT: f32 = 0.016;
/// Longest step accepted as-is (seconds).
pub const MAX_DT: f32 = 0.5;
/// Remaining distance at which a slowdown counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 0.05;

/// Clamps a frame delta after a stall or a window pause.
///
/// Anything above `max_dt` (or non-finite) is replaced by `nominal_dt`;
/// negative deltas advance nothing.
pub fn clamp_delta(delta: f32, max_dt: f32, nominal_dt: f32) -> f32 {
    if !delta.is_finite() || delta > max_dt {
        return nominal_dt;
    }
    delta.max(0.0)
}

/// Fraction of a slowdown window still ahead, in `[0, 1]`.
pub fn remaining_fraction(remaining: f32, window: f32) -> f32 {
    if window <= 0.0 {
        return 0.0;
    }
    (remaining / window).clamp(0.0, 1.0)
}

/// Ease-out profile `start * t^exponent`.
///
/// With `exponent < 1` the speed still reaches zero in finite distance, so
/// the train arrives instead of creeping forever.
pub fn ease_out(start: f32, t: f32, exponent: f32) -> f32 {
    start * t.clamp(0.0, 1.0).powf(exponent)
}

/// Wraps a distance into `[0, length)`.
pub fn wrap_distance(distance: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    let wrapped = distance.rem_euclid(length);
    // rem_euclid can round up to exactly `length` for tiny negative inputs
    if wrapped >= length {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn clamp_delta_passes_normal_steps() {
        assert_relative_eq!(clamp_delta(0.016, MAX_DT, NOMINAL_DT), 0.016, epsilon = TOLERANCE);
        assert_relative_eq!(clamp_delta(0.5, MAX_DT, NOMINAL_DT), 0.5, epsilon = TOLERANCE);
    }

    #[test]
    fn clamp_delta_replaces_stalls() {
        assert_relative_eq!(clamp_delta(3.0, MAX_DT, NOMINAL_DT), NOMINAL_DT, epsilon = TOLERANCE);
        assert_relative_eq!(
            clamp_delta(f32::INFINITY, MAX_DT, NOMINAL_DT),
            NOMINAL_DT,
            epsilon = TOLERANCE
        );
        assert_relative_eq!(
            clamp_delta(f32::NAN, MAX_DT, NOMINAL_DT),
            NOMINAL_DT,
            epsilon = TOLERANCE
        );
    }

    #[test]
    fn clamp_delta_rejects_negative() {
        assert_relative_eq!(clamp_delta(-0.1, MAX_DT, NOMINAL_DT), 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn remaining_fraction_maps_window() {
        assert_relative_eq!(remaining_fraction(5.0, 10.0), 0.5, epsilon = TOLERANCE);
        assert_relative_eq!(remaining_fraction(15.0, 10.0), 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(remaining_fraction(-1.0, 10.0), 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(remaining_fraction(1.0, 0.0), 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn ease_out_endpoints() {
        assert_relative_eq!(ease_out(20.0, 1.0, 0.82), 20.0, epsilon = TOLERANCE);
        assert_relative_eq!(ease_out(20.0, 0.0, 0.82), 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn ease_out_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..=10 {
            let v = ease_out(10.0, i as f32 / 10.0, 0.7);
            assert!(v > prev);
            prev = v;
        }
    }

    #[test]
    fn wrap_distance_handles_both_directions() {
        assert_relative_eq!(wrap_distance(-3.8, 100.0), 96.2, epsilon = 1e-4);
        assert_relative_eq!(wrap_distance(250.0, 100.0), 50.0, epsilon = 1e-4);
        assert_relative_eq!(wrap_distance(0.0, 100.0), 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(wrap_distance(5.0, 0.0), 0.0, epsilon = TOLERANCE);
    }
}
