//! Tuning parameters. Defaults reproduce the shipped ride.

use super::math::Color;
use serde::{Deserialize, Serialize};

/// Shape of the sampled track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Horizontal semi-axis the input x range is stretched over.
    pub ellipse_a: f32,
    /// Depth semi-axis.
    pub ellipse_b: f32,
    /// Multiplier from input y to world height.
    pub height_scale: f32,
    pub thickness: f32,
    pub half_width: f32,
    /// Distance between the front and rear axles of one car.
    pub wheel_base: f32,
    /// Blend factor of the pitch low-pass.
    pub pitch_smoothing: f32,
    /// Shortest horizontal step that still defines a travel direction.
    pub min_direction: f32,
}

impl Default for TrackParams {
    fn default() -> Self {
        const SIZE: f32 = 8.0;
        const CAR_LENGTH: f32 = 6.0;
        const WHEEL_LENGTH_OFFSET_RATIO: f32 = 0.32;
        Self {
            ellipse_a: 6.0 * SIZE,
            ellipse_b: 3.0 * SIZE,
            height_scale: 8.0 * SIZE,
            thickness: 0.36,
            half_width: 1.5,
            wheel_base: CAR_LENGTH * WHEEL_LENGTH_OFFSET_RATIO * 2.0,
            pitch_smoothing: 0.05,
            min_direction: 1e-4,
        }
    }
}

/// Support structure and colors of the track mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    pub support_radius: f32,
    /// Horizontal track length between support columns.
    pub support_spacing: f32,
    /// Height between brace levels.
    pub support_vertical_spacing: f32,
    pub support_sides: u32,
    /// Brace radius as a fraction of the column radius.
    pub brace_radius_ratio: f32,
    /// How far inside the rail edge a column sits, in column radii.
    pub column_inset_ratio: f32,
    /// How far below the centerline a column ends, in track thicknesses.
    pub column_drop_ratio: f32,
    /// Gap between column top and first brace, in vertical spacings.
    pub first_brace_ratio: f32,
    /// Lowest allowed brace height, in vertical spacings.
    pub lowest_brace_ratio: f32,
    /// Cylinders shorter than this are skipped.
    pub min_cylinder_length: f32,
    pub track_color: Color,
    pub support_color: Color,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            support_radius: 0.1,
            support_spacing: 1.5,
            support_vertical_spacing: 1.8,
            support_sides: 16,
            brace_radius_ratio: 0.64,
            column_inset_ratio: 1.1,
            column_drop_ratio: 0.75,
            first_brace_ratio: 0.67,
            lowest_brace_ratio: 0.1,
            min_cylinder_length: 0.001,
            track_color: Color::new(0.8, 0.4, 0.1),
            support_color: Color::new(0.5, 0.5, 0.5),
        }
    }
}

/// Train motion and seating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub car_count: usize,
    pub seats_per_car: usize,
    /// Arc length between consecutive car anchors.
    pub car_spacing: f32,
    /// Lead offset after a reset; the lap ends this far from a full loop.
    pub start_offset: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub sick_max_speed: f32,
    /// Braking distance of an emergency stop.
    pub slowdown_distance: f32,
    pub finish_slowdown_distance: f32,
    pub sick_finish_slowdown_distance: f32,
    pub arrival_epsilon: f32,
    pub flat_accel: f32,
    /// Acceleration per unit of `-sin(pitch)`; also the stall-recovery push.
    pub slope_factor: f32,
    pub run_ease_exponent: f32,
    pub sick_ease_exponent: f32,
    /// Pause after an emergency stop (seconds).
    pub sick_pause: f32,
    pub max_dt: f32,
    pub nominal_dt: f32,
    pub camera_forward_offset: f32,
    pub camera_height_offset: f32,
    /// Number of distinct passenger models handed out on boarding.
    pub passenger_models: usize,
    pub shuffle_seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            car_count: 4,
            seats_per_car: 2,
            car_spacing: 8.6,
            start_offset: -3.8,
            min_speed: 3.8,
            max_speed: 64.0,
            sick_max_speed: 8.0,
            slowdown_distance: 10.0,
            finish_slowdown_distance: 42.0,
            sick_finish_slowdown_distance: 18.0,
            arrival_epsilon: super::motion::ARRIVAL_EPSILON,
            flat_accel: 7.0,
            slope_factor: 32.0,
            run_ease_exponent: 0.82,
            sick_ease_exponent: 0.7,
            sick_pause: 10.0,
            max_dt: super::motion::MAX_DT,
            nominal_dt: super::motion::NOMINAL_DT,
            camera_forward_offset: 1.0,
            camera_height_offset: 5.0,
            passenger_models: 8,
            shuffle_seed: 42,
        }
    }
}

impl TrainParams {
    pub fn seat_count(&self) -> usize {
        self.car_count * self.seats_per_car
    }
}

/// Procedural car body and seat placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    pub length: f32,
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
    pub wheel_radius: f32,
    pub wheel_width: f32,
    pub wheel_length_offset_ratio: f32,
    pub wheel_width_offset_ratio: f32,
    pub wheel_sides: u32,
    pub stripe_height_ratio: f32,
    pub stripe_offset: f32,
    pub seat_depth: f32,
    pub seat_height: f32,
    pub seat_back_height: f32,
    pub seat_back_thickness: f32,
    pub front_seat_ratio: f32,
    pub back_seat_ratio: f32,
    /// Shift of a seated passenger toward the seat back.
    pub passenger_backward_offset: f32,
    /// Belt position relative to the passenger: (up, right, forward).
    pub belt_offset: [f32; 3],
    /// Uniform scale of passenger and belt models.
    pub passenger_scale: f32,
    pub belt_scale: f32,
    pub body_color: Color,
    pub stripe_color: Color,
    pub seat_color: Color,
    pub wheel_color: Color,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            length: 6.0,
            width: 2.4,
            height: 2.8,
            wall_thickness: 0.08,
            wheel_radius: 0.4,
            wheel_width: 0.35,
            wheel_length_offset_ratio: 0.32,
            wheel_width_offset_ratio: 0.85,
            wheel_sides: 16,
            stripe_height_ratio: 0.25,
            stripe_offset: 0.002,
            seat_depth: 1.5,
            seat_height: 1.3,
            seat_back_height: 1.8,
            seat_back_thickness: 0.25,
            front_seat_ratio: 0.3,
            back_seat_ratio: -0.7,
            passenger_backward_offset: -0.5,
            belt_offset: [-1.15, 0.3, 0.0],
            passenger_scale: 3.0,
            belt_scale: 3.0,
            body_color: Color::new(0.85, 0.1, 0.1),
            stripe_color: Color::new(1.0, 0.85, 0.1),
            seat_color: Color::new(0.5, 0.5, 0.5),
            wheel_color: Color::new(0.1, 0.1, 0.1),
        }
    }
}

impl CarParams {
    /// Offset along the car's forward axis of a passenger's seat.
    pub fn seat_forward_offset(&self, front_seat: bool) -> f32 {
        let ratio = if front_seat {
            self.front_seat_ratio
        } else {
            self.back_seat_ratio
        };
        (self.length / 2.0 - self.wall_thickness) * ratio + self.passenger_backward_offset
    }

    /// Height of a seated passenger above the car anchor.
    pub fn seat_height_offset(&self) -> f32 {
        self.wheel_radius + self.wall_thickness + self.seat_height * 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_track_defaults() {
        let params = TrackParams::default();
        assert_eq!(params.ellipse_a, 48.0);
        assert_eq!(params.ellipse_b, 24.0);
        assert_eq!(params.height_scale, 64.0);
        assert_relative_eq!(params.wheel_base, 3.84, epsilon = 1e-6);
    }

    #[test]
    fn test_train_defaults() {
        let params = TrainParams::default();
        assert_eq!(params.car_count, 4);
        assert_eq!(params.seat_count(), 8);
        assert_eq!(params.run_ease_exponent, 0.82);
        assert_eq!(params.sick_ease_exponent, 0.7);
        assert!(params.sick_max_speed < params.max_speed);
    }

    #[test]
    fn test_seat_offsets() {
        let car = CarParams::default();
        assert_relative_eq!(car.seat_forward_offset(true), 2.92 * 0.3 - 0.5, epsilon = 1e-5);
        assert_relative_eq!(car.seat_forward_offset(false), 2.92 * -0.7 - 0.5, epsilon = 1e-5);
        assert_relative_eq!(car.seat_height_offset(), 0.61, epsilon = 1e-5);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let params: TrainParams = serde_json::from_str(r#"{ "max_speed": 30.0 }"#).unwrap();
        assert_eq!(params.max_speed, 30.0);
        assert_eq!(params.car_count, 4);
    }

    #[test]
    fn test_debug() {
        let params = MeshParams::default();
        let debug_str = format!("{:?}", params);
        assert!(debug_str.contains("MeshParams"));
        assert!(debug_str.contains("support_spacing"));
    }
}
