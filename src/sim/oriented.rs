use super::math::Float3;

/// Column-major 4x4 transform, flattened for upload.
pub type Matrix4 = [f32; 16];

pub const IDENTITY_MATRIX: Matrix4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Position plus a right-handed orthonormal `forward`/`up` pair.
///
/// Produced on demand from a sampled track point; the right axis is
/// `forward x up`, which for a track sample equals its `perp`.
///
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrientedPoint {
    pub position: Float3,
    pub forward: Float3,
    pub up: Float3,
}

impl OrientedPoint {
    pub const fn new(position: Float3, forward: Float3, up: Float3) -> Self {
        Self {
            position,
            forward,
            up,
        }
    }

    /// Frame handed out when there is no track to sample.
    pub const IDENTITY: Self = Self::new(Float3::ZERO, Float3::FORWARD, Float3::UP);

    /// Builds the frame of a track sample.
    ///
    /// `perp` is the horizontal banking axis (pointing right of travel) and
    /// `pitch` tilts the travel direction about it, positive when climbing.
    pub fn from_track_sample(center: Float3, perp: Float3, pitch: f32) -> Self {
        let right = perp.normalize();
        let (sin, cos) = (-pitch).sin_cos();
        let forward = -Float3::new(-right.z * cos, sin, right.x * cos).normalize();
        let up = right.cross(forward).normalize();
        Self::new(center, forward, up)
    }

    pub fn right(&self) -> Float3 {
        self.forward.cross(self.up).normalize()
    }

    /// Moves the point along its own axes without changing orientation.
    pub fn offset(self, forward: f32, up: f32, right: f32) -> Self {
        let position =
            self.position + self.forward * forward + self.up * up + self.right() * right;
        Self::new(position, self.forward, self.up)
    }

    /// Same position facing the opposite way.
    pub fn turned_around(self) -> Self {
        Self::new(self.position, -self.forward, self.up)
    }

    /// Transform for meshes authored along +X with +Z as their right side,
    /// such as the procedural car: columns are `forward, up, right, position`.
    pub fn car_matrix(&self) -> Matrix4 {
        let right = self.right();
        columns(self.forward, self.up, right, self.position, 1.0)
    }

    /// Transform for meshes authored facing -Z (imported character models),
    /// uniformly scaled: columns are `right, up, -forward, position`.
    pub fn model_matrix(&self, scale: f32) -> Matrix4 {
        let forward = self.forward.normalize();
        let right = forward.cross(self.up.normalize()).normalize();
        let up = right.cross(forward).normalize();
        columns(right, up, -forward, self.position, scale)
    }
}

impl Default for OrientedPoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn columns(c0: Float3, c1: Float3, c2: Float3, position: Float3, scale: f32) -> Matrix4 {
    [
        c0.x * scale,
        c0.y * scale,
        c0.z * scale,
        0.0,
        c1.x * scale,
        c1.y * scale,
        c1.z * scale,
        0.0,
        c2.x * scale,
        c2.y * scale,
        c2.z * scale,
        0.0,
        position.x,
        position.y,
        position.z,
        1.0,
    ]
}
