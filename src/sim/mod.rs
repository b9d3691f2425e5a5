//! Math primitives, frames and motion helpers.
//!
//! Nothing in here knows about tracks or trains; the higher layers build on
//! these types.

mod math;
mod mesh;
mod oriented;
mod params;

pub mod motion;

pub use math::{Color, Float3};
pub use mesh::{DrawRange, MeshBuffers, Vertex, Winding};
pub use motion::{clamp_delta, ease_out, remaining_fraction, wrap_distance};
pub use oriented::{Matrix4, OrientedPoint, IDENTITY_MATRIX};
pub use params::{CarParams, MeshParams, TrackParams, TrainParams};
