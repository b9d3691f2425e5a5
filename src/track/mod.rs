//! Track loading, sampling, lookup and meshing.
//!
//! A track file of 2D points becomes a closed 3D loop of samples with
//! cumulative distance, smoothed pitch and a sideways direction. Everything
//! downstream reads the loop through [`Track`].

mod loader;
mod lookup;
mod mesh;
mod sampler;

pub use loader::{load_points, parse_points, read_points, RawPoint};
pub use lookup::{bracket_index, Track};
pub use mesh::TrackMesh;
pub use sampler::{sample, smooth_pitch, TrackPoint};
