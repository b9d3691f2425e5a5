//! coaster-ride - procedural rollercoaster track and train ride simulation.
//!
//! # Architecture
//!
//! Layered modules with strict inward-only dependencies:
//!
//! - **sim**: Math primitives, frames, mesh buffers, tuning parameters
//! - **track**: Track file loading, sampling, lookup and meshing
//! - **train**: Seats, motion state machine, car mesh
//! - **config**: JSON/YAML ride configuration
//! - **ffi**: C FFI bindings (feature `ffi`)
//!
//! # Usage
//!
//! ```ignore
//! use coaster_ride::{RideConfig, Track, TrackMesh, Train};
//! use std::sync::Arc;
//!
//! let config = RideConfig::default();
//! let track = Arc::new(Track::load("track.txt", &config.track));
//! let mesh = TrackMesh::build(&track, &config.track, &config.mesh);
//! let mut train = Train::new(track, config.train, config.car);
//! train.update(0.016);
//! ```
//!
//! For C hosts, link the cdylib and use the `rc_*` FFI functions.

pub mod config;
pub mod error;
pub mod sim;
pub mod track;
pub mod train;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types at crate root
pub use config::RideConfig;
pub use error::{RideError, RideResult};
pub use sim::{Float3, OrientedPoint};
pub use track::{Track, TrackMesh, TrackPoint};
pub use train::{CarMesh, Train, TrainMode};
