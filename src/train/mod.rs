//! The train: seats, motion state machine and the car mesh.

mod car_mesh;
mod seats;
mod simulator;

pub use car_mesh::CarMesh;
pub use seats::{belt_transform, seat_transform, Passenger, Seats};
pub use simulator::{DrawList, PassengerDraw, Train, TrainMode};
