//! Train motion state machine.
//!
//! The train is a single lead offset along the loop; every car trails it by
//! a fixed arc length. One `update` per rendered frame advances the offset
//! according to the current mode.

use super::seats::{belt_transform, seat_transform, Passenger, Seats};
use crate::sim::{
    clamp_delta, ease_out, remaining_fraction, wrap_distance, CarParams, Matrix4, OrientedPoint,
    TrainParams,
};
use crate::track::Track;
use log::debug;
use std::sync::Arc;

#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TrainMode {
    /// Boarding; the train does not move.
    #[default]
    Waiting = 0,
    Running = 1,
    /// Braking toward the stop distance after an incident.
    EmergencyStop = 2,
    /// Paused, then a slow ride back to the station.
    SickMode = 3,
    /// Arrived after a sick ride; the owner resets.
    Finished = 4,
}

impl TryFrom<i32> for TrainMode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Waiting),
            1 => Ok(Self::Running),
            2 => Ok(Self::EmergencyStop),
            3 => Ok(Self::SickMode),
            4 => Ok(Self::Finished),
            other => Err(other),
        }
    }
}

/// One visible passenger.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassengerDraw {
    pub seat: usize,
    pub model: usize,
    pub sick: bool,
    pub transform: Matrix4,
    /// Present while the passenger is belted.
    pub belt: Option<Matrix4>,
}

/// Everything the renderer needs to draw the train this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub cars: Vec<Matrix4>,
    pub passengers: Vec<PassengerDraw>,
}

#[derive(Debug, Clone)]
pub struct Train {
    track: Arc<Track>,
    params: TrainParams,
    car: CarParams,
    offset: f32,
    current_speed: f32,
    pre_stop_speed: f32,
    stop_distance: f32,
    stop_window: f32,
    sleep_timer: f32,
    mode: TrainMode,
    seats: Seats,
}

impl Train {
    pub fn new(track: Arc<Track>, params: TrainParams, car: CarParams) -> Self {
        Self {
            track,
            offset: params.start_offset,
            current_speed: 0.0,
            pre_stop_speed: 0.0,
            stop_distance: 0.0,
            stop_window: params.slowdown_distance,
            sleep_timer: 0.0,
            mode: TrainMode::Waiting,
            seats: Seats::new(&params),
            params,
            car,
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn params(&self) -> &TrainParams {
        &self.params
    }

    pub fn mode(&self) -> TrainMode {
        self.mode
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn stop_distance(&self) -> f32 {
        self.stop_distance
    }

    pub fn sleep_timer(&self) -> f32 {
        self.sleep_timer
    }

    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    pub fn is_finished(&self) -> bool {
        self.mode == TrainMode::Finished
    }

    /// Where the lap ends: just short of a full loop from the start point.
    pub fn finish_distance(&self) -> f32 {
        self.track.length() + self.params.start_offset
    }

    /// Lets the owner drive transitions it controls.
    pub fn set_mode(&mut self, mode: TrainMode) {
        self.transition(mode);
    }

    fn transition(&mut self, mode: TrainMode) {
        if self.mode != mode {
            debug!(
                "train {:?} -> {:?} at offset {:.2}",
                self.mode, mode, self.offset
            );
        }
        self.mode = mode;
    }

    pub fn add_passenger(&mut self) -> Option<usize> {
        self.seats.add_passenger()
    }

    pub fn buckle_up(&mut self, seat: usize) -> bool {
        self.seats.buckle_up(seat)
    }

    pub fn toggle_belt(&mut self, seat: usize) -> bool {
        self.seats.toggle_belt(seat)
    }

    /// Leaves the station. Refused unless waiting with at least one
    /// passenger and every passenger belted.
    pub fn start(&mut self) -> bool {
        if self.mode != TrainMode::Waiting || !self.seats.ready_to_start() {
            return false;
        }
        self.transition(TrainMode::Running);
        true
    }

    /// Brakes to a halt `distance` ahead, never past the finish.
    pub fn trigger_emergency_stop(&mut self, distance: f32) -> bool {
        if self.mode != TrainMode::Running {
            return false;
        }
        let distance = distance.max(0.0);
        self.stop_distance = (self.offset + distance).min(self.finish_distance());
        self.stop_window = distance;
        self.pre_stop_speed = self.current_speed;
        self.transition(TrainMode::EmergencyStop);
        true
    }

    /// A passenger got sick: flag them and stop the train.
    pub fn make_sick(&mut self, seat: usize) -> bool {
        if self.mode != TrainMode::Running || !self.seats.mark_sick(seat) {
            return false;
        }
        self.trigger_emergency_stop(self.params.slowdown_distance)
    }

    /// Back to the station: position, speeds, timers and seats.
    pub fn reset(&mut self) {
        self.offset = self.params.start_offset;
        self.current_speed = 0.0;
        self.pre_stop_speed = 0.0;
        self.stop_distance = 0.0;
        self.stop_window = self.params.slowdown_distance;
        self.sleep_timer = 0.0;
        self.seats.clear();
        self.transition(TrainMode::Waiting);
    }

    pub fn update(&mut self, delta: f32) {
        if self.track.is_empty() {
            return;
        }
        let delta = clamp_delta(delta, self.params.max_dt, self.params.nominal_dt);

        if self.sleep_timer > 0.0 {
            self.sleep_timer -= delta;
            return;
        }

        match self.mode {
            TrainMode::Running => self.update_running(delta),
            TrainMode::EmergencyStop => self.update_emergency_stop(delta),
            TrainMode::SickMode => self.update_sick(delta),
            TrainMode::Waiting | TrainMode::Finished => {}
        }
    }

    fn update_running(&mut self, delta: f32) {
        let p = self.params;
        let length = self.track.length();
        let finish = self.finish_distance();
        let remaining = finish - self.offset;

        if remaining <= p.arrival_epsilon {
            self.offset = finish;
            self.current_speed = 0.0;
            debug!("lap complete");
            self.reset();
            return;
        }

        // Rear cars weigh less than the lead car.
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for i in 0..p.car_count {
            let distance = wrap_distance(self.offset - i as f32 * p.car_spacing, length);
            let pitch = self.track.point_at(distance).map_or(0.0, |point| point.pitch);

            let accel = if self.current_speed < p.min_speed {
                p.slope_factor
            } else {
                p.flat_accel - pitch.sin() * p.slope_factor
            };
            let speed = (self.current_speed + accel * delta).clamp(0.0, p.max_speed);

            let weight = (p.car_count - i) as f32;
            weighted += speed * weight;
            total_weight += weight;
        }
        let mut speed = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            self.current_speed
        };

        if remaining <= p.finish_slowdown_distance {
            let start = self.ease_start(p.max_speed);
            let t = remaining_fraction(remaining, p.finish_slowdown_distance);
            speed = ease_out(start, t, p.run_ease_exponent);
        } else {
            self.pre_stop_speed = self.current_speed;
        }

        self.current_speed = speed;
        self.offset += speed * delta;
    }

    fn update_emergency_stop(&mut self, delta: f32) {
        let p = self.params;
        let remaining = self.stop_distance - self.offset;

        if remaining <= p.arrival_epsilon {
            self.offset = self.stop_distance;
            self.current_speed = 0.0;
            self.pre_stop_speed = 0.0;
            self.sleep_timer = p.sick_pause;
            self.transition(TrainMode::SickMode);
            return;
        }

        let start = self.ease_start(p.max_speed);
        let t = remaining_fraction(remaining, self.stop_window);
        self.current_speed = ease_out(start, t, p.run_ease_exponent);
        self.offset += self.current_speed * delta;
    }

    fn update_sick(&mut self, delta: f32) {
        let p = self.params;
        let finish = self.finish_distance();
        let remaining = finish - self.offset;

        if remaining <= p.arrival_epsilon {
            self.offset = finish;
            self.current_speed = 0.0;
            self.transition(TrainMode::Finished);
            return;
        }

        let mut speed = (self.current_speed + p.flat_accel * delta).clamp(0.0, p.sick_max_speed);
        if remaining <= p.sick_finish_slowdown_distance {
            let start = self.ease_start(p.sick_max_speed);
            let t = remaining_fraction(remaining, p.sick_finish_slowdown_distance);
            speed = ease_out(start, t, p.sick_ease_exponent);
        } else {
            self.pre_stop_speed = speed;
        }

        self.current_speed = speed;
        self.offset += speed * delta;
    }

    /// Speed a slowdown eases from. Never below the minimum speed, so a
    /// slowdown entered at rest still arrives.
    fn ease_start(&self, cap: f32) -> f32 {
        self.pre_stop_speed.max(self.params.min_speed).min(cap)
    }

    /// Arc-length position of car `car`.
    ///
    /// Trailing cars wrap around the loop, except on the final approach
    /// where they clamp so none jumps past the finish ahead of the lead.
    pub fn car_distance(&self, car: usize) -> f32 {
        let target = self.offset - car as f32 * self.params.car_spacing;
        let approach = self.finish_distance() - self.params.finish_slowdown_distance;
        if self.offset < approach {
            wrap_distance(target, self.track.length())
        } else {
            target.clamp(0.0, self.track.length())
        }
    }

    /// Frame of car `car`; identity on an empty track.
    pub fn car_transform(&self, car: usize) -> OrientedPoint {
        self.track.oriented_at_clamped(self.car_distance(car))
    }

    /// Follow-camera anchor above and ahead of the lead car.
    pub fn camera_transform(&self) -> OrientedPoint {
        self.car_transform(0).offset(
            self.params.camera_forward_offset,
            self.params.camera_height_offset,
            0.0,
        )
    }

    pub fn passenger_transform(&self, seat: usize) -> Option<OrientedPoint> {
        let passenger = self.seats.get(seat)?;
        let car = self.car_transform(self.seats.car_of(seat));
        Some(seat_transform(&car, passenger.front_seat, &self.car))
    }

    pub fn draw_list(&self) -> DrawList {
        if self.track.is_empty() {
            return DrawList::default();
        }

        let cars = (0..self.params.car_count)
            .map(|i| self.car_transform(i).car_matrix())
            .collect();

        let passengers = self
            .seats
            .passengers()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.boarded)
            .filter_map(|(seat, p)| self.passenger_draw(seat, p))
            .collect();

        DrawList { cars, passengers }
    }

    fn passenger_draw(&self, seat: usize, passenger: &Passenger) -> Option<PassengerDraw> {
        let frame = self.passenger_transform(seat)?;
        let belt = passenger
            .belted
            .then(|| belt_transform(&frame, &self.car).model_matrix(self.car.belt_scale));
        Some(PassengerDraw {
            seat,
            model: passenger.model,
            sick: passenger.sick,
            transform: frame.model_matrix(self.car.passenger_scale),
            belt,
        })
    }
}
