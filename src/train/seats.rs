//! Passenger seats: boarding, belts and placement inside a car.

use crate::sim::{CarParams, OrientedPoint, TrainParams};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One seat and whoever sits in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Passenger {
    pub boarded: bool,
    pub belted: bool,
    pub sick: bool,
    pub front_seat: bool,
    /// Which passenger model occupies the seat.
    pub model: usize,
}

/// All seats of the train in boarding order; seat `i` belongs to car
/// `i / seats_per_car`.
///
/// Model assignment is reshuffled on every reset with a seeded RNG, so the
/// same seed always seats the same models.
#[derive(Debug, Clone)]
pub struct Seats {
    passengers: Vec<Passenger>,
    boarded: usize,
    seats_per_car: usize,
    model_count: usize,
    rng: ChaCha8Rng,
}

impl Seats {
    pub fn new(params: &TrainParams) -> Self {
        let seats_per_car = params.seats_per_car.max(1);
        let passengers = (0..params.seat_count())
            .map(|i| Passenger {
                front_seat: i % seats_per_car == 0,
                ..Passenger::default()
            })
            .collect();
        let mut seats = Self {
            passengers,
            boarded: 0,
            seats_per_car,
            model_count: params.passenger_models.max(1),
            rng: ChaCha8Rng::seed_from_u64(params.shuffle_seed),
        };
        seats.shuffle_models();
        seats
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn get(&self, seat: usize) -> Option<&Passenger> {
        self.passengers.get(seat)
    }

    pub fn boarded_count(&self) -> usize {
        self.boarded
    }

    pub fn car_of(&self, seat: usize) -> usize {
        seat / self.seats_per_car
    }

    /// Boards the next free seat and returns its index, `None` when full.
    pub fn add_passenger(&mut self) -> Option<usize> {
        let seat = self.boarded;
        let passenger = self.passengers.get_mut(seat)?;
        passenger.boarded = true;
        self.boarded += 1;
        Some(seat)
    }

    /// Belts a boarded seat. Returns false for seats nobody sits in.
    pub fn buckle_up(&mut self, seat: usize) -> bool {
        match self.boarded_mut(seat) {
            Some(p) => {
                p.belted = true;
                true
            }
            None => false,
        }
    }

    pub fn toggle_belt(&mut self, seat: usize) -> bool {
        match self.boarded_mut(seat) {
            Some(p) => {
                p.belted = !p.belted;
                true
            }
            None => false,
        }
    }

    pub fn mark_sick(&mut self, seat: usize) -> bool {
        match self.boarded_mut(seat) {
            Some(p) => {
                p.sick = true;
                true
            }
            None => false,
        }
    }

    /// True when at least one passenger boarded and every one of them is
    /// belted.
    pub fn ready_to_start(&self) -> bool {
        self.boarded > 0 && self.passengers[..self.boarded].iter().all(|p| p.belted)
    }

    /// Everyone gets off and the models are reshuffled.
    pub fn clear(&mut self) {
        for p in &mut self.passengers {
            p.boarded = false;
            p.belted = false;
            p.sick = false;
        }
        self.boarded = 0;
        self.shuffle_models();
    }

    fn boarded_mut(&mut self, seat: usize) -> Option<&mut Passenger> {
        if seat < self.boarded {
            self.passengers.get_mut(seat)
        } else {
            None
        }
    }

    fn shuffle_models(&mut self) {
        let mut models: Vec<usize> = (0..self.passengers.len())
            .map(|i| i % self.model_count)
            .collect();
        models.shuffle(&mut self.rng);
        for (p, model) in self.passengers.iter_mut().zip(models) {
            p.model = model;
        }
    }
}

/// Where a passenger sits in a car, facing the way the model was authored.
pub fn seat_transform(car: &OrientedPoint, front_seat: bool, params: &CarParams) -> OrientedPoint {
    car.offset(
        params.seat_forward_offset(front_seat),
        params.seat_height_offset(),
        0.0,
    )
    .turned_around()
}

/// Belt placement relative to a seated passenger.
pub fn belt_transform(passenger: &OrientedPoint, params: &CarParams) -> OrientedPoint {
    let [up, right, forward] = params.belt_offset;
    passenger.offset(forward, up, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Float3;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    fn seats() -> Seats {
        Seats::new(&TrainParams::default())
    }

    #[test]
    fn seats_alternate_front_and_back() {
        let seats = seats();

        assert_eq!(seats.len(), 8);
        for (i, p) in seats.passengers().iter().enumerate() {
            assert_eq!(p.front_seat, i % 2 == 0);
            assert!(!p.boarded);
        }
        assert_eq!(seats.car_of(5), 2);
    }

    #[test]
    fn boarding_fills_in_order_until_full() {
        let mut seats = seats();

        for expected in 0..8 {
            assert_eq!(seats.add_passenger(), Some(expected));
        }
        assert_eq!(seats.add_passenger(), None);
        assert_eq!(seats.boarded_count(), 8);
    }

    #[test]
    fn belts_only_fit_boarded_seats() {
        let mut seats = seats();
        seats.add_passenger();

        assert!(!seats.buckle_up(1));
        assert!(!seats.toggle_belt(7));
        assert!(!seats.buckle_up(100));
        assert!(seats.buckle_up(0));
        assert!(seats.get(0).is_some_and(|p| p.belted));
        assert!(seats.toggle_belt(0));
        assert!(seats.get(0).is_some_and(|p| !p.belted));
    }

    #[test]
    fn ready_needs_everyone_belted() {
        let mut seats = seats();
        assert!(!seats.ready_to_start());

        seats.add_passenger();
        seats.add_passenger();
        seats.buckle_up(0);
        assert!(!seats.ready_to_start());

        seats.buckle_up(1);
        assert!(seats.ready_to_start());
    }

    #[test]
    fn clear_resets_flags() {
        let mut seats = seats();
        seats.add_passenger();
        seats.buckle_up(0);
        seats.mark_sick(0);
        seats.clear();

        assert_eq!(seats.boarded_count(), 0);
        assert!(seats
            .passengers()
            .iter()
            .all(|p| !p.boarded && !p.belted && !p.sick));
    }

    #[test]
    fn models_are_a_seeded_permutation() {
        let a = seats();
        let b = seats();
        let models_a: Vec<usize> = a.passengers().iter().map(|p| p.model).collect();
        let models_b: Vec<usize> = b.passengers().iter().map(|p| p.model).collect();

        assert_eq!(models_a, models_b);
        let mut sorted = models_a;
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn passenger_faces_backward_in_car() {
        let params = CarParams::default();
        let car = OrientedPoint::new(Float3::ZERO, Float3::RIGHT, Float3::UP);

        let front = seat_transform(&car, true, &params);
        assert_relative_eq!(front.position.x, 2.92 * 0.3 - 0.5, epsilon = TOLERANCE);
        assert_relative_eq!(front.position.y, 0.4 + 0.08 + 0.13, epsilon = TOLERANCE);
        assert_relative_eq!(front.forward.x, -1.0, epsilon = TOLERANCE);

        let back = seat_transform(&car, false, &params);
        assert_relative_eq!(back.position.x, 2.92 * -0.7 - 0.5, epsilon = TOLERANCE);
    }

    #[test]
    fn belt_sits_below_and_beside_passenger() {
        let params = CarParams::default();
        let passenger = OrientedPoint::new(Float3::ZERO, Float3::FORWARD, Float3::UP);
        let belt = belt_transform(&passenger, &params);

        // right = forward x up = (-1, 0, 0)
        assert_relative_eq!(belt.position.y, -1.15, epsilon = TOLERANCE);
        assert_relative_eq!(belt.position.x, -0.3, epsilon = TOLERANCE);
        assert_eq!(belt.forward, passenger.forward);
    }
}
