//! C ABI for the renderer/driver.
//!
//! A ride handle owns the sampled track, both meshes and the train.
//!
//! Functions:
//! - `rc_ride_load` / `rc_ride_free` - build a ride from a track file and an optional config
//! - `rc_mesh_counts` / `rc_mesh_copy` - copy the track or car mesh into caller buffers
//! - `rc_train_*` - drive the train and read its transforms
//!
//! # Error Codes
//! - `0`: Success
//! - `-1`: Null pointer or unusable argument
//! - `-2`: Invalid index (seat, car or mesh kind)
//! - `-3`: Buffer overflow (resize and retry)
//!
//! Calls that can be refused by the train (`rc_train_start`,
//! `rc_train_make_sick`, `rc_train_trigger_emergency_stop`) return `1` when
//! accepted and `0` when refused.

use crate::config::RideConfig;
use crate::sim::{DrawRange, Matrix4, OrientedPoint, Vertex};
use crate::track::{Track, TrackMesh};
use crate::train::{CarMesh, Train, TrainMode};
use log::warn;
use std::ffi::{c_char, CStr};
use std::sync::Arc;

/// Mesh selector for `rc_mesh_counts` / `rc_mesh_copy`.
pub const RC_MESH_TRACK: i32 = 0;
pub const RC_MESH_CAR: i32 = 1;

/// Everything one loaded ride owns.
struct Ride {
    track_mesh: TrackMesh,
    car_mesh: CarMesh,
    train: Train,
}

impl Ride {
    fn new(track: Track, config: &RideConfig) -> Self {
        let track_mesh = TrackMesh::build(&track, &config.track, &config.mesh);
        let car_mesh = CarMesh::build(&config.car);
        let train = Train::new(Arc::new(track), config.train, config.car);
        Self {
            track_mesh,
            car_mesh,
            train,
        }
    }

    fn mesh(&self, kind: i32) -> Option<(&[Vertex], &[u32], Vec<DrawRange>)> {
        match kind {
            RC_MESH_TRACK => Some((
                self.track_mesh.vertices(),
                self.track_mesh.indices(),
                self.track_mesh.draw_ranges().to_vec(),
            )),
            RC_MESH_CAR => Some((
                self.car_mesh.vertices(),
                self.car_mesh.indices(),
                self.car_mesh.draw_ranges().to_vec(),
            )),
            _ => None,
        }
    }
}

/// Opaque handle to a loaded ride.
pub type RcRideHandle = *mut std::ffi::c_void;

/// Load a ride.
///
/// An unreadable track file gives a ride with an empty track. A config file
/// that cannot be read or parsed fails the load.
///
/// # Returns
/// - Valid handle on success (non-null)
/// - Null on error
///
/// # Safety
/// - `track_path` must be a valid NUL-terminated string
/// - `config_path` must be a valid NUL-terminated string, or null for defaults
#[no_mangle]
pub unsafe extern "C" fn rc_ride_load(
    track_path: *const c_char,
    config_path: *const c_char,
) -> RcRideHandle {
    let Some(track_path) = to_str(track_path) else {
        return std::ptr::null_mut();
    };

    let config = if config_path.is_null() {
        RideConfig::default()
    } else {
        let Some(config_path) = to_str(config_path) else {
            return std::ptr::null_mut();
        };
        match RideConfig::from_file(config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!("failed to load ride config: {err}");
                return std::ptr::null_mut();
            }
        }
    };

    let track = Track::load(track_path, &config.track);
    Box::into_raw(Box::new(Ride::new(track, &config))) as RcRideHandle
}

/// Free a ride handle.
///
/// # Safety
/// - `handle` must be a valid handle returned by `rc_ride_load`, or null
#[no_mangle]
pub unsafe extern "C" fn rc_ride_free(handle: RcRideHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle as *mut Ride));
    }
}

/// Mesh sizes returned by `rc_mesh_counts`.
#[repr(C)]
#[derive(Debug, Default)]
pub struct RcMeshCounts {
    pub vertex_count: usize,
    pub index_count: usize,
    pub range_count: usize,
}

/// Caller-owned buffers filled by `rc_mesh_copy`.
#[repr(C)]
pub struct RcMeshOutput {
    pub vertices: *mut Vertex,
    pub vertices_capacity: usize,
    pub indices: *mut u32,
    pub indices_capacity: usize,
    pub ranges: *mut DrawRange,
    pub ranges_capacity: usize,
}

/// Get mesh sizes to allocate buffers.
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
/// - `counts` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn rc_mesh_counts(
    handle: RcRideHandle,
    mesh: i32,
    counts: *mut RcMeshCounts,
) -> i32 {
    let (Some(ride), false) = (ride_ref(handle), counts.is_null()) else {
        return -1;
    };
    let Some((vertices, indices, ranges)) = ride.mesh(mesh) else {
        return -2;
    };

    let out = &mut *counts;
    out.vertex_count = vertices.len();
    out.index_count = indices.len();
    out.range_count = ranges.len();
    0
}

/// Copy a mesh into pre-allocated buffers.
///
/// The track mesh has two ranges (surface, supports) drawn with the
/// identity model matrix; the car mesh has four (body, stripe, seats,
/// wheels) drawn once per car matrix.
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
/// - `output` must be a valid pointer whose buffers hold at least their
///   `*_capacity` elements
#[no_mangle]
pub unsafe extern "C" fn rc_mesh_copy(
    handle: RcRideHandle,
    mesh: i32,
    output: *mut RcMeshOutput,
) -> i32 {
    let (Some(ride), false) = (ride_ref(handle), output.is_null()) else {
        return -1;
    };
    let Some((vertices, indices, ranges)) = ride.mesh(mesh) else {
        return -2;
    };
    let out = &mut *output;

    if vertices.len() > out.vertices_capacity
        || indices.len() > out.indices_capacity
        || ranges.len() > out.ranges_capacity
    {
        return -3;
    }
    if (!vertices.is_empty() && out.vertices.is_null())
        || (!indices.is_empty() && out.indices.is_null())
        || (!ranges.is_empty() && out.ranges.is_null())
    {
        return -1;
    }

    copy_to(vertices, out.vertices);
    copy_to(indices, out.indices);
    copy_to(&ranges, out.ranges);
    0
}

/// Advance the train by one frame.
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_update(handle: RcRideHandle, delta: f32) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    ride.train.update(delta);
    0
}

/// Leave the station. Refused unless every boarded passenger is belted.
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_start(handle: RcRideHandle) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    ride.train.start() as i32
}

/// Board the next free seat.
///
/// # Returns
/// - Seat index on success
/// - `-2` when the train is full
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_add_passenger(handle: RcRideHandle) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    match ride.train.add_passenger() {
        Some(seat) => seat as i32,
        None => -2,
    }
}

/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_buckle_up(handle: RcRideHandle, seat: i32) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    match usize::try_from(seat) {
        Ok(seat) if ride.train.buckle_up(seat) => 0,
        _ => -2,
    }
}

/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_toggle_belt(handle: RcRideHandle, seat: i32) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    match usize::try_from(seat) {
        Ok(seat) if ride.train.toggle_belt(seat) => 0,
        _ => -2,
    }
}

/// Mark a passenger sick and brake. Refused unless running with that seat
/// boarded.
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_make_sick(handle: RcRideHandle, seat: i32) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    match usize::try_from(seat) {
        Ok(seat) => ride.train.make_sick(seat) as i32,
        Err(_) => -2,
    }
}

/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_reset(handle: RcRideHandle) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    ride.train.reset();
    0
}

/// Brake to a halt `distance` ahead of the lead car. Refused unless running.
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_trigger_emergency_stop(
    handle: RcRideHandle,
    distance: f32,
) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    if !distance.is_finite() {
        return -1;
    }
    ride.train.trigger_emergency_stop(distance) as i32
}

/// Set the mode directly, for transitions the host drives.
///
/// # Returns
/// - `0` on success
/// - `-2` if `mode` is not a `TrainMode` value
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_set_mode(handle: RcRideHandle, mode: i32) -> i32 {
    let Some(ride) = ride_mut(handle) else {
        return -1;
    };
    match TrainMode::try_from(mode) {
        Ok(mode) => {
            ride.train.set_mode(mode);
            0
        }
        Err(_) => -2,
    }
}

/// Current `TrainMode` as its integer value, or `-1` for a null handle.
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
#[no_mangle]
pub unsafe extern "C" fn rc_train_mode(handle: RcRideHandle) -> i32 {
    match ride_ref(handle) {
        Some(ride) => ride.train.mode() as i32,
        None => -1,
    }
}

/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
/// - `out` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn rc_train_car_transform(
    handle: RcRideHandle,
    car: i32,
    out: *mut OrientedPoint,
) -> i32 {
    let (Some(ride), false) = (ride_ref(handle), out.is_null()) else {
        return -1;
    };
    match usize::try_from(car) {
        Ok(car) if car < ride.train.params().car_count => {
            *out = ride.train.car_transform(car);
            0
        }
        _ => -2,
    }
}

/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
/// - `out` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn rc_train_camera_transform(
    handle: RcRideHandle,
    out: *mut OrientedPoint,
) -> i32 {
    let (Some(ride), false) = (ride_ref(handle), out.is_null()) else {
        return -1;
    };
    *out = ride.train.camera_transform();
    0
}

/// One visible passenger, for `rc_train_draw_list`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RcPassengerDraw {
    pub seat: u32,
    pub model: u32,
    pub sick: u8,
    pub belted: u8,
    pub transform: Matrix4,
    /// Valid only when `belted` is non-zero.
    pub belt: Matrix4,
}

/// Copy this frame's car matrices and visible passengers.
///
/// # Returns
/// - `0` on success
/// - `-1` on null pointer
/// - `-3` if a buffer is too small (counts contain the required sizes)
///
/// # Safety
/// - `handle` must be a valid handle from `rc_ride_load`
/// - `cars` must hold `cars_capacity` matrices, `passengers` must hold
///   `passengers_capacity` entries
/// - `car_count` and `passenger_count` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn rc_train_draw_list(
    handle: RcRideHandle,
    cars: *mut Matrix4,
    cars_capacity: usize,
    car_count: *mut usize,
    passengers: *mut RcPassengerDraw,
    passengers_capacity: usize,
    passenger_count: *mut usize,
) -> i32 {
    let Some(ride) = ride_ref(handle) else {
        return -1;
    };
    if car_count.is_null() || passenger_count.is_null() {
        return -1;
    }

    let list = ride.train.draw_list();
    *car_count = list.cars.len();
    *passenger_count = list.passengers.len();
    if list.cars.len() > cars_capacity || list.passengers.len() > passengers_capacity {
        return -3;
    }
    if (!list.cars.is_empty() && cars.is_null())
        || (!list.passengers.is_empty() && passengers.is_null())
    {
        return -1;
    }

    copy_to(&list.cars, cars);
    for (i, p) in list.passengers.iter().enumerate() {
        *passengers.add(i) = RcPassengerDraw {
            seat: p.seat as u32,
            model: p.model as u32,
            sick: p.sick as u8,
            belted: p.belt.is_some() as u8,
            transform: p.transform,
            belt: p.belt.unwrap_or(p.transform),
        };
    }
    0
}

unsafe fn ride_ref<'a>(handle: RcRideHandle) -> Option<&'a Ride> {
    (handle as *const Ride).as_ref()
}

unsafe fn ride_mut<'a>(handle: RcRideHandle) -> Option<&'a mut Ride> {
    (handle as *mut Ride).as_mut()
}

unsafe fn to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

unsafe fn copy_to<T: Copy>(src: &[T], dst: *mut T) {
    if !src.is_empty() {
        std::ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Color, Float3};
    use std::ffi::CString;
    use std::io::Write;

    fn track_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        for i in 0..64 {
            let t = i as f32 / 64.0 * std::f32::consts::TAU;
            writeln!(file, "{} {}", 0.5 - 0.5 * t.cos(), 0.1 + 0.05 * t.sin()).expect("write");
        }
        file
    }

    fn load(file: &tempfile::NamedTempFile) -> RcRideHandle {
        let path = CString::new(file.path().to_str().expect("utf-8 path")).expect("c string");
        let handle = unsafe { rc_ride_load(path.as_ptr(), std::ptr::null()) };
        assert!(!handle.is_null());
        handle
    }

    fn empty_output() -> RcMeshOutput {
        RcMeshOutput {
            vertices: std::ptr::null_mut(),
            vertices_capacity: 0,
            indices: std::ptr::null_mut(),
            indices_capacity: 0,
            ranges: std::ptr::null_mut(),
            ranges_capacity: 0,
        }
    }

    #[test]
    fn null_arguments_are_rejected() {
        unsafe {
            assert!(rc_ride_load(std::ptr::null(), std::ptr::null()).is_null());
            assert_eq!(rc_train_update(std::ptr::null_mut(), 0.016), -1);
            assert_eq!(rc_train_mode(std::ptr::null_mut()), -1);
            rc_ride_free(std::ptr::null_mut());
        }
    }

    #[test]
    fn bad_config_fails_load() {
        let file = track_file();
        let track = CString::new(file.path().to_str().expect("utf-8 path")).expect("c string");
        let config = CString::new("/no/such/config.json").expect("c string");

        let handle = unsafe { rc_ride_load(track.as_ptr(), config.as_ptr()) };
        assert!(handle.is_null());
    }

    #[test]
    fn track_mesh_copies_after_sizing() {
        let file = track_file();
        let handle = load(&file);

        unsafe {
            let mut counts = RcMeshCounts::default();
            assert_eq!(rc_mesh_counts(handle, RC_MESH_TRACK, &mut counts), 0);
            assert_eq!(counts.range_count, 2);
            assert!(counts.vertex_count > 0);

            let mut output = empty_output();
            assert_eq!(rc_mesh_copy(handle, RC_MESH_TRACK, &mut output), -3);

            let mut vertices = vec![Vertex::new(Float3::ZERO, Float3::ZERO); counts.vertex_count];
            let mut indices = vec![0u32; counts.index_count];
            let mut ranges = vec![
                DrawRange {
                    start: 0,
                    count: 0,
                    color: Color::BLACK,
                };
                counts.range_count
            ];
            let mut output = RcMeshOutput {
                vertices: vertices.as_mut_ptr(),
                vertices_capacity: vertices.len(),
                indices: indices.as_mut_ptr(),
                indices_capacity: indices.len(),
                ranges: ranges.as_mut_ptr(),
                ranges_capacity: ranges.len(),
            };
            assert_eq!(rc_mesh_copy(handle, RC_MESH_TRACK, &mut output), 0);
            assert_eq!(ranges[1].start, ranges[0].count);
            assert_eq!((ranges[0].count + ranges[1].count) as usize, indices.len());

            assert_eq!(rc_mesh_counts(handle, 7, &mut counts), -2);
            rc_ride_free(handle);
        }
    }

    #[test]
    fn missing_track_copies_empty_mesh() {
        let path = CString::new("/definitely/missing.track").expect("c string");
        let handle = unsafe { rc_ride_load(path.as_ptr(), std::ptr::null()) };
        assert!(!handle.is_null());

        unsafe {
            let mut counts = RcMeshCounts::default();
            assert_eq!(rc_mesh_counts(handle, RC_MESH_TRACK, &mut counts), 0);
            assert_eq!(counts.vertex_count, 0);
            assert_eq!(counts.index_count, 0);

            let mut ranges = vec![
                DrawRange {
                    start: 1,
                    count: 1,
                    color: Color::BLACK,
                };
                counts.range_count
            ];
            let mut output = RcMeshOutput {
                ranges: ranges.as_mut_ptr(),
                ranges_capacity: ranges.len(),
                ..empty_output()
            };
            assert_eq!(rc_mesh_copy(handle, RC_MESH_TRACK, &mut output), 0);
            assert!(ranges.iter().all(|r| r.start == 0 && r.count == 0));

            let mut output = empty_output();
            assert_eq!(rc_mesh_copy(handle, RC_MESH_TRACK, &mut output), -3);
            rc_ride_free(handle);
        }
    }

    #[test]
    fn host_driven_stop_and_mode() {
        let file = track_file();
        let handle = load(&file);

        unsafe {
            assert_eq!(rc_train_trigger_emergency_stop(handle, 10.0), 0);
            rc_train_add_passenger(handle);
            rc_train_buckle_up(handle, 0);
            assert_eq!(rc_train_start(handle), 1);
            assert_eq!(rc_train_trigger_emergency_stop(handle, f32::NAN), -1);
            assert_eq!(rc_train_trigger_emergency_stop(handle, 10.0), 1);
            assert_eq!(rc_train_mode(handle), TrainMode::EmergencyStop as i32);

            assert_eq!(rc_train_set_mode(handle, 9), -2);
            assert_eq!(rc_train_set_mode(handle, TrainMode::Finished as i32), 0);
            assert_eq!(rc_train_mode(handle), TrainMode::Finished as i32);
            assert_eq!(rc_train_set_mode(std::ptr::null_mut(), 0), -1);
            rc_ride_free(handle);
        }
    }

    #[test]
    fn car_mesh_has_four_ranges() {
        let file = track_file();
        let handle = load(&file);

        unsafe {
            let mut counts = RcMeshCounts::default();
            assert_eq!(rc_mesh_counts(handle, RC_MESH_CAR, &mut counts), 0);
            assert_eq!(counts.range_count, 4);
            rc_ride_free(handle);
        }
    }

    #[test]
    fn boarding_and_starting() {
        let file = track_file();
        let handle = load(&file);

        unsafe {
            assert_eq!(rc_train_start(handle), 0);
            assert_eq!(rc_train_add_passenger(handle), 0);
            assert_eq!(rc_train_buckle_up(handle, 3), -2);
            assert_eq!(rc_train_buckle_up(handle, -1), -2);
            assert_eq!(rc_train_buckle_up(handle, 0), 0);
            assert_eq!(rc_train_start(handle), 1);
            assert_eq!(rc_train_mode(handle), TrainMode::Running as i32);

            for _ in 0..200 {
                assert_eq!(rc_train_update(handle, 0.016), 0);
            }
            assert_eq!(rc_train_make_sick(handle, 0), 1);
            assert_eq!(rc_train_mode(handle), TrainMode::EmergencyStop as i32);

            assert_eq!(rc_train_reset(handle), 0);
            assert_eq!(rc_train_mode(handle), TrainMode::Waiting as i32);
            rc_ride_free(handle);
        }
    }

    #[test]
    fn transforms_check_car_index() {
        let file = track_file();
        let handle = load(&file);

        unsafe {
            let mut frame = OrientedPoint::IDENTITY;
            assert_eq!(rc_train_car_transform(handle, 4, &mut frame), -2);
            assert_eq!(rc_train_car_transform(handle, 0, &mut frame), 0);

            let mut camera = OrientedPoint::IDENTITY;
            assert_eq!(rc_train_camera_transform(handle, &mut camera), 0);
            assert!(camera.position.y > frame.position.y);
            rc_ride_free(handle);
        }
    }

    #[test]
    fn draw_list_reports_required_sizes() {
        let file = track_file();
        let handle = load(&file);

        unsafe {
            rc_train_add_passenger(handle);
            rc_train_buckle_up(handle, 0);

            let mut car_count = 0;
            let mut passenger_count = 0;
            let status = rc_train_draw_list(
                handle,
                std::ptr::null_mut(),
                0,
                &mut car_count,
                std::ptr::null_mut(),
                0,
                &mut passenger_count,
            );
            assert_eq!(status, -3);
            assert_eq!(car_count, 4);
            assert_eq!(passenger_count, 1);

            let mut cars = vec![[0.0f32; 16]; car_count];
            let mut passengers = vec![
                RcPassengerDraw {
                    seat: 0,
                    model: 0,
                    sick: 0,
                    belted: 0,
                    transform: [0.0; 16],
                    belt: [0.0; 16],
                };
                passenger_count
            ];
            let status = rc_train_draw_list(
                handle,
                cars.as_mut_ptr(),
                cars.len(),
                &mut car_count,
                passengers.as_mut_ptr(),
                passengers.len(),
                &mut passenger_count,
            );
            assert_eq!(status, 0);
            assert_eq!(passengers[0].belted, 1);
            assert_eq!(cars[0][15], 1.0);
            rc_ride_free(handle);
        }
    }
}
