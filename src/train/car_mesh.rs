//! Procedural mesh of one train car, in car space: +X forward, +Y up,
//! +Z right, wheels resting on y = 0.

use crate::sim::{CarParams, DrawRange, Float3, MeshBuffers, Vertex, Winding};
use log::info;

/// One car mesh shared by every car; each car draws it with its own
/// transform.
#[derive(Debug, Clone)]
pub struct CarMesh {
    buffers: MeshBuffers,
    body: DrawRange,
    stripe: DrawRange,
    seats: DrawRange,
    wheels: DrawRange,
}

/// Measurements derived from [`CarParams`] that every part needs.
struct Layout {
    body_bottom: f32,
    body_height: f32,
    half_length: f32,
    half_width: f32,
    inner_half_length: f32,
    inner_half_width: f32,
}

impl Layout {
    fn new(p: &CarParams) -> Self {
        let half_length = p.length / 2.0;
        let half_width = p.width / 2.0;
        Self {
            body_bottom: p.wheel_radius,
            body_height: p.height - p.wheel_radius,
            half_length,
            half_width,
            inner_half_length: half_length - p.wall_thickness,
            inner_half_width: half_width - p.wall_thickness,
        }
    }

    fn body_top(&self) -> f32 {
        self.body_bottom + self.body_height
    }
}

impl CarMesh {
    pub fn build(params: &CarParams) -> Self {
        let layout = Layout::new(params);
        let mut buffers = MeshBuffers::new();

        let start = buffers.index_count();
        add_body(&mut buffers, &layout, params);
        let body = buffers.range_since(start, params.body_color);

        let start = buffers.index_count();
        add_stripe(&mut buffers, &layout, params);
        let stripe = buffers.range_since(start, params.stripe_color);

        let start = buffers.index_count();
        add_seats(&mut buffers, &layout, params);
        let seats = buffers.range_since(start, params.seat_color);

        let start = buffers.index_count();
        add_wheels(&mut buffers, &layout, params);
        let wheels = buffers.range_since(start, params.wheel_color);

        info!(
            "built car mesh: {} vertices, {} indices",
            buffers.vertices().len(),
            buffers.index_count()
        );

        Self {
            buffers,
            body,
            stripe,
            seats,
            wheels,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.buffers.vertices()
    }

    pub fn indices(&self) -> &[u32] {
        self.buffers.indices()
    }

    /// Body, stripe, seats and wheels, in buffer order.
    pub fn draw_ranges(&self) -> [DrawRange; 4] {
        [self.body, self.stripe, self.seats, self.wheels]
    }
}

fn corners(half_length: f32, half_width: f32, bottom: f32, top: f32) -> [Float3; 8] {
    let (l, w) = (half_length, half_width);
    [
        Float3::new(-l, bottom, -w),
        Float3::new(l, bottom, -w),
        Float3::new(l, bottom, w),
        Float3::new(-l, bottom, w),
        Float3::new(-l, top, -w),
        Float3::new(l, top, -w),
        Float3::new(l, top, w),
        Float3::new(-l, top, w),
    ]
}

/// Open-top shell: outer and inner walls, both floors and the top rim.
fn add_body(buffers: &mut MeshBuffers, layout: &Layout, p: &CarParams) {
    let top = layout.body_top();
    let o = corners(layout.half_length, layout.half_width, layout.body_bottom, top);
    let i = corners(
        layout.inner_half_length,
        layout.inner_half_width,
        layout.body_bottom + p.wall_thickness,
        top,
    );

    let x = Float3::RIGHT;
    let y = Float3::UP;
    let z = Float3::FORWARD;
    let faces = [
        ([o[1], o[2], o[6], o[5]], x),
        ([o[3], o[0], o[4], o[7]], -x),
        ([o[2], o[3], o[7], o[6]], z),
        ([o[0], o[1], o[5], o[4]], -z),
        // inner walls face into the car
        ([i[5], i[6], i[2], i[1]], -x),
        ([i[7], i[4], i[0], i[3]], x),
        ([i[6], i[7], i[3], i[2]], -z),
        ([i[4], i[5], i[1], i[0]], z),
        ([o[0], o[1], o[2], o[3]], -y),
        ([i[2], i[1], i[0], i[3]], y),
        // rim
        ([o[4], o[5], i[5], i[4]], y),
        ([o[6], o[7], i[7], i[6]], y),
        ([o[7], o[4], i[4], i[7]], y),
        ([o[5], o[6], i[6], i[5]], y),
    ];
    for ([v0, v1, v2, v3], normal) in faces {
        buffers.add_quad(v0, v1, v2, v3, normal, Winding::Fan);
    }
}

/// Band around the body at half height, just outside the walls.
fn add_stripe(buffers: &mut MeshBuffers, layout: &Layout, p: &CarParams) {
    let mid = layout.body_bottom + layout.body_height / 2.0;
    let half_band = layout.body_height * p.stripe_height_ratio / 2.0;
    let (bot, top) = (mid - half_band, mid + half_band);
    let l = layout.half_length + p.stripe_offset;
    let w = layout.half_width + p.stripe_offset;

    let faces = [
        (
            [
                Float3::new(l, bot, -w),
                Float3::new(l, bot, w),
                Float3::new(l, top, w),
                Float3::new(l, top, -w),
            ],
            Float3::RIGHT,
        ),
        (
            [
                Float3::new(-l, bot, w),
                Float3::new(-l, bot, -w),
                Float3::new(-l, top, -w),
                Float3::new(-l, top, w),
            ],
            -Float3::RIGHT,
        ),
        (
            [
                Float3::new(l, bot, w),
                Float3::new(-l, bot, w),
                Float3::new(-l, top, w),
                Float3::new(l, top, w),
            ],
            Float3::FORWARD,
        ),
        (
            [
                Float3::new(-l, bot, -w),
                Float3::new(l, bot, -w),
                Float3::new(l, top, -w),
                Float3::new(-l, top, -w),
            ],
            -Float3::FORWARD,
        ),
    ];
    for ([v0, v1, v2, v3], normal) in faces {
        buffers.add_quad(v0, v1, v2, v3, normal, Winding::Fan);
    }
}

/// A cushion and a backrest for the front and the back seat.
fn add_seats(buffers: &mut MeshBuffers, layout: &Layout, p: &CarParams) {
    let seat_y = layout.body_bottom + p.wall_thickness;
    let w = layout.inner_half_width;

    for ratio in [p.front_seat_ratio, p.back_seat_ratio] {
        let x = layout.inner_half_length * ratio;
        let back_x = x - p.seat_depth / 2.0;
        buffers.add_box(
            Float3::new(back_x, seat_y, -w),
            Float3::new(x + p.seat_depth / 2.0, seat_y + p.seat_height, w),
        );
        buffers.add_box(
            Float3::new(back_x, seat_y + p.seat_height, -w),
            Float3::new(
                back_x + p.seat_back_thickness,
                seat_y + p.seat_height + p.seat_back_height,
                w,
            ),
        );
    }
}

fn add_wheels(buffers: &mut MeshBuffers, layout: &Layout, p: &CarParams) {
    let x = p.length * p.wheel_length_offset_ratio;
    let z = p.width * p.wheel_width_offset_ratio / 2.0;

    for x_pos in [x, -x] {
        for z_pos in [-z, z] {
            buffers.add_half_cylinder(
                Float3::new(x_pos, layout.body_bottom, z_pos),
                Float3::FORWARD,
                p.wheel_radius,
                p.wheel_width,
                p.wheel_sides,
            );
        }
    }
}
