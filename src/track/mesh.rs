//! Triangulated track ribbon and its support structure.
//!
//! Both parts share one vertex/index buffer. Surface triangles fill a
//! prefix of the index buffer and supports the rest, so the renderer draws
//! two ranges with different colors.

use super::lookup::Track;
use super::sampler::TrackPoint;
use crate::sim::{
    DrawRange, Float3, Matrix4, MeshBuffers, MeshParams, TrackParams, Vertex, Winding,
    IDENTITY_MATRIX,
};
use log::info;

/// Write-once mesh of the track and its supports.
#[derive(Debug, Clone)]
pub struct TrackMesh {
    buffers: MeshBuffers,
    surface_index_count: usize,
    params: MeshParams,
}

impl TrackMesh {
    pub fn build(track: &Track, track_params: &TrackParams, params: &MeshParams) -> Self {
        let mut buffers = MeshBuffers::new();
        let points = track.points();
        if points.len() < 2 {
            return Self {
                buffers,
                surface_index_count: 0,
                params: *params,
            };
        }

        build_segments(points, track_params, &mut buffers);
        let surface_index_count = buffers.index_count();

        let mut supports = SupportBuilder::new(track_params, params);
        supports.build(points, &mut buffers);

        info!(
            "built track mesh: {} vertices, {} surface indices, {} support indices",
            buffers.vertices().len(),
            surface_index_count,
            buffers.index_count() - surface_index_count
        );

        Self {
            buffers,
            surface_index_count,
            params: *params,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.buffers.vertices()
    }

    pub fn indices(&self) -> &[u32] {
        self.buffers.indices()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.indices().is_empty()
    }

    /// Number of leading indices that belong to the track surface.
    pub fn surface_index_count(&self) -> usize {
        self.surface_index_count
    }

    pub fn surface_range(&self) -> DrawRange {
        DrawRange {
            start: 0,
            count: self.surface_index_count as u32,
            color: self.params.track_color,
        }
    }

    pub fn support_range(&self) -> DrawRange {
        self.buffers
            .range_since(self.surface_index_count, self.params.support_color)
    }

    pub fn draw_ranges(&self) -> [DrawRange; 2] {
        [self.surface_range(), self.support_range()]
    }

    /// The mesh is built in world space.
    pub fn model_matrix(&self) -> Matrix4 {
        IDENTITY_MATRIX
    }
}

/// Emits top, bottom and both side faces for every segment of the loop.
fn build_segments(points: &[TrackPoint], params: &TrackParams, buffers: &mut MeshBuffers) {
    let n = points.len();
    let half_width = params.half_width;
    let thickness = params.thickness;
    let mut prev_normal = Float3::UP;

    for i in 0..n {
        let next = (i + 1) % n;
        let (c0, c1) = (points[i].center, points[next].center);
        let (p0, p1) = (points[i].perp, points[next].perp);

        let forward0 = (c1 - c0).normalize();
        let forward1 = if i + 2 < n {
            (points[i + 2].center - c1).normalize()
        } else {
            forward0
        };

        // Keep each normal on the same side as the one before it so the
        // winding never flips.
        let normal0 = consistent_normal(p0.cross(forward0).normalize(), prev_normal);
        prev_normal = normal0;
        let normal1 = consistent_normal(p1.cross(forward1).normalize(), normal0);

        let tl0 = c0 + p0 * half_width;
        let tr0 = c0 - p0 * half_width;
        let tl1 = c1 + p1 * half_width;
        let tr1 = c1 - p1 * half_width;

        let bl0 = tl0 - normal0 * thickness;
        let br0 = tr0 - normal0 * thickness;
        let bl1 = tl1 - normal1 * thickness;
        let br1 = tr1 - normal1 * thickness;

        let side = {
            let s = (p0 + p1).normalize();
            if s == Float3::ZERO {
                p0
            } else {
                s
            }
        };

        buffers.add_quad(tl0, tr0, tl1, tr1, normal0, Winding::Strip);
        buffers.add_quad(bl0, br0, bl1, br1, -normal0, Winding::StripFlipped);
        buffers.add_quad(tl0, bl0, tl1, bl1, side, Winding::Strip);
        buffers.add_quad(tr0, br0, tr1, br1, -side, Winding::StripFlipped);
    }
}

fn consistent_normal(normal: Float3, reference: Float3) -> Float3 {
    if normal == Float3::ZERO {
        reference
    } else if normal.dot(reference) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Left and right end of one horizontal brace.
type Brace = (Float3, Float3);

/// Walks the loop dropping a column pair every `support_spacing` of
/// horizontal track length, cross-braced to the previous pair.
struct SupportBuilder<'a> {
    track: &'a TrackParams,
    params: &'a MeshParams,
    previous_braces: Vec<Brace>,
}

impl<'a> SupportBuilder<'a> {
    fn new(track: &'a TrackParams, params: &'a MeshParams) -> Self {
        Self {
            track,
            params,
            previous_braces: Vec::new(),
        }
    }

    fn build(&mut self, points: &[TrackPoint], buffers: &mut MeshBuffers) {
        let n = points.len();
        let spacing = self.params.support_spacing;
        let mut length = spacing;
        let mut min_y = f32::INFINITY;

        // One step past the end so the closing segment gets supports too.
        for i in 0..=n {
            let ix = i % n;
            let start = points[ix].center;
            let end = points[(ix + 1) % n].center;
            length += start.horizontal_distance(end);
            min_y = min_y.min(start.y);

            if length > spacing {
                let top = start.with_y(start.y - self.track.thickness * self.params.column_drop_ratio);
                self.add_column(top, points[ix].perp.normalize(), min_y, buffers);
                length = 0.0;
                min_y = f32::INFINITY;
            }
        }
    }

    /// Two columns plus braces. `min_y` is the lowest track height since the
    /// previous column; diagonals to that column stay below it.
    fn add_column(&mut self, top_center: Float3, perp: Float3, min_y: f32, buffers: &mut MeshBuffers) {
        let p = self.params;
        let radius = p.support_radius;
        let brace_radius = radius * p.brace_radius_ratio;
        let vertical = p.support_vertical_spacing;
        let inset = self.track.half_width - radius * p.column_inset_ratio;

        let right_top = top_center - perp * inset;
        let left_top = top_center + perp * inset;
        self.cylinder(buffers, right_top.with_y(0.0), right_top, radius);
        self.cylinder(buffers, left_top.with_y(0.0), left_top, radius);

        let mut braces = Vec::new();
        let mut height = (left_top.y - vertical * p.first_brace_ratio).max(left_top.y / 2.0);

        while height >= vertical * p.lowest_brace_ratio {
            let right = right_top.with_y(height);
            let left = left_top.with_y(height);
            self.cylinder(buffers, left, right, brace_radius);
            braces.push((left, right));

            for &(prev_left, prev_right) in &self.previous_braces {
                let y = prev_left.y;
                if y < min_y && y < height + vertical && y >= height - vertical {
                    self.cylinder(buffers, prev_left, left, brace_radius);
                    self.cylinder(buffers, prev_right, right, brace_radius);
                }
            }

            height -= vertical;
        }

        self.previous_braces = braces;
    }

    fn cylinder(&self, buffers: &mut MeshBuffers, bottom: Float3, top: Float3, radius: f32) {
        buffers.add_cylinder(
            bottom,
            top,
            radius,
            self.params.support_sides,
            self.params.min_cylinder_length,
        );
    }
}
