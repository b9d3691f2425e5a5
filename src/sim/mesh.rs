//! Shared vertex/index buffers for procedural meshes.
//!
//! Parts of one mesh are appended in order and recorded as index ranges, so
//! a renderer can draw each part with its own color from a single buffer.

use super::math::{Color, Float3};
use std::f32::consts::PI;

/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub position: Float3,
    pub normal: Float3,
}

impl Vertex {
    pub const fn new(position: Float3, normal: Float3) -> Self {
        Self { position, normal }
    }
}

/// A contiguous slice of the index buffer drawn with one flat color.
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawRange {
    pub start: u32,
    pub count: u32,
    pub color: Color,
}

/// Triangle order of a quad `v0 v1 v2 v3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Winding {
    /// `v0 v1` and `v2 v3` are opposite edges of a strip.
    Strip,
    /// As `Strip`, facing the other way.
    StripFlipped,
    /// Vertices run around the quad's perimeter.
    Fan,
}

#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Range from `start` to the current end of the index buffer.
    pub fn range_since(&self, start: usize, color: Color) -> DrawRange {
        DrawRange {
            start: start as u32,
            count: (self.indices.len() - start) as u32,
            color,
        }
    }

    fn base(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn add_quad(
        &mut self,
        v0: Float3,
        v1: Float3,
        v2: Float3,
        v3: Float3,
        normal: Float3,
        winding: Winding,
    ) {
        let b = self.base();
        self.vertices.extend(
            [v0, v1, v2, v3]
                .into_iter()
                .map(|p| Vertex::new(p, normal)),
        );
        let order = match winding {
            Winding::Strip => [b, b + 2, b + 1, b + 1, b + 2, b + 3],
            Winding::StripFlipped => [b, b + 1, b + 2, b + 1, b + 3, b + 2],
            Winding::Fan => [b, b + 1, b + 2, b, b + 2, b + 3],
        };
        self.indices.extend_from_slice(&order);
    }

    /// Open tube from `bottom` to `top`. Returns false if it was too short
    /// to emit.
    pub fn add_cylinder(
        &mut self,
        bottom: Float3,
        top: Float3,
        radius: f32,
        sides: u32,
        min_length: f32,
    ) -> bool {
        let axis = top - bottom;
        let length = axis.magnitude();
        if length < min_length || sides < 3 {
            return false;
        }

        let axis = axis * (1.0 / length);
        let arbitrary = if axis.y.abs() < 0.9 {
            Float3::UP
        } else {
            Float3::RIGHT
        };
        let perp1 = axis.cross(arbitrary).normalize();
        let perp2 = axis.cross(perp1);

        let base = self.base();
        for i in 0..=sides {
            let angle = i as f32 * 2.0 * PI / sides as f32;
            let offset = perp1 * (angle.cos() * radius) + perp2 * (angle.sin() * radius);
            let normal = offset.normalize();
            self.vertices.push(Vertex::new(bottom + offset, normal));
            self.vertices.push(Vertex::new(top + offset, normal));
        }
        self.push_ring_sides(base, sides);
        true
    }

    /// Half tube lying along `axis`, curved side down, with a flat top and
    /// both ends capped.
    pub fn add_half_cylinder(
        &mut self,
        center: Float3,
        axis: Float3,
        radius: f32,
        length: f32,
        sides: u32,
    ) {
        let axis = axis.normalize();
        let start = center - axis * (length / 2.0);
        let end = center + axis * (length / 2.0);
        let perp1 = Float3::RIGHT;
        let perp2 = -Float3::UP;
        let rim = |i: u32| {
            let angle = i as f32 * PI / sides as f32;
            perp1 * (angle.cos() * radius) + perp2 * (angle.sin() * radius)
        };

        let base = self.base();
        for i in 0..=sides {
            let offset = rim(i);
            let normal = offset.normalize();
            self.vertices.push(Vertex::new(start + offset, normal));
            self.vertices.push(Vertex::new(end + offset, normal));
        }
        self.push_ring_sides(base, sides);

        self.add_quad(
            start + perp1 * radius,
            start - perp1 * radius,
            end - perp1 * radius,
            end + perp1 * radius,
            Float3::UP,
            Winding::Fan,
        );

        for cap_at_end in [false, true] {
            let cap_center = if cap_at_end { end } else { start };
            let cap_normal = if cap_at_end { axis } else { -axis };
            let c = self.base();
            self.vertices.push(Vertex::new(cap_center, cap_normal));
            for i in 0..=sides {
                self.vertices
                    .push(Vertex::new(cap_center + rim(i), cap_normal));
            }
            for i in 0..sides {
                let tri = if cap_at_end {
                    [c, c + i + 2, c + i + 1]
                } else {
                    [c, c + i + 1, c + i + 2]
                };
                self.indices.extend_from_slice(&tri);
            }
        }
    }

    /// Axis-aligned box with outward faces.
    pub fn add_box(&mut self, min: Float3, max: Float3) {
        let v = [
            Float3::new(min.x, min.y, min.z),
            Float3::new(max.x, min.y, min.z),
            Float3::new(max.x, min.y, max.z),
            Float3::new(min.x, min.y, max.z),
            Float3::new(min.x, max.y, min.z),
            Float3::new(max.x, max.y, min.z),
            Float3::new(max.x, max.y, max.z),
            Float3::new(min.x, max.y, max.z),
        ];
        let faces = [
            ([1, 2, 6, 5], Float3::new(1.0, 0.0, 0.0)),
            ([3, 0, 4, 7], Float3::new(-1.0, 0.0, 0.0)),
            ([2, 3, 7, 6], Float3::new(0.0, 0.0, 1.0)),
            ([0, 1, 5, 4], Float3::new(0.0, 0.0, -1.0)),
            ([4, 5, 6, 7], Float3::new(0.0, 1.0, 0.0)),
            ([0, 3, 2, 1], Float3::new(0.0, -1.0, 0.0)),
        ];
        for (corners, normal) in faces {
            self.add_quad(
                v[corners[0]],
                v[corners[1]],
                v[corners[2]],
                v[corners[3]],
                normal,
                Winding::Fan,
            );
        }
    }

    /// Two triangles per side between interleaved bottom/top rings.
    fn push_ring_sides(&mut self, base: u32, sides: u32) {
        for i in 0..sides {
            let b0 = base + i * 2;
            let b1 = b0 + 1;
            let b2 = base + (i + 1) * 2;
            let b3 = b2 + 1;
            self.indices.extend_from_slice(&[b0, b2, b1, b1, b2, b3]);
        }
    }
}
