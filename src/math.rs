//! Small geometric helpers shared across the crate.

use glam::{UVec3, Vec3A};

/// An axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3d {
    /// The corner with the smallest coordinates
    pub min: Vec3A,
    /// The corner with the largest coordinates
    pub max: Vec3A,
}

impl Aabb3d {
    /// Creates an AABB from its two corners.
    #[inline]
    pub fn new(min: Vec3A, max: Vec3A) -> Self {
        Self { min, max }
    }

    /// Computes the AABB enclosing the given vertices.
    /// Returns `None` if `verts` is empty.
    pub fn from_verts(verts: &[Vec3A]) -> Option<Self> {
        let first = *verts.first()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for vert in &verts[1..] {
            aabb.min = aabb.min.min(*vert);
            aabb.max = aabb.max.max(*vert);
        }
        Some(aabb)
    }

    /// Closed-interval overlap test. Boxes sharing only a face still overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

pub(crate) trait TriangleIndices {
    fn normal(&self, vertices: &[Vec3A]) -> Vec3A;
}

impl TriangleIndices for UVec3 {
    fn normal(&self, vertices: &[Vec3A]) -> Vec3A {
        let a = vertices[self.x as usize];
        let b = vertices[self.y as usize];
        let c = vertices[self.z as usize];
        let ab = b - a;
        let ac = c - a;
        ab.cross(ac).normalize_or_zero()
    }
}

/// The x-offset of the four cardinal neighbour directions: west, north, east, south.
#[inline]
pub(crate) fn dir_offset_x(direction: usize) -> i32 {
    const OFFSETS: [i32; 4] = [-1, 0, 1, 0];
    OFFSETS[direction & 0x3]
}

/// The z-offset of the four cardinal neighbour directions: west, north, east, south.
#[inline]
pub(crate) fn dir_offset_z(direction: usize) -> i32 {
    const OFFSETS: [i32; 4] = [0, 1, 0, -1];
    OFFSETS[direction & 0x3]
}
