//! Conservative triangle voxelization into a [`Heightfield`].

use glam::{UVec3, Vec3A};
use thiserror::Error;
use tracing::warn;

use crate::{
    clip::{clip_poly, MAX_CLIP_VERTS},
    heightfield::Heightfield,
    math::Aabb3d,
    span::{AreaType, Span},
    trimesh::TriMesh,
};

impl Heightfield {
    /// Rasterizes a single triangle, adding a span to every column whose
    /// footprint the triangle touches.
    ///
    /// The triangle is clipped against the cell planes of each row and
    /// column it overlaps; the clipped fragment's y-range is rounded
    /// outwards to whole cells, so any voxel the triangle intersects at all
    /// becomes solid.
    pub fn rasterize_triangle(&mut self, a: Vec3A, b: Vec3A, c: Vec3A, area: AreaType) {
        let aabb = self.aabb();
        let triangle_aabb = Aabb3d {
            min: a.min(b).min(c),
            max: a.max(b).max(c),
        };
        if !triangle_aabb.overlaps(&aabb) {
            return;
        }

        let cell_size = self.cell_size();
        let cell_height = self.cell_height();
        let inverse_cell_size = 1.0 / cell_size;
        let inverse_cell_height = 1.0 / cell_height;
        let width = self.width() as i32;
        let height = self.height() as i32;
        let length = self.length() as i32;
        let field_height = height as f32 * cell_height;

        // The footprint of the triangle in grid coordinates, clamped to the
        // grid.
        let x0 = (((triangle_aabb.min.x - aabb.min.x) * inverse_cell_size).floor() as i32)
            .clamp(0, width - 1);
        let x1 = (((triangle_aabb.max.x - aabb.min.x) * inverse_cell_size).floor() as i32)
            .clamp(0, width - 1);
        let z0 = (((triangle_aabb.min.z - aabb.min.z) * inverse_cell_size).floor() as i32)
            .clamp(0, length - 1);
        let z1 = (((triangle_aabb.max.z - aabb.min.z) * inverse_cell_size).floor() as i32)
            .clamp(0, length - 1);

        let mut buf_a = [Vec3A::ZERO; MAX_CLIP_VERTS];
        let mut buf_b = [Vec3A::ZERO; MAX_CLIP_VERTS];
        let mut buf_row = [Vec3A::ZERO; MAX_CLIP_VERTS];

        for z in z0..=z1 {
            // Bound the triangle to this row of cells.
            let row_min = aabb.min.z + z as f32 * cell_size;
            let row_max = row_min + cell_size;
            let count = clip_poly(&[a, b, c], &mut buf_a, 0.0, 1.0, -row_min);
            if count < 3 {
                continue;
            }
            let row_count = clip_poly(&buf_a[..count], &mut buf_row, 0.0, -1.0, row_max);
            if row_count < 3 {
                continue;
            }

            for x in x0..=x1 {
                // Bound the row polygon to this column's footprint.
                let column_min = aabb.min.x + x as f32 * cell_size;
                let column_max = column_min + cell_size;
                let count = clip_poly(&buf_row[..row_count], &mut buf_a, 1.0, 0.0, -column_min);
                if count < 3 {
                    continue;
                }
                let count = clip_poly(&buf_a[..count], &mut buf_b, -1.0, 0.0, column_max);
                if count < 3 {
                    continue;
                }

                // The y-range of the fragment, relative to the field bottom.
                let mut y_min = buf_b[0].y;
                let mut y_max = buf_b[0].y;
                for vert in &buf_b[1..count] {
                    y_min = y_min.min(vert.y);
                    y_max = y_max.max(vert.y);
                }
                y_min -= aabb.min.y;
                y_max -= aabb.min.y;
                if y_max < 0.0 || y_min > field_height {
                    continue;
                }
                y_min = y_min.max(0.0);
                y_max = y_max.min(field_height);

                let span_min = ((y_min * inverse_cell_height).floor() as i32).clamp(0, height);
                let span_max = ((y_max * inverse_cell_height).ceil() as i32)
                    .max(span_min + 1)
                    .min(height);
                if span_min >= span_max {
                    warn!("dropping zero-thickness span at column ({x}, {z})");
                    continue;
                }

                let index = self.cell_index(x as u32, z as u32);
                self.cells[index].add_span(Span::new(span_min as u16, span_max as u16, area));
            }
        }
    }

    /// Rasterizes the triangles of a [`TriMesh`] with their per-triangle
    /// area types.
    ///
    /// Validates the mesh up front; the heightfield is untouched on error.
    pub fn rasterize_triangles(&mut self, trimesh: &TriMesh) -> Result<(), RasterizationError> {
        if trimesh.area_types.len() != trimesh.indices.len() {
            return Err(RasterizationError::AreaCountMismatch {
                areas: trimesh.area_types.len(),
                triangles: trimesh.indices.len(),
            });
        }
        for indices in &trimesh.indices {
            let highest = indices.max_element();
            if highest as usize >= trimesh.vertices.len() {
                return Err(RasterizationError::IndexOutOfBounds {
                    index: highest,
                    vertices: trimesh.vertices.len(),
                });
            }
        }

        for (indices, area) in trimesh.indices.iter().zip(&trimesh.area_types) {
            self.rasterize_triangle(
                trimesh.vertices[indices.x as usize],
                trimesh.vertices[indices.y as usize],
                trimesh.vertices[indices.z as usize],
                *area,
            );
        }
        Ok(())
    }

    /// Rasterizes an array of loose triangles with their per-triangle area
    /// types.
    pub fn rasterize_triangle_array(
        &mut self,
        triangles: &[[Vec3A; 3]],
        area_types: &[AreaType],
    ) -> Result<(), RasterizationError> {
        if area_types.len() != triangles.len() {
            return Err(RasterizationError::AreaCountMismatch {
                areas: area_types.len(),
                triangles: triangles.len(),
            });
        }
        for ([a, b, c], area) in triangles.iter().zip(area_types) {
            self.rasterize_triangle(*a, *b, *c, *area);
        }
        Ok(())
    }

    /// Rasterizes indexed triangles out of an interleaved vertex buffer
    /// without copying it.
    ///
    /// Vertex `i` reads its x, y, z from
    /// `vertices[offset + i * stride..][..3]`, with `offset` and `stride`
    /// counted in floats. Validates all offsets up front; the heightfield is
    /// untouched on error.
    pub fn rasterize_triangles_strided(
        &mut self,
        vertices: &[f32],
        offset: usize,
        stride: usize,
        indices: &[UVec3],
        area_types: &[AreaType],
    ) -> Result<(), RasterizationError> {
        if stride < 3 {
            return Err(RasterizationError::StrideTooSmall { stride });
        }
        if area_types.len() != indices.len() {
            return Err(RasterizationError::AreaCountMismatch {
                areas: area_types.len(),
                triangles: indices.len(),
            });
        }
        for index in indices.iter().flat_map(|triangle| triangle.to_array()) {
            let end = offset + index as usize * stride + 3;
            if end > vertices.len() {
                return Err(RasterizationError::VertexOutOfBounds {
                    index,
                    offset,
                    stride,
                    len: vertices.len(),
                });
            }
        }

        let vertex = |index: u32| {
            let base = offset + index as usize * stride;
            Vec3A::new(vertices[base], vertices[base + 1], vertices[base + 2])
        };
        for (indices, area) in indices.iter().zip(area_types) {
            self.rasterize_triangle(
                vertex(indices.x),
                vertex(indices.y),
                vertex(indices.z),
                *area,
            );
        }
        Ok(())
    }
}

/// Errors that can occur in the batch rasterization entry points.
///
/// All validation happens before the first triangle is rasterized, so a
/// heightfield is never left partially updated by a failed call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterizationError {
    /// Happens when the per-triangle area list does not line up with the
    /// triangle list.
    #[error("got {areas} area types for {triangles} triangles")]
    AreaCountMismatch {
        /// The number of area types passed
        areas: usize,
        /// The number of triangles passed
        triangles: usize,
    },
    /// Happens when a triangle references a vertex past the end of the
    /// vertex list.
    #[error("triangle index {index} is out of bounds for {vertices} vertices")]
    IndexOutOfBounds {
        /// The offending vertex index
        index: u32,
        /// The number of vertices available
        vertices: usize,
    },
    /// Happens when the vertex stride cannot hold a position.
    #[error("vertex stride of {stride} floats is too small to hold a position")]
    StrideTooSmall {
        /// The offending stride, in floats
        stride: usize,
    },
    /// Happens when an indexed read would run past the end of an interleaved
    /// vertex buffer.
    #[error(
        "vertex {index} at offset {offset} and stride {stride} reads past the buffer of {len} floats"
    )]
    VertexOutOfBounds {
        /// The offending vertex index
        index: u32,
        /// The base offset into the buffer, in floats
        offset: usize,
        /// The per-vertex stride, in floats
        stride: usize,
        /// The length of the buffer, in floats
        len: usize,
    },
}
