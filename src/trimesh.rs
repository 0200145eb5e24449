//! Triangle soup input for [`Heightfield`](crate::Heightfield) rasterization.

use glam::{UVec3, Vec3A};
use thiserror::Error;

use crate::{
    math::{Aabb3d, TriangleIndices as _},
    span::AreaType,
};

/// A mesh used as input for [`Heightfield`](crate::Heightfield)
/// rasterization.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TriMesh {
    /// The vertices of the mesh.
    /// Follows the convention of a triangle list.
    pub vertices: Vec<Vec3A>,

    /// The indices of the mesh.
    /// Follows the convention of a triangle list.
    pub indices: Vec<UVec3>,

    /// The area types of the mesh. Each index corresponds 1:1 to the
    /// [`TriMesh::indices`].
    pub area_types: Vec<AreaType>,
}

impl TriMesh {
    /// Appends another trimesh, rebasing its indices onto the end of this
    /// mesh's vertex list.
    ///
    /// Fails without touching `self` when the combined vertex count can no
    /// longer be addressed by a `u32` index.
    pub fn extend(&mut self, other: TriMesh) -> Result<(), TriMeshExtendError> {
        let combined = self.vertices.len().saturating_add(other.vertices.len());
        if combined > u32::MAX as usize {
            return Err(TriMeshExtendError::TooManyVertices { vertices: combined });
        }
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices
            .extend(other.indices.iter().map(|indices| indices + base));
        self.area_types.extend(other.area_types);
        Ok(())
    }

    /// Computes the AABB of the trimesh.
    /// Returns `None` if the trimesh is empty.
    pub fn compute_aabb(&self) -> Option<Aabb3d> {
        Aabb3d::from_verts(&self.vertices)
    }

    /// Marks all triangles whose slope is below the threshold angle as
    /// walkable.
    ///
    /// # Arguments
    ///
    /// * `threshold_rad` - The maximum walkable slope angle in radians,
    ///   measured against the world up axis.
    ///
    pub fn mark_walkable_triangles(&mut self, threshold_rad: f32) {
        let threshold_cos = threshold_rad.cos();
        for (i, indices) in self.indices.iter().enumerate() {
            let normal = indices.normal(&self.vertices);

            if normal.y > threshold_cos {
                self.area_types[i] = AreaType::DEFAULT_WALKABLE;
            }
        }
    }
}

/// Errors that can occur when combining meshes with [`TriMesh::extend`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriMeshExtendError {
    /// Happens when the combined vertex count no longer fits a `u32` index.
    #[error("cannot index {vertices} combined vertices with u32")]
    TooManyVertices {
        /// The vertex count of both meshes together
        vertices: usize,
    },
}
