//! The one-call entry point tying mesh input, rasterization, and filtering
//! together.

use thiserror::Error;

use crate::{
    config::VoxelizationConfig,
    heightfield::{Heightfield, HeightfieldBuilder, HeightfieldBuilderError},
    rasterize::RasterizationError,
    trimesh::TriMesh,
};

impl Heightfield {
    /// Rasterizes the triangles of a [`TriMesh`] into the heightfield and
    /// runs the three walkability filters.
    ///
    /// # Arguments
    ///
    /// - `trimesh` - The [`TriMesh`] to rasterize.
    /// - `walkable_height` - Minimum floor to ceiling height that will still
    ///   allow the floor area to be considered walkable. `[Limit: >= 3] [Units: vx]`
    /// - `walkable_climb` - Maximum ledge height that is considered to still
    ///   be traversable. `[Limit: >= 0] [Units: vx]`
    ///
    pub fn populate_from_trimesh(
        &mut self,
        trimesh: &TriMesh,
        walkable_height: u16,
        walkable_climb: u16,
    ) -> Result<(), RasterizationError> {
        self.rasterize_triangles(trimesh)?;
        // Once all geometry is rasterized, we do initial pass of filtering to
        // remove unwanted overhangs caused by the conservative rasterization
        // as well as filter spans where the character cannot possibly stand.
        self.filter_low_hanging_walkable_obstacles(walkable_climb);
        self.filter_ledge_spans(walkable_height, walkable_climb);
        self.filter_walkable_low_height_spans(walkable_height);
        Ok(())
    }
}

/// Voxelizes a [`TriMesh`] in one call: marks walkable triangles per the
/// config's slope limit, builds a [`Heightfield`] covering the mesh, and
/// runs [`Heightfield::populate_from_trimesh`].
pub fn voxelize(
    mut trimesh: TriMesh,
    config: &VoxelizationConfig,
) -> Result<Heightfield, VoxelizeError> {
    trimesh.mark_walkable_triangles(config.walkable_slope_angle);

    let aabb = trimesh.compute_aabb().ok_or(VoxelizeError::EmptyMesh)?;
    let mut heightfield = HeightfieldBuilder {
        aabb,
        cell_size: config.cell_size,
        cell_height: config.cell_height,
    }
    .build()?;

    heightfield.populate_from_trimesh(&trimesh, config.walkable_height, config.walkable_climb)?;
    Ok(heightfield)
}

/// Errors that can occur when voxelizing a [`TriMesh`] with [`voxelize`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoxelizeError {
    /// Happens when the mesh has no vertices to derive bounds from.
    #[error("cannot voxelize an empty mesh")]
    EmptyMesh,
    /// Happens when the mesh bounds and cell sizes don't form a valid grid.
    #[error(transparent)]
    InvalidGrid(#[from] HeightfieldBuilderError),
    /// Happens when the mesh data is inconsistent.
    #[error(transparent)]
    InvalidMesh(#[from] RasterizationError),
}
