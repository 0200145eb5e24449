#![doc = include_str!("../readme.md")]
#![warn(missing_docs)]

mod cell;
mod clip;
mod config;
mod filter;
mod heightfield;
mod main_api;
pub(crate) mod math;
mod rasterize;
mod span;
mod trimesh;

pub use cell::Cell;
pub use config::{VoxelizationConfig, VoxelizationConfigBuilder};
pub use heightfield::{
    Heightfield, HeightfieldBuilder, HeightfieldBuilderError, SpanInsertionError,
};
pub use main_api::{voxelize, VoxelizeError};
pub use math::Aabb3d;
pub use rasterize::RasterizationError;
pub use span::{AreaType, Span};
pub use trimesh::{TriMesh, TriMeshExtendError};
