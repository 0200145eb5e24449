//! Configuration for the voxelization stage, usually derived from agent
//! dimensions with [`VoxelizationConfigBuilder`].

/// Parameters of a voxelization run.
///
/// Units are either world units (wu) or voxels (vx); voxel units are based
/// on the values of `cell_size` and `cell_height`. Usually built with
/// [`VoxelizationConfigBuilder`], which derives the voxel-unit values from
/// the agent's dimensions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelizationConfig {
    /// The xz-plane cell size. `[Limit: > 0] [Units: wu]`
    ///
    /// This value is usually derived from the agent radius r: r/2 for
    /// outdoor scenes, r/3 or smaller for indoor scenes with tight spaces.
    /// Smaller values increase rasterization resolution, but generation time
    /// grows steeply with it.
    pub cell_size: f32,

    /// The y-axis cell size. `[Limit: > 0] [Units: wu]`
    ///
    /// Defined separately from `cell_size` to allow greater precision in
    /// height tests; half the cell size is a good starting point. Decrease
    /// it if walkable surfaces separated by small curbs end up fused.
    pub cell_height: f32,

    /// The maximum slope that is considered walkable.
    /// `[Limits: 0 <= value < 0.5*π] [Units: Radians]`
    pub walkable_slope_angle: f32,

    /// Minimum floor to ceiling height that will still allow the floor to
    /// be considered walkable. `[Limit: >= 3] [Units: vx]`
    ///
    /// Usually the agent height; permits detection of overhangs that make
    /// the geometry below them un-walkable.
    pub walkable_height: u16,

    /// Maximum ledge height that is considered to still be traversable.
    /// `[Limit: >= 0] [Units: vx]`
    ///
    /// Allows the field to flow over curbs and up and down stairways.
    /// Usually set to how far up or down the agent can step.
    pub walkable_climb: u16,
}

/// A builder for [`VoxelizationConfig`] that takes world-unit agent
/// dimensions and derives the voxel-unit parameters. The defaults describe
/// an adult-human-sized agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelizationConfigBuilder {
    /// The xz-plane cell size. `[Limit: > 0] [Units: wu]`
    pub cell_size: f32,
    /// The y-axis cell size. `[Limit: > 0] [Units: wu]`
    pub cell_height: f32,
    /// The height of the agent. `[Limit: > 0] [Units: wu]`
    ///
    /// It's often a good idea to add a little bit of padding: an agent that
    /// is 1.8 world units tall might want to set this to 2.0.
    pub agent_height: f32,
    /// The biggest step the agent can climb. `[Limit: >= 0] [Units: wu]`
    pub agent_max_climb: f32,
    /// The maximum slope the agent can walk on. `[Units: Radians]`
    pub agent_max_slope: f32,
}

impl Default for VoxelizationConfigBuilder {
    fn default() -> Self {
        Self {
            cell_size: 0.3,
            cell_height: 0.2,
            agent_height: 2.0,
            agent_max_climb: 0.9,
            agent_max_slope: 45.0_f32.to_radians(),
        }
    }
}

impl VoxelizationConfigBuilder {
    /// Builds a [`VoxelizationConfig`] from the current configuration.
    pub fn build(self) -> VoxelizationConfig {
        VoxelizationConfig {
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            walkable_slope_angle: self.agent_max_slope,
            walkable_height: (self.agent_height / self.cell_height).ceil() as u16,
            walkable_climb: (self.agent_max_climb / self.cell_height).floor() as u16,
        }
    }
}
