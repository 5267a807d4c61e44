pub mod animation;
pub mod turtle;
pub mod voxel_map;
pub mod world;

pub use animation::AnimationState;
pub use turtle::{Turtle, TurtlePose};
pub use voxel_map::{BlockPos, VoxelMap};
pub use world::{RenderToggles, World};
