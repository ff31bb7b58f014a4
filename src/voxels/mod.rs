mod block;
pub mod chunk;
pub mod generators;
mod liquid;
pub mod mesher;
mod query;
mod update_queue;
mod world;

pub use crate::voxels::block::BLOCK_COUNT;
pub use crate::voxels::block::BlockFilter;
pub use crate::voxels::block::BlockKind;
pub use crate::voxels::chunk::Chunk;
pub use crate::voxels::chunk::DirtyFlags;
pub use crate::voxels::liquid::Liquid;
pub use crate::voxels::liquid::SOURCE_STRENGTH;
pub use crate::voxels::query::RayHit;
pub use crate::voxels::query::ray_neighbor;
pub use crate::voxels::update_queue::UpdateQueue;
pub use crate::voxels::world::VoxelWorld;
