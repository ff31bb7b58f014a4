use crate::voxels::{
    BlockKind,
    chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, Chunk},
};

pub mod flat;
pub mod heightmap;

/// Number of dirt blocks between the grass cap and the stone below
pub const DIRT_LAYERS: i32 = 3;

pub trait HeightField {
    /// Surface height of the world column at `(world_x, world_z)`. Negative
    /// heights produce an empty column.
    fn height(&self, world_x: i32, world_z: i32) -> i32;
}

/// Fills every column of the chunk: grass cap, a few dirt layers, stone down to `y = 0`
pub fn fill_chunk(chunk: &mut Chunk, field: &dyn HeightField) {
    let origin = chunk.origin();
    for z in 0..CHUNK_DEPTH {
        for x in 0..CHUNK_WIDTH {
            let height = field
                .height(origin.x + x as i32, origin.y + z as i32)
                .min(CHUNK_HEIGHT as i32 - 1);
            for y in 0..=height {
                let kind = if y == height {
                    BlockKind::Grass
                } else if y >= height - DIRT_LAYERS {
                    BlockKind::Dirt
                } else {
                    BlockKind::Stone
                };
                chunk.set_block(x, y as usize, z, kind);
            }
        }
    }
}
