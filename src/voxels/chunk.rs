use bitflags::bitflags;
use glam::{IVec2, IVec3};

use crate::renderer::BufferHandle;

use super::{BlockKind, liquid::Liquid};

pub const CHUNK_WIDTH: usize = 16;
pub const CHUNK_DEPTH: usize = 16;
pub const CHUNK_HEIGHT: usize = 256;
pub const CHUNK_FLOOR_AREA: usize = CHUNK_WIDTH * CHUNK_DEPTH;
pub const CHUNK_VOLUME: usize = CHUNK_FLOOR_AREA * CHUNK_HEIGHT;

bitflags! {
    /// Geometry that is stale and needs to be meshed again before the next draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u8 {
        const OPAQUE = 1 << 0;
        const LIQUID = 1 << 1;
    }
}

/// Origin of the chunk containing the world column `(x, z)`
pub fn chunk_origin(x: i32, z: i32) -> IVec2 {
    IVec2::new(
        x.div_euclid(CHUNK_WIDTH as i32) * CHUNK_WIDTH as i32,
        z.div_euclid(CHUNK_DEPTH as i32) * CHUNK_DEPTH as i32,
    )
}

/// Flat index of a chunk local position
pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < CHUNK_WIDTH && y < CHUNK_HEIGHT && z < CHUNK_DEPTH);
    y * CHUNK_FLOOR_AREA + z * CHUNK_WIDTH + x
}

pub struct Chunk {
    /// Minimum corner on the x/z plane (world pos)
    origin: IVec2,
    blocks: Box<[BlockKind]>, // owned, contiguous memory
    dirty: DirtyFlags,
    opaque_buffer: BufferHandle,
    liquid_buffer: BufferHandle,
    liquids: Vec<Liquid>,
}

impl Chunk {
    /// Empty chunk with its opaque geometry marked dirty
    pub fn new(origin: IVec2, opaque_buffer: BufferHandle, liquid_buffer: BufferHandle) -> Chunk {
        debug_assert_eq!(
            origin,
            chunk_origin(origin.x, origin.y),
            "Chunk origin {origin} not aligned to grid"
        );
        Self {
            origin,
            blocks: vec![BlockKind::Air; CHUNK_VOLUME].into_boxed_slice(),
            dirty: DirtyFlags::OPAQUE,
            opaque_buffer,
            liquid_buffer,
            liquids: Vec::new(),
        }
    }

    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Converts a world position into chunk local coordinates. `None` if the
    /// position lies outside of this chunk or outside the vertical bounds.
    pub fn local(&self, world_pos: IVec3) -> Option<(usize, usize, usize)> {
        let x = world_pos.x - self.origin.x;
        let z = world_pos.z - self.origin.y;
        let in_bounds = (0..CHUNK_WIDTH as i32).contains(&x)
            && (0..CHUNK_HEIGHT as i32).contains(&world_pos.y)
            && (0..CHUNK_DEPTH as i32).contains(&z);
        in_bounds.then_some((x as usize, world_pos.y as usize, z as usize))
    }

    pub fn world_pos(&self, x: usize, y: usize, z: usize) -> IVec3 {
        IVec3::new(self.origin.x + x as i32, y as i32, self.origin.y + z as i32)
    }

    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockKind {
        self.blocks[block_index(x, y, z)]
    }

    pub fn set_block(&mut self, x: usize, y: usize, z: usize, kind: BlockKind) {
        self.blocks[block_index(x, y, z)] = kind;
    }

    /// Block at a world position, air if the position is not inside this chunk
    pub fn block_at(&self, world_pos: IVec3) -> BlockKind {
        match self.local(world_pos) {
            Some((x, y, z)) => self.block(x, y, z),
            None => BlockKind::Air,
        }
    }

    /// All blocks, indexed like [`block_index`]
    pub fn blocks(&self) -> &[BlockKind] {
        &self.blocks
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    pub fn clear_dirty(&mut self, flags: DirtyFlags) {
        self.dirty -= flags;
    }

    pub fn opaque_buffer(&self) -> BufferHandle {
        self.opaque_buffer
    }

    pub fn liquid_buffer(&self) -> BufferHandle {
        self.liquid_buffer
    }

    pub fn liquids(&self) -> &[Liquid] {
        &self.liquids
    }

    pub fn liquid(&self, world_pos: IVec3) -> Option<&Liquid> {
        self.liquids.iter().find(|l| l.position == world_pos)
    }

    pub fn liquid_mut(&mut self, world_pos: IVec3) -> Option<&mut Liquid> {
        self.liquids.iter_mut().find(|l| l.position == world_pos)
    }

    pub fn insert_liquid(&mut self, liquid: Liquid) {
        debug_assert!(self.local(liquid.position).is_some());
        debug_assert!(self.liquid(liquid.position).is_none());
        self.liquids.push(liquid);
    }

    pub fn remove_liquid(&mut self, world_pos: IVec3) -> Option<Liquid> {
        let idx = self.liquids.iter().position(|l| l.position == world_pos)?;
        // Keep insertion order so iteration stays deterministic
        Some(self.liquids.remove(idx))
    }

    #[cfg(test)]
    pub fn iter_blocks(&self) -> impl Iterator<Item = (IVec3, BlockKind)> + '_ {
        self.blocks.iter().enumerate().filter_map(move |(i, kind)| {
            if matches!(kind, BlockKind::Air) {
                return None;
            }
            let y = i / CHUNK_FLOOR_AREA;
            let z = (i % CHUNK_FLOOR_AREA) / CHUNK_WIDTH;
            let x = i % CHUNK_WIDTH;
            Some((self.world_pos(x, y, z), *kind))
        })
    }
}
