use std::collections::HashMap;

use glam::{IVec2, IVec3};
use log::{debug, trace};

use crate::{
    config::WorldConfig,
    renderer::{BufferKind, MeshSink},
};

use super::{
    BlockKind,
    chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, Chunk, DirtyFlags, chunk_origin},
    generators::{HeightField, fill_chunk},
    update_queue::UpdateQueue,
};

/// Offsets to the four chunks sharing an edge with a chunk: left, right, back, forward
pub(super) const EDGE_NEIGHBORS: [IVec2; 4] = [
    IVec2::new(-(CHUNK_WIDTH as i32), 0),
    IVec2::new(CHUNK_WIDTH as i32, 0),
    IVec2::new(0, -(CHUNK_DEPTH as i32)),
    IVec2::new(0, CHUNK_DEPTH as i32),
];

fn generate_chunk(sink: &mut dyn MeshSink, generator: &dyn HeightField, origin: IVec2) -> Chunk {
    let opaque_buffer = sink.create_buffer(BufferKind::Opaque);
    let liquid_buffer = sink.create_buffer(BufferKind::Liquid);
    let mut chunk = Chunk::new(origin, opaque_buffer, liquid_buffer);
    fill_chunk(&mut chunk, generator);
    debug!("Generated chunk at {origin}");
    chunk
}

fn in_vertical_bounds(coords: IVec3) -> bool {
    (0..CHUNK_HEIGHT as i32).contains(&coords.y)
}

/// Sparse grid of chunks keyed by their origin
pub struct VoxelWorld<S: MeshSink> {
    pub(super) chunks: HashMap<IVec2, Chunk>,
    generator: Box<dyn HeightField>,
    pub(super) sink: S,
    pub(super) queue: UpdateQueue,
    pub(super) config: WorldConfig,
    /// Number of world ticks run so far
    pub(super) tick: u64,
}

impl<S: MeshSink> VoxelWorld<S> {
    pub fn new(config: WorldConfig, generator: Box<dyn HeightField>, sink: S) -> VoxelWorld<S> {
        Self {
            chunks: HashMap::new(),
            generator,
            sink,
            queue: UpdateQueue::new(config.update_queue_capacity),
            config,
            tick: 0,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn pending_updates(&self) -> usize {
        self.queue.len()
    }

    /// Returns the chunk containing the column `(x, z)`, generating it first if needed
    pub fn create_or_get(&mut self, x: i32, z: i32) -> &mut Chunk {
        let origin = chunk_origin(x, z);
        if !self.chunks.contains_key(&origin) {
            // Boundary faces of the existing neighbours are no longer exposed
            for offset in EDGE_NEIGHBORS {
                self.mark_chunk_dirty(origin + offset, DirtyFlags::all());
            }
        }
        let sink = &mut self.sink;
        let generator = self.generator.as_ref();
        self.chunks
            .entry(origin)
            .or_insert_with(|| generate_chunk(sink, generator, origin))
    }

    pub fn get(&self, x: i32, z: i32) -> Option<&Chunk> {
        self.chunks.get(&chunk_origin(x, z))
    }

    pub fn get_mut(&mut self, x: i32, z: i32) -> Option<&mut Chunk> {
        self.chunks.get_mut(&chunk_origin(x, z))
    }

    /// Air for every position outside the vertical bounds or inside a missing chunk
    pub fn get_block(&self, coords: IVec3) -> BlockKind {
        if !in_vertical_bounds(coords) {
            return BlockKind::Air;
        }
        self.get(coords.x, coords.z)
            .map_or(BlockKind::Air, |chunk| chunk.block_at(coords))
    }

    /// Writes a block and queues the position for liquid re-evaluation.
    /// Positions outside the vertical bounds are ignored.
    pub fn set_block(&mut self, coords: IVec3, kind: BlockKind) {
        if !in_vertical_bounds(coords) {
            trace!("Ignoring block write outside of world at {coords}");
            return;
        }
        let old = self.get_block(coords);
        let mut flags = DirtyFlags::OPAQUE;
        if old.is_liquid() || kind.is_liquid() {
            flags |= DirtyFlags::LIQUID;
        }
        self.write_block(coords, kind, flags);
        self.queue.enqueue(coords);
    }

    /// Removes a chunk and releases its mesh buffers
    pub fn unload_chunk(&mut self, x: i32, z: i32) -> bool {
        let origin = chunk_origin(x, z);
        let Some(chunk) = self.chunks.remove(&origin) else {
            return false;
        };
        self.sink.delete(chunk.opaque_buffer());
        self.sink.delete(chunk.liquid_buffer());
        for offset in EDGE_NEIGHBORS {
            self.mark_chunk_dirty(origin + offset, DirtyFlags::all());
        }
        debug!("Unloaded chunk at {origin}");
        true
    }

    /// Submits every chunk buffer holding geometry to the sink
    pub fn draw(&mut self) {
        for chunk in self.chunks.values() {
            self.sink.draw(chunk.opaque_buffer());
            self.sink.draw(chunk.liquid_buffer());
        }
    }

    /// Raw block write without queueing. Marks the owning chunk dirty, and the
    /// neighbouring chunk as well when the block sits on the chunk border.
    pub(super) fn write_block(&mut self, coords: IVec3, kind: BlockKind, flags: DirtyFlags) {
        let chunk = self.create_or_get(coords.x, coords.z);
        let Some((x, y, z)) = chunk.local(coords) else {
            return;
        };
        chunk.set_block(x, y, z, kind);
        chunk.mark_dirty(flags);

        let origin = chunk.origin();
        if x == 0 {
            self.mark_chunk_dirty(origin + EDGE_NEIGHBORS[0], flags);
        } else if x == CHUNK_WIDTH - 1 {
            self.mark_chunk_dirty(origin + EDGE_NEIGHBORS[1], flags);
        }
        if z == 0 {
            self.mark_chunk_dirty(origin + EDGE_NEIGHBORS[2], flags);
        } else if z == CHUNK_DEPTH - 1 {
            self.mark_chunk_dirty(origin + EDGE_NEIGHBORS[3], flags);
        }
    }

    fn mark_chunk_dirty(&mut self, origin: IVec2, flags: DirtyFlags) {
        if let Some(chunk) = self.chunks.get_mut(&origin) {
            chunk.mark_dirty(flags);
        }
    }
}
