use std::time::Instant;

use glam::{IVec2, IVec3, Vec3};
use log::debug;

use crate::renderer::{MeshSink, Vertex};

use super::{
    BLOCK_COUNT, BlockKind, VoxelWorld,
    chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, Chunk, DirtyFlags, block_index},
    world::EDGE_NEIGHBORS,
};

/// Blocks of an edge-adjacent chunk. A missing chunk reads as all air.
#[derive(Copy, Clone)]
pub enum NeighborBlocks<'a> {
    Present(&'a [BlockKind]),
    Absent,
}

impl NeighborBlocks<'_> {
    fn block(&self, x: usize, y: usize, z: usize) -> BlockKind {
        match self {
            NeighborBlocks::Present(blocks) => blocks[block_index(x, y, z)],
            NeighborBlocks::Absent => BlockKind::Air,
        }
    }
}

impl<'a> From<Option<&'a Chunk>> for NeighborBlocks<'a> {
    fn from(chunk: Option<&'a Chunk>) -> Self {
        match chunk {
            Some(chunk) => NeighborBlocks::Present(chunk.blocks()),
            None => NeighborBlocks::Absent,
        }
    }
}

/// The four chunks sharing an edge with the meshed chunk
#[derive(Copy, Clone)]
pub struct ChunkNeighbors<'a> {
    /// -x
    pub left: NeighborBlocks<'a>,
    /// +x
    pub right: NeighborBlocks<'a>,
    /// -z
    pub back: NeighborBlocks<'a>,
    /// +z
    pub forward: NeighborBlocks<'a>,
}

impl ChunkNeighbors<'_> {
    pub fn absent() -> Self {
        Self {
            left: NeighborBlocks::Absent,
            right: NeighborBlocks::Absent,
            back: NeighborBlocks::Absent,
            forward: NeighborBlocks::Absent,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshPass {
    Opaque,
    Liquid,
}

impl MeshPass {
    fn includes(self, kind: BlockKind) -> bool {
        match self {
            MeshPass::Opaque => kind.is_solid(),
            MeshPass::Liquid => kind.is_liquid(),
        }
    }

    /// Whether `neighbor` hides the face of a block meshed in this pass
    fn occludes(self, neighbor: BlockKind) -> bool {
        match self {
            MeshPass::Opaque => neighbor.is_solid(),
            MeshPass::Liquid => neighbor.is_liquid(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ChunkGeometry {
    pub opaque: Vec<Vertex>,
    pub liquid: Vec<Vertex>,
}

struct Face {
    normal: IVec3,
    /// Corner offsets within the unit cube, counter-clockwise seen from outside
    corners: [Vec3; 4],
}

// Side faces start bottom right and go up first, so one UV layout fits all of them.
// Bottom and top faces list their corners mirrored, which the same layout absorbs.
const FACES: [Face; 6] = [
    Face {
        normal: IVec3::X,
        corners: [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ],
    },
    Face {
        normal: IVec3::NEG_X,
        corners: [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ],
    },
    Face {
        normal: IVec3::Y,
        corners: [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 0.0),
        ],
    },
    Face {
        normal: IVec3::NEG_Y,
        corners: [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ],
    },
    Face {
        normal: IVec3::Z,
        corners: [
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ],
    },
    Face {
        normal: IVec3::NEG_Z,
        corners: [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ],
    },
];

/// Two triangles per quad
const QUAD_INDICES: [usize; 6] = [0, 1, 2, 0, 2, 3];

const ATLAS_SLOTS: f32 = (BLOCK_COUNT - 1) as f32;

/// Block at a chunk local position that may be one step outside the chunk
fn lookup(chunk: &Chunk, neighbors: &ChunkNeighbors, pos: IVec3) -> BlockKind {
    if !(0..CHUNK_HEIGHT as i32).contains(&pos.y) {
        return BlockKind::Air;
    }
    let y = pos.y as usize;
    let last_x = CHUNK_WIDTH - 1;
    let last_z = CHUNK_DEPTH - 1;
    match (pos.x, pos.z) {
        (-1, z) => neighbors.left.block(last_x, y, z as usize),
        (x, z) if x == CHUNK_WIDTH as i32 => neighbors.right.block(0, y, z as usize),
        (x, -1) => neighbors.back.block(x as usize, y, last_z),
        (x, z) if z == CHUNK_DEPTH as i32 => neighbors.forward.block(x as usize, y, 0),
        (x, z) => chunk.block(x as usize, y, z as usize),
    }
}

fn push_face(out: &mut Vec<Vertex>, origin: Vec3, face: &Face, kind: BlockKind) {
    let slot = kind.atlas_slot().unwrap_or(0) as f32;
    let u0 = slot / ATLAS_SLOTS;
    let u1 = (slot + 1.0) / ATLAS_SLOTS;
    // bottom right, top right, top left, bottom left
    let tex_coords = [[u1, 1.0], [u1, 0.0], [u0, 0.0], [u0, 1.0]];
    let normal = face.normal.as_vec3().to_array();
    for i in QUAD_INDICES {
        out.push(Vertex {
            position: (origin + face.corners[i]).to_array(),
            normal,
            tex_coords: tex_coords[i],
        });
    }
}

/// Builds the vertices of one geometry kind. Faces are emitted only where the
/// adjacent block, possibly in a neighbouring chunk, does not hide them.
pub fn mesh_pass(chunk: &Chunk, neighbors: &ChunkNeighbors, pass: MeshPass) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    for y in 0..CHUNK_HEIGHT {
        for z in 0..CHUNK_DEPTH {
            for x in 0..CHUNK_WIDTH {
                let kind = chunk.block(x, y, z);
                if !pass.includes(kind) {
                    continue;
                }
                let local = IVec3::new(x as i32, y as i32, z as i32);
                let origin = chunk.world_pos(x, y, z).as_vec3();
                for face in &FACES {
                    let adjacent = lookup(chunk, neighbors, local + face.normal);
                    if !pass.occludes(adjacent) {
                        push_face(&mut vertices, origin, face, kind);
                    }
                }
            }
        }
    }
    vertices
}

pub fn mesh_chunk(chunk: &Chunk, neighbors: &ChunkNeighbors) -> ChunkGeometry {
    ChunkGeometry {
        opaque: mesh_pass(chunk, neighbors, MeshPass::Opaque),
        liquid: mesh_pass(chunk, neighbors, MeshPass::Liquid),
    }
}

impl<S: MeshSink> VoxelWorld<S> {
    pub fn neighbors(&self, origin: IVec2) -> ChunkNeighbors<'_> {
        let [left, right, back, forward] =
            EDGE_NEIGHBORS.map(|offset| NeighborBlocks::from(self.chunks.get(&(origin + offset))));
        ChunkNeighbors {
            left,
            right,
            back,
            forward,
        }
    }

    /// Meshes every dirty geometry and uploads it into the chunk's buffer.
    /// Returns the number of uploads.
    pub fn remesh_dirty(&mut self) -> usize {
        let start = Instant::now();
        let dirty: Vec<IVec2> = self
            .chunks
            .iter()
            .filter(|(_, chunk)| !chunk.dirty().is_empty())
            .map(|(origin, _)| *origin)
            .collect();

        let mut uploads = 0;
        for origin in dirty {
            let Some(chunk) = self.chunks.get(&origin) else {
                continue;
            };
            let neighbors = self.neighbors(origin);
            let flags = chunk.dirty();
            let opaque = flags
                .contains(DirtyFlags::OPAQUE)
                .then(|| mesh_pass(chunk, &neighbors, MeshPass::Opaque));
            let liquid = flags
                .contains(DirtyFlags::LIQUID)
                .then(|| mesh_pass(chunk, &neighbors, MeshPass::Liquid));
            let (opaque_buffer, liquid_buffer) = (chunk.opaque_buffer(), chunk.liquid_buffer());

            if let Some(vertices) = opaque {
                self.sink.upload(opaque_buffer, &vertices);
                uploads += 1;
            }
            if let Some(vertices) = liquid {
                self.sink.upload(liquid_buffer, &vertices);
                uploads += 1;
            }
            if let Some(chunk) = self.chunks.get_mut(&origin) {
                chunk.clear_dirty(flags);
            }
        }
        if uploads > 0 {
            debug!(
                "Remeshed {uploads} chunk geometries in {}ms",
                start.elapsed().as_secs_f32() * 1000.0
            );
        }
        uploads
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, IVec3, Vec3};

    use crate::{
        config::WorldConfig,
        renderer::{BufferHandle, MemorySink, Vertex},
        voxels::{
            BlockKind, VoxelWorld,
            chunk::{CHUNK_FLOOR_AREA, CHUNK_VOLUME, CHUNK_WIDTH, Chunk, DirtyFlags},
            generators::flat::FlatHeightField,
        },
    };

    use super::{ChunkNeighbors, MeshPass, NeighborBlocks, mesh_chunk, mesh_pass};

    fn chunk() -> Chunk {
        Chunk::new(IVec2::ZERO, BufferHandle(0), BufferHandle(1))
    }

    fn face_count(vertices: &[Vertex]) -> usize {
        assert_eq!(vertices.len() % 6, 0);
        vertices.len() / 6
    }

    fn faces_with_normal(vertices: &[Vertex], normal: Vec3) -> usize {
        vertices
            .chunks(6)
            .filter(|quad| quad[0].normal == normal.to_array())
            .count()
    }

    #[test]
    fn test_single_block_emits_six_faces() {
        let mut chunk = chunk();
        chunk.set_block(4, 10, 4, BlockKind::Stone);
        let geometry = mesh_chunk(&chunk, &ChunkNeighbors::absent());
        assert_eq!(face_count(&geometry.opaque), 6);
        assert!(geometry.liquid.is_empty());
    }

    #[test]
    fn test_interior_block_emits_nothing() {
        let mut chunk = chunk();
        for x in 3..6 {
            for y in 3..6 {
                for z in 3..6 {
                    chunk.set_block(x, y, z, BlockKind::Dirt);
                }
            }
        }
        let vertices = mesh_pass(&chunk, &ChunkNeighbors::absent(), MeshPass::Opaque);
        // Only the 3x3 outer faces of the cube, the centre block is hidden
        assert_eq!(face_count(&vertices), 6 * 9);
        let center = Vec3::new(4.0, 4.0, 4.0);
        let touches_center = vertices.iter().any(|v| {
            let p = Vec3::from_array(v.position);
            p.cmpgt(center).all() && p.cmplt(center + Vec3::ONE).all()
        });
        assert!(!touches_center);
    }

    #[test]
    fn test_flat_plane_only_up_faces_from_top_layer() {
        let mut chunk = chunk();
        for z in 0..16 {
            for x in 0..16 {
                chunk.set_block(x, 0, z, BlockKind::Stone);
                chunk.set_block(x, 1, z, BlockKind::Grass);
            }
        }
        let neighbor_blocks = vec![BlockKind::Stone; CHUNK_VOLUME];
        let neighbors = ChunkNeighbors {
            left: NeighborBlocks::Present(&neighbor_blocks),
            right: NeighborBlocks::Present(&neighbor_blocks),
            back: NeighborBlocks::Present(&neighbor_blocks),
            forward: NeighborBlocks::Present(&neighbor_blocks),
        };
        let vertices = mesh_pass(&chunk, &neighbors, MeshPass::Opaque);
        // One up face per surface block, a down face per bottom block (world floor)
        assert_eq!(faces_with_normal(&vertices, Vec3::Y), CHUNK_FLOOR_AREA);
        assert_eq!(faces_with_normal(&vertices, Vec3::NEG_Y), CHUNK_FLOOR_AREA);
        let up_heights: Vec<f32> = vertices
            .chunks(6)
            .filter(|quad| quad[0].normal == [0.0, 1.0, 0.0])
            .map(|quad| quad[0].position[1])
            .collect();
        assert!(up_heights.iter().all(|h| *h == 2.0));
        // No faces between the two layers and no side faces against solid neighbours
        assert_eq!(face_count(&vertices), 2 * CHUNK_FLOOR_AREA);
    }

    #[test]
    fn test_boundary_faces_consult_neighbors() {
        let mut chunk = chunk();
        chunk.set_block(0, 5, 7, BlockKind::Stone);
        chunk.set_block(CHUNK_WIDTH - 1, 5, 7, BlockKind::Stone);

        let vertices = mesh_pass(&chunk, &ChunkNeighbors::absent(), MeshPass::Opaque);
        assert_eq!(face_count(&vertices), 12);

        let mut left = vec![BlockKind::Air; CHUNK_VOLUME];
        // Last column of the left chunk, same y and z
        left[5 * CHUNK_FLOOR_AREA + 7 * CHUNK_WIDTH + CHUNK_WIDTH - 1] = BlockKind::Stone;
        let neighbors = ChunkNeighbors {
            left: NeighborBlocks::Present(&left),
            ..ChunkNeighbors::absent()
        };
        let vertices = mesh_pass(&chunk, &neighbors, MeshPass::Opaque);
        assert_eq!(face_count(&vertices), 11);
        assert_eq!(faces_with_normal(&vertices, Vec3::NEG_X), 1);
    }

    #[test]
    fn test_liquid_faces_hidden_by_liquid_only() {
        let mut chunk = chunk();
        chunk.set_block(5, 5, 5, BlockKind::Water);
        chunk.set_block(6, 5, 5, BlockKind::Water);
        chunk.set_block(5, 4, 5, BlockKind::Stone);
        let geometry = mesh_chunk(&chunk, &ChunkNeighbors::absent());
        // Two water blocks share one face each
        assert_eq!(face_count(&geometry.liquid), 10);
        // Stone below still shows its top face through the water
        assert_eq!(face_count(&geometry.opaque), 6);
    }

    #[test]
    fn test_winding_matches_normal() {
        let mut chunk = chunk();
        chunk.set_block(1, 1, 1, BlockKind::Grass);
        let vertices = mesh_pass(&chunk, &ChunkNeighbors::absent(), MeshPass::Opaque);
        for tri in vertices.chunks(3) {
            let a = Vec3::from_array(tri[0].position);
            let b = Vec3::from_array(tri[1].position);
            let c = Vec3::from_array(tri[2].position);
            let normal = (b - a).cross(c - a).normalize();
            assert_eq!(normal, Vec3::from_array(tri[0].normal));
        }
    }

    #[test]
    fn test_texture_coordinates_select_atlas_slot() {
        let mut chunk = chunk();
        chunk.set_block(1, 1, 1, BlockKind::Stone);
        let vertices = mesh_pass(&chunk, &ChunkNeighbors::absent(), MeshPass::Opaque);
        // Stone is slot 2 of 4
        for v in &vertices {
            assert!(v.tex_coords[0] >= 0.5 && v.tex_coords[0] <= 0.75);
        }
    }

    #[test]
    fn test_remesh_uploads_only_dirty_geometry() {
        let mut world = VoxelWorld::new(
            WorldConfig::default(),
            Box::new(FlatHeightField::new(0)),
            MemorySink::new(),
        );
        let chunk = world.create_or_get(0, 0);
        let (opaque, liquid) = (chunk.opaque_buffer(), chunk.liquid_buffer());
        assert_eq!(world.remesh_dirty(), 1);
        // Flat single layer, top faces plus the world floor plus four exposed sides
        let expected_faces = 2 * 256 + 4 * 16;
        assert_eq!(world.sink().buffer(opaque).unwrap().vertex_count(), expected_faces * 6);
        assert_eq!(world.sink().buffer(liquid).unwrap().uploads, 0);
        assert!(world.get(0, 0).unwrap().dirty().is_empty());

        world.get_mut(0, 0).unwrap().mark_dirty(DirtyFlags::LIQUID);
        assert_eq!(world.remesh_dirty(), 1);
        assert_eq!(world.sink().buffer(opaque).unwrap().uploads, 1);
        assert_eq!(world.sink().buffer(liquid).unwrap().uploads, 1);
        assert_eq!(world.remesh_dirty(), 0);
    }

    #[test]
    fn test_new_neighbor_hides_border_faces() {
        let mut world = VoxelWorld::new(
            WorldConfig::default(),
            Box::new(FlatHeightField::new(0)),
            MemorySink::new(),
        );
        let opaque = world.create_or_get(0, 0).opaque_buffer();
        world.remesh_dirty();
        let before = world.sink().buffer(opaque).unwrap().vertex_count();
        world.create_or_get(16, 0);
        world.remesh_dirty();
        let after = world.sink().buffer(opaque).unwrap().vertex_count();
        assert_eq!(before - after, 16 * 6);
        assert_eq!(world.get_block(IVec3::new(16, 0, 0)), BlockKind::Grass);
    }
}
