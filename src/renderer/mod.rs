//! Interface to the rendering backend. The world only ever creates buffers and
//! uploads geometry into them; drawing happens in the render pass.
use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use log::{trace, warn};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Opaque,
    Liquid,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

pub trait MeshSink {
    fn create_buffer(&mut self, kind: BufferKind) -> BufferHandle;
    /// Replaces the buffer contents
    fn upload(&mut self, handle: BufferHandle, vertices: &[Vertex]);
    fn draw(&mut self, handle: BufferHandle);
    fn delete(&mut self, handle: BufferHandle);
}

#[derive(Debug)]
pub struct MemoryBuffer {
    pub kind: BufferKind,
    pub vertices: Vec<Vertex>,
    pub uploads: usize,
    pub draws: usize,
}

impl MemoryBuffer {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Raw vertex data, laid out exactly as a GPU vertex buffer expects it
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// CPU side sink used for headless runs and tests. Keeps a copy of every upload.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffers: HashMap<BufferHandle, MemoryBuffer>,
    next_id: u32,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        Self::default()
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&MemoryBuffer> {
        self.buffers.get(&handle)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn total_vertices(&self) -> usize {
        self.buffers.values().map(|b| b.vertex_count()).sum()
    }
}

impl MeshSink for MemorySink {
    fn create_buffer(&mut self, kind: BufferKind) -> BufferHandle {
        let handle = BufferHandle(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            handle,
            MemoryBuffer {
                kind,
                vertices: Vec::new(),
                uploads: 0,
                draws: 0,
            },
        );
        handle
    }

    fn upload(&mut self, handle: BufferHandle, vertices: &[Vertex]) {
        let Some(buffer) = self.buffers.get_mut(&handle) else {
            debug_assert!(false, "Upload to deleted buffer {handle:?}");
            warn!("Upload to unknown buffer {handle:?}");
            return;
        };
        buffer.vertices.clear();
        buffer.vertices.extend_from_slice(vertices);
        buffer.uploads += 1;
        trace!("Uploaded {} vertices to {handle:?}", vertices.len());
    }

    fn draw(&mut self, handle: BufferHandle) {
        if let Some(buffer) = self.buffers.get_mut(&handle) {
            buffer.draws += 1;
        }
    }

    fn delete(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle);
    }
}
