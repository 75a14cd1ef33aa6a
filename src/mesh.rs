use glium::{index::PrimitiveType, Display, IndexBuffer, VertexBuffer};
use glutin::surface::WindowSurface;
use tracing::debug;

use crate::{
    error::Result,
    load::{MeshData, ObjVertex},
};

/// GPU-resident geometry for one model. Buffers are freed on drop.
pub struct GpuMesh {
    pub vertex_buffer: VertexBuffer<ObjVertex>,
    pub index_buffer: IndexBuffer<u32>,
}

impl GpuMesh {
    pub fn upload(display: &Display<WindowSurface>, data: &MeshData) -> Result<Self> {
        Ok(Self {
            vertex_buffer: VertexBuffer::new(display, &data.vertices)?,
            index_buffer: IndexBuffer::new(display, PrimitiveType::TrianglesList, &data.indices)?,
        })
    }
}

/// Non-owning handle into a [`MeshArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

/// Owns every loaded mesh for the lifetime of a session.
#[derive(Debug)]
pub struct MeshArena<M> {
    meshes: Vec<(String, M)>,
}

impl<M> Default for MeshArena<M> {
    fn default() -> Self {
        Self { meshes: Vec::new() }
    }
}

impl<M> MeshArena<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, mesh: M) -> MeshId {
        self.meshes.push((name.into(), mesh));
        MeshId(self.meshes.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&M> {
        self.meshes.get(id.0).map(|(_, mesh)| mesh)
    }

    pub fn name(&self, id: MeshId) -> Option<&str> {
        self.meshes.get(id.0).map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Drops every mesh and returns how many were released. Handles issued
    /// before this call no longer resolve.
    pub fn release_all(&mut self) -> usize {
        let released = self.meshes.len();
        for (name, mesh) in self.meshes.drain(..) {
            debug!(%name, "releasing mesh");
            drop(mesh);
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn handles_resolve_in_insertion_order() {
        let mut arena = MeshArena::new();
        let board = arena.insert("board", 1);
        let pawn = arena.insert("pawn", 2);
        assert_eq!(arena.get(board), Some(&1));
        assert_eq!(arena.get(pawn), Some(&2));
        assert_eq!(arena.name(pawn), Some("pawn"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn release_drops_each_mesh_once() {
        let drops = Rc::new(Cell::new(0));
        let mut arena = MeshArena::new();
        let id = arena.insert("a", Tracked(drops.clone()));
        arena.insert("b", Tracked(drops.clone()));

        assert_eq!(arena.release_all(), 2);
        assert_eq!(drops.get(), 2);
        assert!(arena.get(id).is_none());

        assert_eq!(arena.release_all(), 0);
        drop(arena);
        assert_eq!(drops.get(), 2);
    }
}
