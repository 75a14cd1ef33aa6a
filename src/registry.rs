use rustc_hash::FxHashMap;

use crate::{board::PieceKind, mesh::MeshId};

/// Maps each piece kind to the mesh drawn for it. Both sides share a mesh.
#[derive(Debug, Default, Clone)]
pub struct PieceRegistry {
    meshes: FxHashMap<PieceKind, MeshId>,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every kind draws the same mesh.
    pub fn uniform(mesh: MeshId) -> Self {
        let mut registry = Self::new();
        for kind in PieceKind::ALL {
            registry.register(kind, mesh);
        }
        registry
    }

    pub fn register(&mut self, kind: PieceKind, mesh: MeshId) {
        self.meshes.insert(kind, mesh);
    }

    pub fn lookup(&self, kind: PieceKind) -> Option<MeshId> {
        self.meshes.get(&kind).copied()
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshArena;

    #[test]
    fn uniform_registry_covers_every_kind() {
        let mut arena = MeshArena::new();
        let pawn = arena.insert("pawn", ());
        let registry = PieceRegistry::uniform(pawn);
        for kind in PieceKind::ALL {
            assert_eq!(registry.lookup(kind), Some(pawn));
        }
    }

    #[test]
    fn unregistered_kind_is_none() {
        let mut arena = MeshArena::new();
        let mut registry = PieceRegistry::new();
        registry.register(PieceKind::Rook, arena.insert("rook", ()));
        assert!(registry.lookup(PieceKind::Rook).is_some());
        assert_eq!(registry.lookup(PieceKind::Queen), None);

        registry.clear();
        assert_eq!(registry.lookup(PieceKind::Rook), None);
    }
}
