use std::path::Path;

use glium::Display;
use glutin::surface::WindowSurface;
use tracing::{debug, info};

use crate::{
    board::{Grid, PieceKind},
    camera::State,
    config::{PieceSelection, ViewerConfig},
    error::{Result, ViewerError},
    frame::{self, Application, FramePlan},
    load,
    mesh::{GpuMesh, MeshArena, MeshId},
    registry::PieceRegistry,
    shader::{self, ShaderPaths},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
    ShuttingDown,
}

/// Meshes, the board handle, and the piece registry pointing into them.
#[derive(Debug)]
pub struct SceneAssets<M> {
    meshes: MeshArena<M>,
    registry: PieceRegistry,
    board: MeshId,
}

impl<M> SceneAssets<M> {
    /// Loads the board and the piece meshes `selection` needs through `load`,
    /// which receives the model name (e.g. `"pawn"`).
    pub fn build(
        selection: PieceSelection,
        mut load: impl FnMut(&str) -> Result<M>,
    ) -> Result<Self> {
        let mut meshes = MeshArena::new();
        let board = meshes.insert("board", load("board")?);

        let registry = match selection {
            PieceSelection::Typed => {
                let mut registry = PieceRegistry::new();
                for kind in PieceKind::ALL {
                    let name = kind.model_name();
                    registry.register(kind, meshes.insert(name, load(name)?));
                }
                registry
            }
            PieceSelection::Uniform(kind) => {
                let name = kind.model_name();
                PieceRegistry::uniform(meshes.insert(name, load(name)?))
            }
        };

        Ok(Self {
            meshes,
            registry,
            board,
        })
    }

    pub fn meshes(&self) -> &MeshArena<M> {
        &self.meshes
    }

    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    pub fn board(&self) -> MeshId {
        self.board
    }

    /// Drops the registry and every mesh. Returns the number of meshes
    /// released; a second call releases nothing.
    pub fn release(&mut self) -> usize {
        self.registry.clear();
        let released = self.meshes.release_all();
        debug_assert!(self.meshes.is_empty());
        released
    }
}

/// Path of a model under the asset directory.
pub fn model_path(assets_dir: &Path, name: &str) -> std::path::PathBuf {
    assets_dir.join(format!("{name}.obj"))
}

/// Owns every resource of a running viewer: the draw programs `P`, the meshes
/// `M`, the camera and the board.
pub struct Session<P = Application, M = GpuMesh> {
    phase: Phase,
    grid: Grid,
    camera: State,
    assets: SceneAssets<M>,
    app: Option<P>,
}

impl Session {
    pub fn new(facade: &Display<WindowSurface>, config: &ViewerConfig) -> Result<Self> {
        debug!(phase = ?Phase::Initializing, "session starting");
        let vendor = facade.get_opengl_vendor_string();
        let renderer = facade.get_opengl_renderer_string();
        let version = facade.get_opengl_version_string();
        let glsl = facade.get_supported_glsl_version();
        info!(vendor, renderer, version, glsl = ?glsl, "GL context");

        let board_program = shader::load_program(facade, &ShaderPaths::board(&config.shaders_dir))?;
        let piece_program = shader::load_program(facade, &ShaderPaths::piece(&config.shaders_dir))?;

        let assets = SceneAssets::build(config.pieces, |name| {
            let data = load::load_obj(&model_path(&config.assets_dir, name))?;
            GpuMesh::upload(facade, &data)
        })?;

        let (width, height) = facade.get_framebuffer_dimensions();
        Self::from_parts(
            config,
            (width, height),
            Application::new(board_program, piece_program),
            assets,
        )
    }

    /// Updates the camera, draws the board then the pieces, and presents.
    pub fn frame(&mut self, facade: &Display<WindowSurface>, drag_dx: f32, dt: f32) -> Result<()> {
        let Some(plan) = self.plan(drag_dx, dt)? else {
            return Ok(());
        };
        let Some(app) = self.app.as_ref() else {
            return Ok(());
        };

        let mut target = facade.draw();
        let drawn = app.draw_frame(&mut target, &plan, self.assets.meshes());
        // the frame must be finished even when a draw failed
        let presented = target.finish();
        drawn?;
        presented?;
        Ok(())
    }
}

impl<P, M> Session<P, M> {
    /// Assembles a running session from already-created resources. Fails if
    /// the board holds a piece the assets have no mesh for.
    pub fn from_parts(
        config: &ViewerConfig,
        (width, height): (u32, u32),
        app: P,
        assets: SceneAssets<M>,
    ) -> Result<Self> {
        // fail at startup rather than on the first frame
        for (_, _, piece) in config.grid.occupied() {
            assets
                .registry()
                .lookup(piece.kind)
                .ok_or(ViewerError::MissingMesh(piece.kind))?;
        }

        info!(
            board = %config.grid,
            pieces = config.grid.occupied_count(),
            meshes = assets.meshes().len(),
            "scene ready"
        );

        Ok(Self {
            phase: Phase::Running,
            grid: config.grid,
            camera: State::new(config.camera, width, height),
            assets,
            app: Some(app),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// Advances the camera and builds this frame's draw list. Returns `None`
    /// once the session has shut down.
    pub fn plan(&mut self, drag_dx: f32, dt: f32) -> Result<Option<FramePlan>> {
        if self.phase != Phase::Running {
            return Ok(None);
        }
        self.camera.update(drag_dx, dt);
        frame::plan_frame(
            &self.grid,
            self.assets.registry(),
            self.assets.board(),
            &self.camera,
        )
        .map(Some)
    }

    /// Releases programs and meshes. Safe to call more than once; only the
    /// first call releases anything.
    pub fn shutdown(&mut self) -> usize {
        if self.phase == Phase::ShuttingDown {
            return 0;
        }
        self.phase = Phase::ShuttingDown;
        drop(self.app.take());
        let released = self.assets.release();
        debug!(released, "session shut down");
        released
    }
}

impl<P, M> Drop for Session<P, M> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
