use glam::{Mat4, Vec3};
use glium::{uniform, DrawParameters, Frame, Program, Surface};
use tracing::trace;

use crate::{
    board::Grid,
    camera::State,
    error::{Result, ViewerError},
    mesh::{GpuMesh, MeshArena, MeshId},
    registry::PieceRegistry,
    scene,
};

const CLEAR_COLOR: (f32, f32, f32, f32) = (0.93, 0.93, 0.93, 1.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Board,
    Pieces,
}

impl Pass {
    /// Name reported when a draw in this pass fails.
    pub fn call_site(self) -> &'static str {
        match self {
            Pass::Board => "board pass",
            Pass::Pieces => "piece pass",
        }
    }
}

/// One draw call with the per-draw uniforms it needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub pass: Pass,
    pub mesh: MeshId,
    pub model: Mat4,
    /// Tint flag; only set in the piece pass.
    pub white: Option<bool>,
}

/// Everything one frame draws, in submission order.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub projection: Mat4,
    pub view: Mat4,
    pub view_pos: Vec3,
    pub commands: Vec<DrawCommand>,
}

impl FramePlan {
    pub fn piece_draws(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.pass == Pass::Pieces)
    }
}

/// Builds the ordered draw list: the board once, then one draw per occupied
/// cell in row-major order.
pub fn plan_frame(
    grid: &Grid,
    registry: &PieceRegistry,
    board_mesh: MeshId,
    camera: &State,
) -> Result<FramePlan> {
    let scene_model = camera.get_scene_model();
    let mut commands = Vec::with_capacity(1 + grid.occupied_count());

    commands.push(DrawCommand {
        pass: Pass::Board,
        mesh: board_mesh,
        model: scene_model,
        white: None,
    });

    for instance in scene::compose(grid) {
        let mesh = registry
            .lookup(instance.piece.kind)
            .ok_or(ViewerError::MissingMesh(instance.piece.kind))?;
        commands.push(DrawCommand {
            pass: Pass::Pieces,
            mesh,
            model: scene_model * instance.transform,
            white: Some(instance.piece.is_light()),
        });
    }

    Ok(FramePlan {
        projection: camera.get_perspective(),
        view: camera.get_view(),
        view_pos: camera.eye_position(),
        commands,
    })
}

/// Owns the two programs and fixed draw state; submits frame plans.
pub struct Application {
    params: DrawParameters<'static>,
    board_program: Program,
    piece_program: Program,
}

impl Application {
    pub fn new(board_program: Program, piece_program: Program) -> Self {
        Self {
            params: glium::DrawParameters {
                depth: glium::Depth {
                    test: glium::DepthTest::IfLess,
                    write: true,
                    ..Default::default()
                },
                blend: glium::Blend::alpha_blending(),
                polygon_mode: glium::PolygonMode::Fill,
                ..Default::default()
            },
            board_program,
            piece_program,
        }
    }

    fn program(&self, pass: Pass) -> &Program {
        match pass {
            Pass::Board => &self.board_program,
            Pass::Pieces => &self.piece_program,
        }
    }

    pub fn draw_frame(
        &self,
        target: &mut Frame,
        plan: &FramePlan,
        meshes: &MeshArena<GpuMesh>,
    ) -> Result<()> {
        target.clear_color_and_depth(CLEAR_COLOR, 1.0);

        let projection = plan.projection.to_cols_array_2d();
        let view = plan.view.to_cols_array_2d();
        let view_pos = plan.view_pos.to_array();

        for command in &plan.commands {
            let mesh = meshes
                .get(command.mesh)
                .ok_or(ViewerError::StaleMesh(command.mesh))?;
            trace!(
                pass = ?command.pass,
                mesh = meshes.name(command.mesh).unwrap_or_default(),
                "draw"
            );
            let uniforms = uniform! {
                projection: projection,
                view: view,
                model: command.model.to_cols_array_2d(),
                viewPos: view_pos,
                white: command.white.unwrap_or(false),
            };
            target
                .draw(
                    &mesh.vertex_buffer,
                    &mesh.index_buffer,
                    self.program(command.pass),
                    &uniforms,
                    &self.params,
                )
                .map_err(|source| ViewerError::Render {
                    call_site: command.pass.call_site(),
                    source,
                })?;
        }

        trace!(
            draws = plan.commands.len(),
            pieces = plan.piece_draws().count(),
            "frame submitted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use itertools::iproduct;
    use rand::Rng;

    use super::*;
    use crate::{
        board::{Piece, PieceKind, Side, BOARD_SIZE},
        camera::CameraMode,
    };

    struct Fixture {
        board: MeshId,
        registry: PieceRegistry,
        camera: State,
    }

    fn fixture() -> Fixture {
        let mut arena = MeshArena::new();
        let board = arena.insert("board", ());
        let mut registry = PieceRegistry::new();
        for kind in PieceKind::ALL {
            registry.register(kind, arena.insert(kind.model_name(), ()));
        }
        Fixture {
            board,
            registry,
            camera: State::new(CameraMode::default(), 640, 480),
        }
    }

    fn random_grid(rng: &mut impl Rng) -> Grid {
        let mut grid = Grid::empty();
        for (row, col) in iproduct!(0..BOARD_SIZE, 0..BOARD_SIZE) {
            if rng.gen_bool(0.3) {
                let kind = PieceKind::ALL[rng.gen_range(0..PieceKind::ALL.len())];
                let side = if rng.gen() { Side::White } else { Side::Black };
                grid.set(row, col, Some(Piece::new(kind, side)));
            }
        }
        grid
    }

    #[test]
    fn board_is_drawn_first_and_once() {
        let f = fixture();
        let plan = plan_frame(&Grid::default(), &f.registry, f.board, &f.camera).unwrap();
        assert_eq!(plan.commands[0].pass, Pass::Board);
        assert_eq!(plan.commands[0].mesh, f.board);
        assert_eq!(plan.commands[0].white, None);
        assert_eq!(
            plan.commands.iter().filter(|c| c.pass == Pass::Board).count(),
            1
        );
        assert!(plan.commands[1..].iter().all(|c| c.pass == Pass::Pieces));
    }

    #[test]
    fn piece_draws_match_occupied_cells() {
        let f = fixture();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let grid = random_grid(&mut rng);
            let plan = plan_frame(&grid, &f.registry, f.board, &f.camera).unwrap();
            assert_eq!(plan.piece_draws().count(), grid.occupied_count());
            assert_eq!(plan.commands.len(), grid.occupied_count() + 1);
        }
    }

    #[test]
    fn empty_board_draws_only_the_board() {
        let f = fixture();
        let plan = plan_frame(&Grid::empty(), &f.registry, f.board, &f.camera).unwrap();
        assert_eq!(plan.commands.len(), 1);
    }

    #[test]
    fn tint_and_mesh_follow_the_occupant() {
        let f = fixture();
        let grid = Grid::from_fen("8/8/8/8/8/8/8/qQ6").unwrap();
        let plan = plan_frame(&grid, &f.registry, f.board, &f.camera).unwrap();
        let draws: Vec<_> = plan.piece_draws().collect();
        let queen = f.registry.lookup(PieceKind::Queen).unwrap();
        assert_eq!(draws[0].mesh, queen);
        assert_eq!(draws[1].mesh, queen);
        assert_eq!(draws[0].white, Some(false));
        assert_eq!(draws[1].white, Some(true));
        assert_eq!(draws[1].model, scene::cell_transform(7, 1));
    }

    #[test]
    fn turntable_spins_board_and_pieces_together() {
        let mut f = fixture();
        f.camera = State::new(
            CameraMode::Turntable {
                degrees_per_second: 90.0,
            },
            640,
            480,
        );
        f.camera.update(0.0, 1.0);
        let plan = plan_frame(&Grid::default(), &f.registry, f.board, &f.camera).unwrap();
        let spin = f.camera.get_scene_model();
        assert_eq!(plan.commands[0].model, spin);
        assert_eq!(plan.commands[1].model, spin * scene::cell_transform(0, 0));
    }

    #[test]
    fn missing_registry_entry_is_reported() {
        let f = fixture();
        let registry = PieceRegistry::new();
        let err = plan_frame(&Grid::default(), &registry, f.board, &f.camera).unwrap_err();
        assert!(matches!(err, ViewerError::MissingMesh(PieceKind::Rook)));
    }

    #[test]
    fn call_sites_name_the_pass() {
        assert_eq!(Pass::Board.call_site(), "board pass");
        assert_eq!(Pass::Pieces.call_site(), "piece pass");
    }
}
