use std::path::PathBuf;

use clap::Parser;

use crate::{
    board::{Grid, PieceKind, DEFAULT_FEN},
    camera::{CameraMode, DRAG_SPEED},
    error::{Result, ViewerError},
};

#[derive(Parser, Debug)]
#[command(name = "chessview", about = "Renders a chess position in 3D")]
pub struct Cli {
    /// Board to show, as a FEN string (fields after the board are ignored)
    #[arg(long, default_value = DEFAULT_FEN)]
    pub fen: String,

    /// Directory holding board.obj and the piece models
    #[arg(long, default_value = "res")]
    pub assets: PathBuf,

    /// Directory holding the GLSL sources
    #[arg(long, default_value = "shaders")]
    pub shaders: PathBuf,

    /// Spin the scene instead of orbiting by mouse drag, optionally at the given
    /// degrees per second
    #[arg(long, num_args = 0..=1, default_missing_value = "20", value_name = "DEG_PER_SEC")]
    pub turntable: Option<f32>,

    /// Draw this piece model (by letter, e.g. `p`) in every occupied cell
    #[arg(long, value_name = "CODE", value_parser = parse_piece_kind)]
    pub single_piece: Option<PieceKind>,

    #[arg(long, default_value_t = 640)]
    pub width: u32,

    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_piece_kind(s: &str) -> std::result::Result<PieceKind, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PieceKind::from_code(c).ok_or_else(|| format!("unknown piece {c:?}")),
        _ => Err("expected a single piece letter".to_owned()),
    }
}

/// Which mesh each occupied cell gets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PieceSelection {
    /// One mesh per piece kind.
    #[default]
    Typed,
    /// The same mesh everywhere.
    Uniform(PieceKind),
}

/// Everything a session needs to start.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub grid: Grid,
    pub assets_dir: PathBuf,
    pub shaders_dir: PathBuf,
    pub camera: CameraMode,
    pub pieces: PieceSelection,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: env!("CARGO_PKG_NAME").to_owned(),
            width: 640,
            height: 480,
            grid: Grid::default(),
            assets_dir: PathBuf::from("res"),
            shaders_dir: PathBuf::from("shaders"),
            camera: CameraMode::Orbit {
                drag_speed: DRAG_SPEED,
            },
            pieces: PieceSelection::Typed,
        }
    }
}

impl ViewerConfig {
    /// Builds a config from parsed arguments. The window title is the program
    /// name as invoked.
    pub fn from_cli(cli: Cli, title: String) -> Result<Self> {
        let grid = Grid::from_fen(&cli.fen).map_err(ViewerError::MalformedBoardString)?;
        let camera = match cli.turntable {
            Some(degrees_per_second) => CameraMode::Turntable { degrees_per_second },
            None => CameraMode::Orbit {
                drag_speed: DRAG_SPEED,
            },
        };
        let pieces = cli
            .single_piece
            .map_or(PieceSelection::Typed, PieceSelection::Uniform);

        Ok(Self {
            title,
            width: cli.width,
            height: cli.height,
            grid,
            assets_dir: cli.assets,
            shaders_dir: cli.shaders,
            camera,
            pieces,
        })
    }
}
