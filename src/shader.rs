use std::{
    fs,
    path::{Path, PathBuf},
};

use glium::{Display, Program};
use glutin::surface::WindowSurface;
use tracing::debug;

use crate::error::{Result, ViewerError};

pub const VERTEX_SHADER: &str = "default.vert.glsl";
pub const BOARD_FRAGMENT_SHADER: &str = "board.frag.glsl";
pub const PIECE_FRAGMENT_SHADER: &str = "piece.frag.glsl";

/// Vertex and fragment source files for one program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    pub fn new(dir: &Path, vertex: &str, fragment: &str) -> Self {
        Self {
            vertex: dir.join(vertex),
            fragment: dir.join(fragment),
        }
    }

    pub fn board(dir: &Path) -> Self {
        Self::new(dir, VERTEX_SHADER, BOARD_FRAGMENT_SHADER)
    }

    pub fn piece(dir: &Path) -> Self {
        Self::new(dir, VERTEX_SHADER, PIECE_FRAGMENT_SHADER)
    }

    /// Reads both stages from disk.
    pub fn read_sources(&self) -> Result<(String, String)> {
        Ok((read_source(&self.vertex)?, read_source(&self.fragment)?))
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ViewerError::ShaderSource {
        path: path.to_owned(),
        source,
    })
}

/// Compiles and links a program from a vertex/fragment source file pair.
pub fn load_program(display: &Display<WindowSurface>, paths: &ShaderPaths) -> Result<Program> {
    let (vertex, fragment) = paths.read_sources()?;
    let program = Program::from_source(display, &vertex, &fragment, None).map_err(|source| {
        ViewerError::ProgramLink {
            vertex: paths.vertex.clone(),
            fragment: paths.fragment.clone(),
            source,
        }
    })?;
    debug!(
        vertex = %paths.vertex.display(),
        fragment = %paths.fragment.display(),
        "linked program"
    );
    Ok(program)
}
