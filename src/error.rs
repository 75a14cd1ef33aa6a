use std::path::PathBuf;

use thiserror::Error;

use crate::{
    board::{BoardError, PieceKind},
    mesh::MeshId,
};

/// Everything that can stop the viewer, at setup or while rendering.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Window, context or GL loading failed while building the display.
    #[error("failed to set up {stage}: {message}")]
    Setup {
        stage: &'static str,
        message: String,
    },

    #[error("failed to read shader source {}: {source}", path.display())]
    ShaderSource {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to build shader program from {} + {}: {source}", vertex.display(), fragment.display())]
    ProgramLink {
        vertex: PathBuf,
        fragment: PathBuf,
        source: glium::program::ProgramCreationError,
    },

    #[error("failed to open model {}: {source}", path.display())]
    ObjRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model {}: {source}", path.display())]
    ObjParse {
        path: PathBuf,
        source: obj::ObjError,
    },

    #[error("model {} references vertex {index} but only has {count}", path.display())]
    ObjIndex {
        path: PathBuf,
        index: usize,
        count: usize,
    },

    #[error("failed to upload vertices: {0}")]
    VertexUpload(#[from] glium::vertex::BufferCreationError),

    #[error("failed to upload indices: {0}")]
    IndexUpload(#[from] glium::index::BufferCreationError),

    #[error("no mesh registered for {0:?}")]
    MissingMesh(PieceKind),

    #[error("mesh handle {0:?} no longer resolves")]
    StaleMesh(MeshId),

    #[error("malformed board string: {0}")]
    MalformedBoardString(#[from] BoardError),

    /// A draw call failed; the frame cannot continue.
    #[error("draw failed in {call_site}: {source}")]
    Render {
        call_site: &'static str,
        source: glium::DrawError,
    },

    #[error("failed to present frame: {0}")]
    Present(#[from] glium::SwapBuffersError),
}

impl ViewerError {
    /// Fatal errors raised after the first frame started, as opposed to setup
    /// failures.
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::Render { .. } | Self::Present(_))
    }
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;

/// Runs a setup step whose backend reports failure by panicking and turns the
/// panic into [`ViewerError::Setup`].
pub fn catch_setup<T>(stage: &'static str, step: impl FnOnce() -> T) -> Result<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(step)).map_err(|payload| {
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_owned()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_owned()
        };
        ViewerError::Setup { stage, message }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_errors_are_not_render_failures() {
        let err = ViewerError::from(BoardError::TooManyRanks);
        assert!(!err.is_render_failure());
        assert!(err.to_string().starts_with("malformed board string"));
    }

    #[test]
    fn setup_panics_become_setup_errors() {
        let err = catch_setup("display", || -> u32 { panic!("no GL context") }).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Setup { stage: "display", ref message } if message == "no GL context"
        ));
        assert!(!err.is_render_failure());

        let err = catch_setup("display", || -> u32 { panic!("code {}", 7) }).unwrap_err();
        assert_eq!(err.to_string(), "failed to set up display: code 7");
    }

    #[test]
    fn successful_setup_passes_through() {
        assert_eq!(catch_setup("display", || 3).unwrap(), 3);
    }

    #[test]
    fn present_errors_are_render_failures() {
        let err = ViewerError::from(glium::SwapBuffersError::ContextLost);
        assert!(err.is_render_failure());
    }
}
