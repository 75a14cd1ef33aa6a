use glam::{Mat4, Vec3};

use crate::board::{Grid, Piece};

/// World-space distance between neighbouring cell centres.
pub const BOARD_STEP: f32 = 6.0;
/// World-space x/z of the centre of cell (0, 0).
pub const BOARD_TOP: f32 = -21.0;

/// One piece to draw, placed on its cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceInstance {
    pub row: usize,
    pub column: usize,
    pub transform: Mat4,
    pub piece: Piece,
}

/// Placement of the centre of a cell relative to the board origin.
pub fn cell_transform(row: usize, column: usize) -> Mat4 {
    #[allow(clippy::cast_precision_loss)]
    let (row, column) = (row as f32, column as f32);
    Mat4::from_translation(Vec3::new(
        BOARD_TOP + column * BOARD_STEP,
        0.0,
        BOARD_TOP + row * BOARD_STEP,
    ))
}

/// Walks the grid in row-major order and yields an instance for every
/// occupied cell. Empty cells produce nothing.
pub fn compose(grid: &Grid) -> impl Iterator<Item = PieceInstance> + '_ {
    grid.occupied().map(|(row, column, piece)| PieceInstance {
        row,
        column,
        transform: cell_transform(row, column),
        piece,
    })
}
