use std::fmt;
use std::str::FromStr;

use itertools::iproduct;
use thiserror::Error;

/// Number of ranks and files on the board.
pub const BOARD_SIZE: usize = 8;

/// Board field of the standard starting position.
pub const DEFAULT_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Lowercase occupant code, as used for the dark side.
    pub fn code(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Model file stem under the asset directory.
    pub fn model_name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }

    /// Case-insensitive lookup by occupant code.
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code.to_ascii_lowercase())
    }
}

/// Which side a piece belongs to. Only used to pick a shading tint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Uppercase codes, drawn with the light tint.
    White,
    /// Lowercase codes.
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// Decodes an occupant code; case selects the side.
    pub fn from_code(code: char) -> Option<Self> {
        let kind = PieceKind::from_code(code)?;
        let side = if code.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Self { kind, side })
    }

    pub fn code(self) -> char {
        match self.side {
            Side::White => self.kind.code().to_ascii_uppercase(),
            Side::Black => self.kind.code(),
        }
    }

    /// Whether the piece gets the light shading tint.
    pub fn is_light(self) -> bool {
        self.side == Side::White
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("more than 8 ranks")]
    TooManyRanks,
    #[error("expected 8 ranks, found {0}")]
    TooFewRanks(usize),
    #[error("rank {rank} overflows past column {column}")]
    RankOverflow { rank: usize, column: usize },
    #[error("rank {rank} only fills {columns} columns")]
    RankUnderfilled { rank: usize, columns: usize },
    #[error("unexpected character {ch:?} at offset {position}")]
    InvalidCharacter { ch: char, position: usize },
}

/// Fixed 8x8 board, row-major. Row 0 is the rank FEN lists first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Decodes the board field of a FEN string. Anything after the first space
    /// is ignored.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let mut grid = Self::empty();
        let (mut row, mut col) = (0usize, 0usize);

        for (position, ch) in fen.char_indices() {
            match ch {
                ' ' => break,
                '/' => {
                    if col < BOARD_SIZE {
                        return Err(BoardError::RankUnderfilled {
                            rank: row,
                            columns: col,
                        });
                    }
                    row += 1;
                    col = 0;
                    if row >= BOARD_SIZE {
                        return Err(BoardError::TooManyRanks);
                    }
                }
                '1'..='8' => {
                    let run = ch as usize - '0' as usize;
                    if col + run > BOARD_SIZE {
                        return Err(BoardError::RankOverflow {
                            rank: row,
                            column: col + run,
                        });
                    }
                    // cells are already empty
                    col += run;
                }
                _ => {
                    let piece = Piece::from_code(ch)
                        .ok_or(BoardError::InvalidCharacter { ch, position })?;
                    if col >= BOARD_SIZE {
                        return Err(BoardError::RankOverflow {
                            rank: row,
                            column: col + 1,
                        });
                    }
                    grid.cells[row][col] = Some(piece);
                    col += 1;
                }
            }
        }

        if col == 0 && row == 0 {
            return Err(BoardError::TooFewRanks(0));
        }
        if col < BOARD_SIZE {
            return Err(BoardError::RankUnderfilled {
                rank: row,
                columns: col,
            });
        }
        if row + 1 < BOARD_SIZE {
            return Err(BoardError::TooFewRanks(row + 1));
        }
        Ok(grid)
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, column: usize) -> Option<Piece> {
        self.cells.get(row)?.get(column).copied().flatten()
    }

    #[cfg(test)]
    pub fn set(&mut self, row: usize, column: usize, occupant: Option<Piece>) {
        self.cells[row][column] = occupant;
    }

    #[cfg(test)]
    pub fn rank(&self, row: usize) -> &[Option<Piece>; BOARD_SIZE] {
        &self.cells[row]
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Piece)> + '_ {
        iproduct!(0..BOARD_SIZE, 0..BOARD_SIZE)
            .filter_map(|(row, col)| self.cells[row][col].map(|piece| (row, col, piece)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

/// The standard starting arrangement.
impl Default for Grid {
    fn default() -> Self {
        let mut grid = Self::empty();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (col, kind) in back.into_iter().enumerate() {
            grid.cells[0][col] = Some(Piece::new(kind, Side::Black));
            grid.cells[1][col] = Some(Piece::new(PieceKind::Pawn, Side::Black));
            grid.cells[6][col] = Some(Piece::new(PieceKind::Pawn, Side::White));
            grid.cells[7][col] = Some(Piece::new(kind, Side::White));
        }
        grid
    }
}

impl FromStr for Grid {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

/// Writes the canonical FEN board field.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, rank) in self.cells.iter().enumerate() {
            if row > 0 {
                f.write_str("/")?;
            }
            let mut gap = 0;
            for cell in rank {
                match cell {
                    Some(piece) => {
                        if gap > 0 {
                            write!(f, "{gap}")?;
                            gap = 0;
                        }
                        write!(f, "{}", piece.code())?;
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                write!(f, "{gap}")?;
            }
        }
        Ok(())
    }
}
