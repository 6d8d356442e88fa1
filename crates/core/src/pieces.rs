//! Pieces module - the piece catalog
//!
//! Each of the seven kinds has a canonical occupancy matrix and a color.
//! Shapes are small fixed-capacity matrices (at most 4x4) stored inline, so
//! pieces are `Copy` and rotating one never allocates.

use rand::Rng;

use crate::types::{Color, PieceKind, Position, GRID_WIDTH};

/// Largest row/column count a shape can have
pub const MAX_SHAPE_SIZE: usize = 4;

/// Occupancy matrix of a piece in one orientation
///
/// Cells outside `rows x cols` are always empty, so two shapes compare equal
/// exactly when their dimensions and occupied cells match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    rows: u8,
    cols: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl PieceShape {
    /// Build a shape from a 0/1 matrix, ignoring entries outside `rows x cols`
    const fn from_matrix(rows: u8, cols: u8, matrix: [[u8; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE]) -> Self {
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut r = 0;
        while r < rows as usize {
            let mut c = 0;
            while c < cols as usize {
                cells[r][c] = matrix[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self { rows, cols, cells }
    }

    /// Build a shape from raw cells; callers keep cells outside `rows x cols` empty
    pub(crate) const fn from_cells(rows: u8, cols: u8, cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE]) -> Self {
        Self { rows, cols, cells }
    }

    /// Build a shape of the given dimensions from a predicate over `(row, col)`
    ///
    /// Returns `None` when either dimension is zero or larger than [`MAX_SHAPE_SIZE`].
    pub fn from_fn(rows: usize, cols: usize, mut filled: impl FnMut(usize, usize) -> bool) -> Option<Self> {
        if rows == 0 || cols == 0 || rows > MAX_SHAPE_SIZE || cols > MAX_SHAPE_SIZE {
            return None;
        }
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in cells.iter_mut().enumerate().take(rows) {
            for (c, cell) in row.iter_mut().enumerate().take(cols) {
                *cell = filled(r, c);
            }
        }
        Some(Self {
            rows: rows as u8,
            cols: cols as u8,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Whether `(row, col)` is occupied; false outside the shape
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols() && self.cells[row][col]
    }

    /// Offsets `(row, col)` of every occupied cell, row-major
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows()).flat_map(move |r| {
            (0..self.cols()).filter_map(move |c| self.cells[r][c].then_some((r, c)))
        })
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }
}

const I_SHAPE: PieceShape = PieceShape::from_matrix(
    1,
    4,
    [[1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const O_SHAPE: PieceShape = PieceShape::from_matrix(
    2,
    2,
    [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const T_SHAPE: PieceShape = PieceShape::from_matrix(
    2,
    3,
    [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const S_SHAPE: PieceShape = PieceShape::from_matrix(
    2,
    3,
    [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const Z_SHAPE: PieceShape = PieceShape::from_matrix(
    2,
    3,
    [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const J_SHAPE: PieceShape = PieceShape::from_matrix(
    2,
    3,
    [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const L_SHAPE: PieceShape = PieceShape::from_matrix(
    2,
    3,
    [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

/// Get the canonical (spawn) shape for a piece kind
pub fn get_shape(kind: PieceKind) -> PieceShape {
    match kind {
        PieceKind::I => I_SHAPE,
        PieceKind::O => O_SHAPE,
        PieceKind::T => T_SHAPE,
        PieceKind::S => S_SHAPE,
        PieceKind::Z => Z_SHAPE,
        PieceKind::J => J_SHAPE,
        PieceKind::L => L_SHAPE,
    }
}

/// A piece: its kind, current orientation and color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: PieceShape,
    pub color: Color,
}

impl Piece {
    /// Fresh piece of the given kind in its canonical orientation
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: get_shape(kind),
            color: kind.color(),
        }
    }

    /// Same piece with a different orientation
    pub fn with_shape(self, shape: PieceShape) -> Self {
        Self { shape, ..self }
    }
}

/// Draw a piece uniformly at random among the seven kinds
pub fn random_piece<R: Rng + ?Sized>(rng: &mut R) -> Piece {
    let kind = PieceKind::ALL[rng.gen_range(0..PieceKind::ALL.len())];
    Piece::new(kind)
}

/// Spawn anchor for a shape: top row, horizontally centered
pub fn spawn_position(shape: &PieceShape) -> Position {
    let col = (GRID_WIDTH - shape.cols()) / 2;
    Position::new(0, col as i32)
}
