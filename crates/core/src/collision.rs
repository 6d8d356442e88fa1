//! Collision and transform rules
//!
//! Legality of a piece at a position, clockwise rotation, a simplified wall
//! kick, and merging a landed piece into the grid. Everything here is pure:
//! inputs are borrowed and results are returned as new values.

use crate::grid::Grid;
use crate::pieces::{Piece, PieceShape, MAX_SHAPE_SIZE};
use crate::types::{Cell, Position, GRID_HEIGHT, GRID_WIDTH};

/// Column offsets tried, in order, when rotating
///
/// Only horizontal shifts of one cell; there is no full kick table.
pub const WALL_KICK_OFFSETS: [i32; 3] = [0, -1, 1];

/// Check whether `piece` placed at `position` is illegal
///
/// A shape cell collides when it falls outside the side walls, below the floor,
/// or onto a filled cell. Cells above the top edge (negative rows) never collide
/// on their own, so pieces can spawn or move partly above the grid.
pub fn check_collision(grid: &Grid, piece: &Piece, position: Position) -> bool {
    piece.shape.cells().any(|(r, c)| {
        let row = position.row + r as i32;
        let col = position.col + c as i32;
        col < 0
            || col >= GRID_WIDTH as i32
            || row >= GRID_HEIGHT as i32
            || (row >= 0 && grid.is_occupied(row, col))
    })
}

/// Rotate a shape 90° clockwise
///
/// Old cell `(row, col)` moves to `(col, rows - 1 - row)`; a `rows x cols`
/// shape becomes `cols x rows`.
pub fn rotate(shape: &PieceShape) -> PieceShape {
    let rows = shape.rows();
    let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
    for (r, c) in shape.cells() {
        cells[c][rows - 1 - r] = true;
    }
    PieceShape::from_cells(shape.cols() as u8, rows as u8, cells)
}

/// Try to rotate a piece, shifting it one column left or right if needed
///
/// Returns the rotated piece and the first non-colliding position among the
/// current column, one to the left, and one to the right. Returns `None` when
/// all three collide; the caller keeps the piece unchanged.
pub fn rotate_with_wall_kick(grid: &Grid, piece: &Piece, position: Position) -> Option<(Piece, Position)> {
    let rotated = piece.with_shape(rotate(&piece.shape));

    WALL_KICK_OFFSETS
        .iter()
        .map(|&dc| position.offset(0, dc))
        .find(|&candidate| !check_collision(grid, &rotated, candidate))
        .map(|candidate| (rotated, candidate))
}

/// Write a piece into a copy of the grid
///
/// Shape cells that fall outside the grid (rows above the top edge while a
/// piece locks partly off-screen) are dropped; merging never fails.
pub fn merge(grid: &Grid, piece: &Piece, position: Position) -> Grid {
    let mut merged = grid.clone();
    for (r, c) in piece.shape.cells() {
        let row = position.row + r as i32;
        let col = position.col + c as i32;
        if merged.set(row, col, Cell::Filled(piece.color)).is_err() {
            log::trace!("dropping off-grid cell ({}, {}) of {:?}", row, col, piece.kind);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::get_shape;
    use crate::types::{Color, PieceKind};

    fn filled(color: Color) -> Cell {
        Cell::Filled(color)
    }

    #[test]
    fn test_rotate_t_clockwise() {
        // .#.      #.
        // ###  ->  ##
        //          #.
        let rotated = rotate(&get_shape(PieceKind::T));
        assert_eq!((rotated.rows(), rotated.cols()), (3, 2));
        let cells: Vec<_> = rotated.cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_rotate_i_swaps_dimensions() {
        let rotated = rotate(&get_shape(PieceKind::I));
        assert_eq!((rotated.rows(), rotated.cols()), (4, 1));
        assert_eq!(rotate(&rotated), get_shape(PieceKind::I));
    }

    #[test]
    fn test_rotate_o_is_fixed_point() {
        let o = get_shape(PieceKind::O);
        assert_eq!(rotate(&o), o);
    }

    #[test]
    fn test_negative_rows_do_not_collide() {
        let grid = Grid::empty();
        let piece = Piece::new(PieceKind::T);
        assert!(!check_collision(&grid, &piece, Position::new(-1, 3)));
        assert!(!check_collision(&grid, &piece, Position::new(-5, 3)));
    }

    #[test]
    fn test_walls_and_floor_collide() {
        let grid = Grid::empty();
        let piece = Piece::new(PieceKind::O);
        assert!(check_collision(&grid, &piece, Position::new(0, -1)));
        assert!(check_collision(&grid, &piece, Position::new(0, 9)));
        assert!(check_collision(&grid, &piece, Position::new(19, 0)));
        assert!(!check_collision(&grid, &piece, Position::new(18, 8)));
    }

    #[test]
    fn test_occupied_cell_collides_only_under_filled_shape_cells() {
        let mut grid = Grid::empty();
        grid.set(5, 3, filled(Color::Red)).unwrap();
        let piece = Piece::new(PieceKind::T);
        // T's top-left cell is empty, so (5, 3) is not covered
        assert!(!check_collision(&grid, &piece, Position::new(5, 3)));
        assert!(check_collision(&grid, &piece, Position::new(4, 3)));
    }

    #[test]
    fn test_wall_kick_shifts_left_at_right_wall() {
        let grid = Grid::empty();
        // Vertical I in the rightmost column: rotating back to horizontal
        // needs three columns of room to its right.
        let vertical = Piece::new(PieceKind::I).with_shape(rotate(&get_shape(PieceKind::I)));
        let at_wall = Position::new(5, 9);
        assert!(!check_collision(&grid, &vertical, at_wall));
        assert!(rotate_with_wall_kick(&grid, &vertical, at_wall).is_none());

        // T rotated upright at the right wall comes back with a left kick
        let upright = Piece::new(PieceKind::T).with_shape(rotate(&get_shape(PieceKind::T)));
        let (rotated, pos) = rotate_with_wall_kick(&grid, &upright, Position::new(5, 8)).unwrap();
        assert_eq!((rotated.shape.rows(), rotated.shape.cols()), (2, 3));
        assert_eq!(pos, Position::new(5, 7));
    }

    #[test]
    fn test_wall_kick_prefers_left_then_right() {
        let mut grid = Grid::empty();
        let upright = Piece::new(PieceKind::T).with_shape(rotate(&get_shape(PieceKind::T)));
        let (_, pos) = rotate_with_wall_kick(&grid, &upright, Position::new(5, 0)).unwrap();
        assert_eq!(pos, Position::new(5, 0));

        // In place blocked: shift left
        grid.set(6, 2, filled(Color::Blue)).unwrap();
        let (_, pos) = rotate_with_wall_kick(&grid, &upright, Position::new(5, 1)).unwrap();
        assert_eq!(pos, Position::new(5, 0));

        // In place and left blocked: shift right
        grid.set(5, 0, filled(Color::Blue)).unwrap();
        let (_, pos) = rotate_with_wall_kick(&grid, &upright, Position::new(5, 1)).unwrap();
        assert_eq!(pos, Position::new(5, 2));
    }

    #[test]
    fn test_merge_writes_piece_color() {
        let grid = Grid::empty();
        let piece = Piece::new(PieceKind::O);
        let merged = merge(&grid, &piece, Position::new(18, 0));

        for (row, col) in [(18, 0), (18, 1), (19, 0), (19, 1)] {
            assert_eq!(merged.cell_at(row, col), Ok(filled(Color::Yellow)));
        }
        assert_eq!(merged.occupied_count(), 4);
        assert_eq!(grid.occupied_count(), 0, "input grid is untouched");
    }

    #[test]
    fn test_merge_drops_cells_above_grid() {
        let grid = Grid::empty();
        let piece = Piece::new(PieceKind::O);
        let merged = merge(&grid, &piece, Position::new(-1, 4));
        assert_eq!(merged.occupied_count(), 2);
        assert!(merged.is_occupied(0, 4));
        assert!(merged.is_occupied(0, 5));
    }
}
