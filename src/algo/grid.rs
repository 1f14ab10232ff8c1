//! Quarter turns of a 3×3 vertex grid.
//!
//! A rectangular quadblock is a 3×3 grid of vertices. Sorting the vertices by
//! `(y, x)` gives row-major order, after which a quarter turn is a fixed
//! permutation of the nine slots.

use nalgebra::Point3;

use crate::error::{Result, VertexError};
use crate::mesh::PointSource;

use super::rotate::Turn;

/// Number of vertices in a 3×3 grid.
pub const GRID_VERTICES: usize = 9;

const CLOCKWISE: [usize; GRID_VERTICES] = [6, 3, 0, 7, 4, 1, 8, 5, 2];
const COUNTER_CLOCKWISE: [usize; GRID_VERTICES] = [2, 5, 8, 1, 4, 7, 0, 3, 6];

fn table(turn: Turn) -> &'static [usize; GRID_VERTICES] {
    match turn {
        Turn::Clockwise => &CLOCKWISE,
        Turn::CounterClockwise => &COUNTER_CLOCKWISE,
    }
}

/// Indices of the first nine points in `(y, x)` order.
///
/// # Errors
///
/// Returns [`VertexError::NotEnoughVertices`] if there are fewer than nine.
pub fn grid_order(points: &[Point3<f64>]) -> Result<[usize; GRID_VERTICES]> {
    if points.len() < GRID_VERTICES {
        return Err(VertexError::NotEnoughVertices {
            required: GRID_VERTICES,
            found: points.len(),
        });
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .y
            .total_cmp(&points[b].y)
            .then(points[a].x.total_cmp(&points[b].x))
    });

    let mut grid = [0; GRID_VERTICES];
    grid.copy_from_slice(&order[..GRID_VERTICES]);
    Ok(grid)
}

/// Compute the new positions of a quarter turn of the grid.
///
/// Returns `(index, new_position)` pairs in row-major grid order. Points beyond
/// the first nine (in `(y, x)` order) are not part of the grid and are left
/// out.
///
/// # Example
///
/// ```
/// use trackverts::algo::grid::rotate_grid;
/// use trackverts::algo::rotate::Turn;
/// use nalgebra::Point3;
///
/// let mut points = Vec::new();
/// for j in 0..3 {
///     for i in 0..3 {
///         points.push(Point3::new(i as f64, j as f64, 0.0));
///     }
/// }
/// let moves = rotate_grid(&points, Turn::Clockwise).unwrap();
/// // The centre stays put
/// assert_eq!(moves[4], (4, Point3::new(1.0, 1.0, 0.0)));
/// ```
pub fn rotate_grid(points: &[Point3<f64>], turn: Turn) -> Result<Vec<(usize, Point3<f64>)>> {
    let grid = grid_order(points)?;
    let table = table(turn);
    Ok(grid
        .iter()
        .zip(table.iter())
        .map(|(&index, &from)| (index, points[grid[from]]))
        .collect())
}

/// Rotate the grid of `source` by a quarter turn and write the result back.
///
/// Returns the applied `(index, position)` pairs.
pub fn apply_grid_rotation<S: PointSource + ?Sized>(
    source: &mut S,
    turn: Turn,
) -> Result<Vec<(usize, Point3<f64>)>> {
    let moves = rotate_grid(&source.positions(), turn)?;
    for &(index, position) in &moves {
        source.set_position(index, position)?;
    }
    log::debug!("grid turn {:?} on '{}'", turn, source.name());
    Ok(moves)
}
