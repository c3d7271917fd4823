//! Bipartite assignment solvers used by the lineup optimizer.
//!
//! Rows are slot instances, columns are players. `weights[r][c]` is
//! `Some(points)` when player `c` may fill slot instance `r`, `None` when the
//! pair is forbidden.

use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;

/// Points are matched as integers in micro-points.
const SCALE: f64 = 1_000_000.0;

/// Weight of a forbidden pair. Every row has a zero-weight empty column, so
/// a forbidden pair is never worth taking.
const FORBIDDEN: i64 = -(1 << 50);

fn scaled(points: f64) -> i64 {
    (points * SCALE).round() as i64
}

/// Rows × (columns + one empty column per row), built from `cell`.
///
/// The padding keeps rows ≤ columns, which the solver requires, and gives
/// every row a finite option.
fn padded(rows: usize, cols: usize, cell: impl Fn(usize, usize) -> i64) -> Matrix<i64> {
    Matrix::from_fn(rows, cols + rows, |(r, c)| if c < cols { cell(r, c) } else { 0 })
}

/// Maximum-weight assignment where every row may also stay empty.
///
/// Solved with Kuhn-Munkres on the padded matrix. A row lands on its empty
/// column when every candidate left for it is forbidden or scores below
/// zero. The solver is deterministic, so equal inputs give equal output.
///
/// Returns, per row, the index of the assigned column or `None` if the row
/// is better left empty.
pub fn max_weight_assignment(weights: &[Vec<Option<f64>>], cols: usize) -> Vec<Option<usize>> {
    let rows = weights.len();
    if rows == 0 {
        return Vec::new();
    }

    let matrix = padded(rows, cols, |r, c| match weights[r].get(c).copied().flatten() {
        Some(points) => scaled(points),
        None => FORBIDDEN,
    });
    let (_, assignment) = kuhn_munkres(&matrix);

    assignment
        .into_iter()
        .enumerate()
        .map(|(r, c)| (c < cols && weights[r].get(c).copied().flatten().is_some()).then_some(c))
        .collect()
}

/// Size of the largest matching that ignores weights.
///
/// Used to tell "left empty because nobody eligible remains" apart from
/// "left empty because every remaining candidate scores below zero".
pub fn max_cardinality(weights: &[Vec<Option<f64>>], cols: usize) -> usize {
    let rows = weights.len();
    if rows == 0 {
        return 0;
    }

    let matrix = padded(rows, cols, |r, c| {
        i64::from(weights[r].get(c).copied().flatten().is_some())
    });
    let (matched, _) = kuhn_munkres(&matrix);
    usize::try_from(matched).unwrap_or(0)
}
