use ndarray::Array2;

use super::metric::{Metric, check_dimensions};

/// Result of aligning two sequences.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    /// Sum of point costs along the warping path.
    pub distance: f64,
    /// Warping path as `(index_a, index_b)` pairs, ascending in both indices.
    pub path: Vec<(usize, usize)>,
    /// `distance / max(len_a, len_b)`, comparable across sequence lengths.
    pub normalized_distance: f64,
}

impl Alignment {
    /// Sentinel for sequences that cannot be compared (one of them is empty).
    pub fn incomparable() -> Self {
        Self {
            distance: f64::INFINITY,
            path: Vec::new(),
            normalized_distance: f64::INFINITY,
        }
    }

    /// Returns `true` when this alignment is the empty-input sentinel.
    pub fn is_incomparable(&self) -> bool {
        self.path.is_empty()
    }

    /// Build an alignment from a filled `(n + 1) x (m + 1)` cost table.
    pub(crate) fn from_cost(cost: &Array2<f64>) -> Self {
        let n = cost.nrows() - 1;
        let m = cost.ncols() - 1;
        let distance = cost[(n, m)];
        Self {
            distance,
            path: backtrack(cost),
            normalized_distance: distance / n.max(m) as f64,
        }
    }
}

/// Compute Dynamic Time Warping between two scalar series.
///
/// The point cost is the absolute difference. An empty input on either side
/// yields [`Alignment::incomparable`] (infinite distance, empty path).
///
/// # Example
/// ```
/// use sensei::align::dtw;
///
/// let result = dtw(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
/// assert_eq!(result.distance, 0.0);
/// assert_eq!(result.path, vec![(0, 0), (1, 1), (2, 2)]);
/// ```
pub fn dtw(a: &[f64], b: &[f64]) -> Alignment {
    dtw_with(a.len(), b.len(), |i, j| (a[i] - b[j]).abs())
}

/// Normalized DTW distance between two scalar series, without keeping the path.
pub fn dtw_distance(a: &[f64], b: &[f64]) -> f64 {
    dtw(a, b).normalized_distance
}

/// Compute Dynamic Time Warping between two vector series.
///
/// Each row of `a` and `b` is one frame. Both series must have the same
/// number of columns, otherwise [`crate::Error::DimensionMismatch`] is returned.
/// A series without frames yields [`Alignment::incomparable`].
///
/// # Example
/// ```
/// use sensei::align::{Metric, dtw_vectors};
/// use ndarray::array;
///
/// let a = array![[0.0, 0.0], [3.0, 4.0]];
/// let b = array![[0.0, 0.0], [3.0, 4.0], [3.0, 4.0]];
/// let result = dtw_vectors(&a, &b, Metric::Euclidean).unwrap();
/// assert_eq!(result.distance, 0.0);
/// ```
pub fn dtw_vectors(a: &Array2<f64>, b: &Array2<f64>, metric: Metric) -> crate::Result<Alignment> {
    if a.nrows() == 0 || b.nrows() == 0 {
        return Ok(Alignment::incomparable());
    }
    check_dimensions(a, b)?;
    Ok(dtw_with(a.nrows(), b.nrows(), |i, j| {
        metric.distance(a.row(i), b.row(j))
    }))
}

/// Dynamic Time Warping over index spaces of size `n` and `m`.
///
/// `point_cost(i, j)` returns the local cost of matching element `i` of the
/// first sequence with element `j` of the second. This is the single DP used
/// by every scalar and vector entry point.
pub fn dtw_with<F>(n: usize, m: usize, point_cost: F) -> Alignment
where
    F: FnMut(usize, usize) -> f64,
{
    if n == 0 || m == 0 {
        return Alignment::incomparable();
    }
    let cost = accumulate(n, m, point_cost, |_, _| true);
    Alignment::from_cost(&cost)
}

/// Fill the accumulated cost table.
///
/// The table is `(n + 1) x (m + 1)` with `cost[0][0] = 0` and every other
/// cell `+inf`. Cell `(i, j)` for `i, j >= 1` holds the cost of matching
/// element `i - 1` with `j - 1` plus the cheapest predecessor. Cells for which
/// `in_window(i - 1, j - 1)` is false are skipped and stay infinite.
pub(crate) fn accumulate<F, W>(n: usize, m: usize, mut point_cost: F, in_window: W) -> Array2<f64>
where
    F: FnMut(usize, usize) -> f64,
    W: Fn(usize, usize) -> bool,
{
    let mut cost = Array2::from_elem((n + 1, m + 1), f64::INFINITY);
    cost[(0, 0)] = 0.0;

    for i in 1..=n {
        for j in 1..=m {
            if !in_window(i - 1, j - 1) {
                continue;
            }
            let best_prev = cost[(i - 1, j)]
                .min(cost[(i, j - 1)])
                .min(cost[(i - 1, j - 1)]);
            cost[(i, j)] = point_cost(i - 1, j - 1) + best_prev;
        }
    }

    cost
}

/// Walk a filled cost table back from the bottom-right corner to `(1, 1)`.
///
/// Candidates are tried in the order vertical `(i-1, j)`, horizontal
/// `(i, j-1)`, diagonal `(i-1, j-1)`; the first strict minimum wins, so ties
/// go to the vertical step. Steps that would leave row or column 1 are not
/// candidates. The returned path is in element indices, ascending.
pub(crate) fn backtrack(cost: &Array2<f64>) -> Vec<(usize, usize)> {
    let mut i = cost.nrows() - 1;
    let mut j = cost.ncols() - 1;
    let mut path = Vec::with_capacity(i + j);
    path.push((i - 1, j - 1));

    while i > 1 || j > 1 {
        let candidates = [
            (i > 1, i - 1, j),
            (j > 1, i, j - 1),
            (i > 1 && j > 1, i - 1, j - 1),
        ];

        let mut best: Option<(f64, usize, usize)> = None;
        for &(allowed, ci, cj) in &candidates {
            if !allowed {
                continue;
            }
            let c = cost[(ci, cj)];
            match best {
                Some((best_cost, _, _)) if c >= best_cost => {}
                _ => best = Some((c, ci, cj)),
            }
        }

        // At least one of i > 1 or j > 1 holds, so a candidate exists.
        let Some((_, ni, nj)) = best else { break };
        i = ni;
        j = nj;
        path.push((i - 1, j - 1));
    }

    path.reverse();
    path
}
