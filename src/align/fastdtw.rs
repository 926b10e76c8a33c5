use std::collections::BTreeSet;

use log::trace;
use ndarray::{Array2, ArrayView1};

use super::dtw::{Alignment, accumulate, dtw_with};
use super::metric::{Metric, check_dimensions};

/// Default search radius for whole-routine comparisons.
pub const DEFAULT_RADIUS: usize = 5;

/// Set of full-resolution cells the constrained DP is allowed to visit.
#[derive(Debug, Clone)]
pub struct SearchWindow {
    mask: Array2<bool>,
    cells: usize,
}

impl SearchWindow {
    /// Returns `true` if cell `(i, j)` lies inside the window.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.mask.get((i, j)).copied().unwrap_or(false)
    }

    /// Number of cells in the window.
    pub fn len(&self) -> usize {
        self.cells
    }

    /// Returns `true` if the window holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }

    /// Shape `(n, m)` of the grid the window was built over.
    pub fn shape(&self) -> (usize, usize) {
        self.mask.dim()
    }
}

/// Approximate DTW between two vector series in near-linear time.
///
/// Series shorter than `radius + 3` frames are aligned exactly. Longer ones
/// are halved, aligned recursively, and the coarse path is projected back and
/// refined inside a band of Chebyshev `radius` around it. The returned
/// distance is never below the exact DTW distance; a larger radius gets closer
/// to it at higher cost.
///
/// # Arguments
/// * `a` - First series, one row per frame
/// * `b` - Second series, one row per frame, same number of columns as `a`
/// * `metric` - Point-cost metric between frames
/// * `radius` - Refinement band half-width in frames
///
/// # Example
/// ```
/// use sensei::align::{Metric, fastdtw};
/// use ndarray::Array2;
///
/// let a = Array2::from_shape_fn((40, 2), |(i, k)| (i + k) as f64);
/// let b = Array2::from_shape_fn((50, 2), |(i, k)| (i as f64 * 0.8) + k as f64);
/// let result = fastdtw(&a, &b, Metric::Euclidean, 2).unwrap();
/// assert_eq!(result.path.first(), Some(&(0, 0)));
/// assert_eq!(result.path.last(), Some(&(39, 49)));
/// ```
pub fn fastdtw(
    a: &Array2<f64>,
    b: &Array2<f64>,
    metric: Metric,
    radius: usize,
) -> crate::Result<Alignment> {
    fastdtw_with(a, b, radius, |x, y| metric.distance(x, y))
}

/// FastDTW with an arbitrary point-cost function between frames.
///
/// Frame dimensionality is validated once up front; a mismatch returns
/// [`crate::Error::DimensionMismatch`]. Either series being empty yields
/// [`Alignment::incomparable`].
pub fn fastdtw_with<F>(
    a: &Array2<f64>,
    b: &Array2<f64>,
    radius: usize,
    point_cost: F,
) -> crate::Result<Alignment>
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64,
{
    if a.nrows() == 0 || b.nrows() == 0 {
        return Ok(Alignment::incomparable());
    }
    check_dimensions(a, b)?;
    Ok(fastdtw_level(a, b, radius, &point_cost, 0))
}

fn fastdtw_level<F>(
    a: &Array2<f64>,
    b: &Array2<f64>,
    radius: usize,
    point_cost: &F,
    depth: usize,
) -> Alignment
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64,
{
    let n = a.nrows();
    let m = b.nrows();

    if n <= radius + 2 || m <= radius + 2 {
        trace!("fastdtw depth {depth}: exact dtw on {n}x{m}");
        return dtw_with(n, m, |i, j| point_cost(a.row(i), b.row(j)));
    }

    let coarse = fastdtw_level(
        &reduce_by_half(a),
        &reduce_by_half(b),
        radius,
        point_cost,
        depth + 1,
    );

    let projected = expand_path(&coarse.path, n, m);
    let window = constrain_window(&projected, radius, n, m);
    trace!(
        "fastdtw depth {depth}: {n}x{m}, {} of {} cells in window",
        window.len(),
        n * m
    );

    let cost = accumulate(
        n,
        m,
        |i, j| point_cost(a.row(i), b.row(j)),
        |i, j| window.contains(i, j),
    );
    Alignment::from_cost(&cost)
}

/// Halve the resolution of a vector series by averaging consecutive frames.
///
/// Frames `2k` and `2k + 1` are averaged into frame `k`. With an odd frame
/// count the last frame is carried through unchanged.
///
/// # Example
/// ```
/// use sensei::align::reduce_by_half;
/// use ndarray::array;
///
/// let reduced = reduce_by_half(&array![[0.0], [2.0], [4.0], [6.0], [9.0]]);
/// assert_eq!(reduced, array![[1.0], [5.0], [9.0]]);
/// ```
pub fn reduce_by_half(series: &Array2<f64>) -> Array2<f64> {
    let n = series.nrows();
    let pairs = n / 2;
    let mut reduced = Array2::zeros((pairs + n % 2, series.ncols()));

    for k in 0..pairs {
        for c in 0..series.ncols() {
            reduced[(k, c)] = (series[(2 * k, c)] + series[(2 * k + 1, c)]) / 2.0;
        }
    }
    if n % 2 == 1 {
        reduced.row_mut(pairs).assign(&series.row(n - 1));
    }

    reduced
}

/// Project a low-resolution warping path onto a grid of `n x m` frames.
///
/// Each coarse cell `(i, j)` maps to its full 2x2 block `(2i..=2i+1,
/// 2j..=2j+1)`, clamped to the grid. Consecutive coarse steps then always
/// yield adjacent blocks, so the projection stays connected even with a
/// zero refinement radius. The result is deduplicated and sorted by `(i, j)`.
pub fn expand_path(path: &[(usize, usize)], n: usize, m: usize) -> Vec<(usize, usize)> {
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let mut cells = BTreeSet::new();
    for &(i, j) in path {
        for hi in [2 * i, 2 * i + 1] {
            for hj in [2 * j, 2 * j + 1] {
                cells.insert((hi.min(n - 1), hj.min(m - 1)));
            }
        }
    }

    cells.into_iter().collect()
}

/// Collect every cell of an `n x m` grid within Chebyshev distance `radius`
/// of some cell on `path`.
pub fn constrain_window(
    path: &[(usize, usize)],
    radius: usize,
    n: usize,
    m: usize,
) -> SearchWindow {
    let mut mask = Array2::from_elem((n, m), false);
    let mut cells = 0;

    if n == 0 || m == 0 {
        return SearchWindow { mask, cells };
    }

    for &(i, j) in path {
        let i_hi = (i + radius).min(n - 1);
        let j_hi = (j + radius).min(m - 1);
        for ii in i.saturating_sub(radius)..=i_hi {
            for jj in j.saturating_sub(radius)..=j_hi {
                if !mask[(ii, jj)] {
                    mask[(ii, jj)] = true;
                    cells += 1;
                }
            }
        }
    }

    SearchWindow { mask, cells }
}
