use ndarray::{Array2, ArrayView1};

use crate::Error;

/// Point-cost metric between two frames of a vector series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    /// Square root of the summed squared differences.
    #[default]
    Euclidean,
    /// Sum of absolute differences.
    Manhattan,
    /// One minus the cosine similarity; `1.0` when either frame is all zeros.
    Cosine,
}

impl Metric {
    /// Distance between two frames of equal length.
    ///
    /// Lengths are not checked here; callers validate dimensionality once per
    /// series with [`check_dimensions`] before entering the cost loop.
    pub fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        match self {
            Metric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            Metric::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
            Metric::Cosine => {
                let mut dot = 0.0;
                let mut norm_a = 0.0;
                let mut norm_b = 0.0;
                for (x, y) in a.iter().zip(b.iter()) {
                    dot += x * y;
                    norm_a += x * x;
                    norm_b += y * y;
                }
                let norm_prod = (norm_a * norm_b).sqrt();
                if norm_prod > 1e-10 {
                    1.0 - dot / norm_prod
                } else {
                    1.0
                }
            }
        }
    }
}

/// Euclidean distance between two vectors.
///
/// Vectors of different length are rejected rather than truncated.
///
/// # Example
/// ```
/// use sensei::align::euclidean_distance;
///
/// assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap(), 5.0);
/// assert!(euclidean_distance(&[1.0], &[1.0, 2.0]).is_err());
/// ```
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> crate::Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(Metric::Euclidean.distance(ArrayView1::from(a), ArrayView1::from(b)))
}

/// Build a vector series (one row per frame) from nested rows.
///
/// Every row must have the same length as the first one. An empty input
/// yields a `0 x 0` series.
///
/// # Example
/// ```
/// use sensei::align::series_from_rows;
///
/// let series = series_from_rows(&[vec![90.0, 45.0], vec![95.0, 50.0]]).unwrap();
/// assert_eq!(series.dim(), (2, 2));
/// assert!(series_from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
/// ```
pub fn series_from_rows(rows: &[Vec<f64>]) -> crate::Result<Array2<f64>> {
    let n_cols = rows.first().map_or(0, Vec::len);
    let mut series = Array2::zeros((rows.len(), n_cols));
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(Error::DimensionMismatch {
                expected: n_cols,
                got: row.len(),
            });
        }
        for (j, &v) in row.iter().enumerate() {
            series[(i, j)] = v;
        }
    }
    Ok(series)
}

/// Ensure two vector series have the same frame dimensionality.
pub(crate) fn check_dimensions(a: &Array2<f64>, b: &Array2<f64>) -> crate::Result<()> {
    if a.ncols() != b.ncols() {
        return Err(Error::DimensionMismatch {
            expected: a.ncols(),
            got: b.ncols(),
        });
    }
    Ok(())
}
