//! Sequence alignment: exact DTW and the multi-resolution FastDTW
//! approximation.
//!
//! Both engines share one cost-table fill and one backtrack, parameterised by
//! a point-cost closure. Scalar series use absolute difference, vector series
//! (one row per frame in an `Array2<f64>`) use a [`Metric`] or any closure.

mod dtw;
mod fastdtw;
mod metric;

pub use dtw::{Alignment, dtw, dtw_distance, dtw_vectors, dtw_with};
pub use fastdtw::{
    DEFAULT_RADIUS, SearchWindow, constrain_window, expand_path, fastdtw, fastdtw_with,
    reduce_by_half,
};
pub use metric::{Metric, euclidean_distance, series_from_rows};
