//! Similarity scores and error diagnostics over aligned sequences.
//!
//! - [`compare_angles_with_dtw`] scores one joint's angle series with exact
//!   DTW and locates the stretches where the user drifts from the reference.
//! - [`compare_routines`] scores whole multi-joint routines with FastDTW.

mod joint;
mod routine;
mod windows;

pub use joint::{AlignedPair, JointComparison, compare_angles_with_dtw};
pub use routine::{MAX_ANGLE_ERROR_DEG, RoutineComparison, compare_routines};
pub use windows::{ErrorWindow, find_error_windows};

/// Absolute angle difference, in degrees, above which an aligned step counts
/// as an error.
pub const ERROR_THRESHOLD_DEG: f64 = 15.0;

/// Minimum number of consecutive error steps for an error window.
pub const MIN_ERROR_WINDOW_LEN: usize = 3;

/// Minimum number of finite samples each series needs to be scored.
pub const MIN_VALID_POINTS: usize = 3;

/// Normalized DTW distance that maps to a score of 50.
pub const SCORE_CENTER: f64 = 0.25;

/// Steepness of the logistic distance-to-score curve.
pub const SCORE_STEEPNESS: f64 = 12.0;

/// Configuration for per-joint DTW scoring.
///
/// # Example
/// ```
/// use sensei::scoring::ScoringConfig;
///
/// let config = ScoringConfig::new().with_error_threshold(20.0);
/// let result = config.compare_angles(&[90.0, 100.0, 110.0], &[90.0, 100.0, 110.0], "left_knee");
/// assert!(result.error_windows.is_empty());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoringConfig {
    /// Error threshold in degrees for error windows
    pub error_threshold: f64,
    /// Minimum run length of an error window
    pub min_window_len: usize,
    /// Minimum finite samples per series
    pub min_valid_points: usize,
    /// Logistic curve centre
    pub score_center: f64,
    /// Logistic curve steepness
    pub score_steepness: f64,
}

impl ScoringConfig {
    /// Create a scoring configuration with the default tuning.
    pub fn new() -> Self {
        Self {
            error_threshold: ERROR_THRESHOLD_DEG,
            min_window_len: MIN_ERROR_WINDOW_LEN,
            min_valid_points: MIN_VALID_POINTS,
            score_center: SCORE_CENTER,
            score_steepness: SCORE_STEEPNESS,
        }
    }

    /// Set the error-window threshold in degrees.
    pub fn with_error_threshold(mut self, error_threshold: f64) -> Self {
        self.error_threshold = error_threshold;
        self
    }

    /// Set the minimum error-window length.
    pub fn with_min_window_len(mut self, min_window_len: usize) -> Self {
        self.min_window_len = min_window_len;
        self
    }

    /// Set the minimum number of finite samples per series.
    pub fn with_min_valid_points(mut self, min_valid_points: usize) -> Self {
        self.min_valid_points = min_valid_points;
        self
    }

    /// Set the logistic curve centre and steepness.
    pub fn with_score_curve(mut self, center: f64, steepness: f64) -> Self {
        self.score_center = center;
        self.score_steepness = steepness;
        self
    }

    /// Map a normalized DTW distance to a 0-100 score.
    ///
    /// `round(100 / (1 + exp((distance - center) * steepness)))`. The score
    /// never increases with distance and an infinite distance scores 0.
    pub fn score(&self, normalized_distance: f64) -> u32 {
        let logistic =
            100.0 / (1.0 + ((normalized_distance - self.score_center) * self.score_steepness).exp());
        logistic.round() as u32
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::new()
    }
}
