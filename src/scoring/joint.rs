use log::debug;

use super::ScoringConfig;
use super::windows::{ErrorWindow, find_error_windows};
use crate::align::dtw;
use crate::normalize::{finite_values, normalize_sequence};

/// One step of a joint alignment, in original (unnormalized) units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignedPair {
    /// User angle at this step
    pub user: f64,
    /// Reference angle at this step
    pub reference: f64,
    /// Absolute difference between the two
    pub distance: f64,
}

/// Outcome of comparing one joint's user series with its reference series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointComparison {
    /// Label of the compared joint
    pub joint: String,
    /// Similarity score, 0-100
    pub score: u32,
    /// Normalized DTW distance between the normalized series
    pub distance: f64,
    /// Warping path as `(user_index, reference_index)` into the finite samples
    pub path: Vec<(usize, usize)>,
    /// Aligned sample pairs along the path
    pub alignment: Vec<AlignedPair>,
    /// Stretches where the user deviates beyond the error threshold
    pub error_windows: Vec<ErrorWindow>,
}

impl JointComparison {
    /// Sentinel for series without enough finite samples to compare.
    pub fn insufficient(joint: &str) -> Self {
        Self {
            joint: joint.to_string(),
            score: 0,
            distance: f64::INFINITY,
            path: Vec::new(),
            alignment: Vec::new(),
            error_windows: Vec::new(),
        }
    }

    /// Returns `true` when the comparison could not be computed.
    pub fn is_insufficient(&self) -> bool {
        self.path.is_empty()
    }
}

impl ScoringConfig {
    /// Compare one joint's angle series against the reference with exact DTW.
    ///
    /// Non-finite samples are dropped first. Both series then need at least
    /// `min_valid_points` samples, otherwise [`JointComparison::insufficient`]
    /// is returned. The DTW runs on min-max normalized copies, while the
    /// alignment pairs and error windows are reported in the original units.
    pub fn compare_angles(&self, user: &[f64], reference: &[f64], joint: &str) -> JointComparison {
        let valid_user = finite_values(user);
        let valid_ref = finite_values(reference);

        if valid_user.len() < self.min_valid_points || valid_ref.len() < self.min_valid_points {
            debug!(
                "{joint}: insufficient data (user {} of {}, reference {} of {} finite samples)",
                valid_user.len(),
                user.len(),
                valid_ref.len(),
                reference.len()
            );
            return JointComparison::insufficient(joint);
        }

        let warp = dtw(&normalize_sequence(&valid_user), &normalize_sequence(&valid_ref));

        let alignment: Vec<AlignedPair> = warp
            .path
            .iter()
            .map(|&(i, j)| AlignedPair {
                user: valid_user[i],
                reference: valid_ref[j],
                distance: (valid_user[i] - valid_ref[j]).abs(),
            })
            .collect();

        let step_errors: Vec<f64> = alignment.iter().map(|p| p.distance).collect();
        let error_windows =
            find_error_windows(&step_errors, self.error_threshold, self.min_window_len);
        let score = self.score(warp.normalized_distance);

        debug!(
            "{joint}: dtw over {}x{} samples, distance {:.4}, score {score}, {} error windows",
            valid_user.len(),
            valid_ref.len(),
            warp.normalized_distance,
            error_windows.len()
        );

        JointComparison {
            joint: joint.to_string(),
            score,
            distance: warp.normalized_distance,
            path: warp.path,
            alignment,
            error_windows,
        }
    }
}

/// Compare one joint's angle series with the default [`ScoringConfig`].
///
/// # Arguments
/// * `user` - User angles in degrees, one per frame
/// * `reference` - Reference angles in degrees, one per frame
/// * `joint` - Joint label carried into the result and log output
///
/// # Example
/// ```
/// use sensei::scoring::compare_angles_with_dtw;
///
/// let result = compare_angles_with_dtw(&[1.0, 2.0, 3.0], &[1.0, 2.0], "left_knee");
/// assert_eq!(result.score, 0);
/// assert!(result.distance.is_infinite());
/// ```
pub fn compare_angles_with_dtw(user: &[f64], reference: &[f64], joint: &str) -> JointComparison {
    ScoringConfig::default().compare_angles(user, reference, joint)
}
