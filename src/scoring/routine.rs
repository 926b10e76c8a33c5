use log::debug;
use ndarray::Array2;

use crate::Error;
use crate::align::{Metric, fastdtw};

/// Average per-joint error, in degrees, at which a frame scores zero.
pub const MAX_ANGLE_ERROR_DEG: f64 = 180.0;

/// Outcome of comparing a full user routine with the instructor's.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutineComparison {
    /// Mean per-frame similarity scaled to 0-100
    pub overall_score: u32,
    /// Similarity in `[0, 1]` for each step of the alignment path
    pub per_frame_scores: Vec<f64>,
    /// Mean absolute angle error per joint over the path, in degrees
    pub joint_errors: Vec<f64>,
    /// Warping path as `(instructor_frame, user_frame)` pairs
    pub alignment_path: Vec<(usize, usize)>,
    /// FastDTW distance of the alignment
    pub distance: f64,
}

impl RoutineComparison {
    /// Result for an empty instructor or user routine.
    pub fn empty() -> Self {
        Self {
            overall_score: 0,
            per_frame_scores: Vec::new(),
            joint_errors: Vec::new(),
            alignment_path: Vec::new(),
            distance: f64::INFINITY,
        }
    }
}

/// Compare two multi-joint routines with FastDTW.
///
/// Each row of `instructor` and `user` is one frame; each column one joint
/// angle in degrees. Both must have the same number of columns. Along the
/// Euclidean FastDTW path every step gets a similarity of
/// `1 - min(mean_abs_error / 180, 1)` and the overall score is the mean
/// similarity times 100, rounded.
///
/// # Arguments
/// * `instructor` - Reference routine (n_frames x n_joints)
/// * `user` - User routine (n_frames x n_joints)
/// * `radius` - FastDTW radius, see [`crate::align::DEFAULT_RADIUS`]
///
/// # Errors
/// [`Error::DimensionMismatch`] when the joint counts differ and
/// [`Error::InvalidParameter`] when frames hold no joints.
///
/// # Example
/// ```
/// use sensei::align::DEFAULT_RADIUS;
/// use sensei::scoring::compare_routines;
/// use ndarray::array;
///
/// let instructor = array![[90.0, 170.0], [120.0, 160.0], [150.0, 150.0]];
/// let user = array![[90.0, 170.0], [120.0, 160.0], [150.0, 150.0]];
/// let result = compare_routines(&instructor, &user, DEFAULT_RADIUS).unwrap();
/// assert_eq!(result.overall_score, 100);
/// ```
pub fn compare_routines(
    instructor: &Array2<f64>,
    user: &Array2<f64>,
    radius: usize,
) -> crate::Result<RoutineComparison> {
    if instructor.nrows() == 0 || user.nrows() == 0 {
        debug!(
            "routine comparison skipped: {} instructor frames, {} user frames",
            instructor.nrows(),
            user.nrows()
        );
        return Ok(RoutineComparison::empty());
    }

    let n_joints = instructor.ncols();
    if user.ncols() != n_joints {
        return Err(Error::DimensionMismatch {
            expected: n_joints,
            got: user.ncols(),
        });
    }
    if n_joints == 0 {
        return Err(Error::InvalidParameter {
            name: "instructor",
            value: "0 joints".to_string(),
            reason: "frames must hold at least one joint angle".to_string(),
        });
    }

    let warp = fastdtw(instructor, user, Metric::Euclidean, radius)?;

    let mut joint_errors = vec![0.0; n_joints];
    let mut per_frame_scores = Vec::with_capacity(warp.path.len());

    for &(i, j) in &warp.path {
        let mut total = 0.0;
        for (k, acc) in joint_errors.iter_mut().enumerate() {
            let err = (instructor[(i, k)] - user[(j, k)]).abs();
            total += err;
            *acc += err;
        }
        let avg_error = total / n_joints as f64;
        per_frame_scores.push(1.0 - (avg_error / MAX_ANGLE_ERROR_DEG).min(1.0));
    }

    let steps = warp.path.len() as f64;
    for acc in joint_errors.iter_mut() {
        *acc /= steps;
    }

    let mean_similarity = per_frame_scores.iter().sum::<f64>() / steps;
    let overall_score = (mean_similarity * 100.0).round() as u32;

    debug!(
        "routine comparison: {}x{} frames, {} joints, path {} steps, score {overall_score}",
        instructor.nrows(),
        user.nrows(),
        n_joints,
        warp.path.len()
    );

    Ok(RoutineComparison {
        overall_score,
        per_frame_scores,
        joint_errors,
        alignment_path: warp.path,
        distance: warp.distance,
    })
}
