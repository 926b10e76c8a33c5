use std::collections::BTreeMap;

use super::{Keypoint, Pose, PoseFrame};

/// Confidence a keypoint needs (strictly above) to take part in a joint angle.
pub const JOINT_CONFIDENCE: f64 = 0.1;

/// Joints for which [`joint_angles`] reports an angle.
pub const ANGLE_JOINTS: [&str; 12] = [
    "left_elbow",
    "right_elbow",
    "left_shoulder",
    "right_shoulder",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// The two keypoints whose segments meet at `joint`, as `(start, end)`.
pub fn connected_keypoints(joint: &str) -> Option<(&'static str, &'static str)> {
    let pair = match joint {
        "left_elbow" => ("left_shoulder", "left_wrist"),
        "right_elbow" => ("right_shoulder", "right_wrist"),
        "left_shoulder" => ("left_hip", "left_elbow"),
        "right_shoulder" => ("right_hip", "right_elbow"),
        "left_wrist" => ("left_elbow", "left_index"),
        "right_wrist" => ("right_elbow", "right_index"),
        "left_knee" => ("left_hip", "left_ankle"),
        "right_knee" => ("right_hip", "right_ankle"),
        "left_ankle" => ("left_knee", "left_foot_index"),
        "right_ankle" => ("right_knee", "right_foot_index"),
        "left_hip" => ("left_knee", "left_shoulder"),
        "right_hip" => ("right_knee", "right_shoulder"),
        _ => return None,
    };
    Some(pair)
}

/// Angle in degrees at `b` formed by the segments `b -> a` and `b -> c`.
///
/// Computed from the difference of the two segment headings and folded into
/// `[0, 180]`.
///
/// # Example
/// ```
/// use sensei::pose::{Keypoint, calculate_angle};
///
/// let hip = Keypoint::new("right_hip", 0.0, 0.0, 0.9);
/// let knee = Keypoint::new("right_knee", 0.0, 100.0, 0.9);
/// let ankle = Keypoint::new("right_ankle", 100.0, 100.0, 0.9);
/// assert!((calculate_angle(&hip, &knee, &ankle) - 90.0).abs() < 1e-9);
/// ```
pub fn calculate_angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 { 360.0 - angle } else { angle }
}

fn joint_angle(pose: &Pose, joint: &str) -> Option<f64> {
    let (start, end) = connected_keypoints(joint)?;
    let vertex = pose.confident(joint, JOINT_CONFIDENCE)?;
    let start = pose.confident(start, JOINT_CONFIDENCE)?;
    let end = pose.confident(end, JOINT_CONFIDENCE)?;
    Some(calculate_angle(start, vertex, end))
}

/// Angles of every joint in [`ANGLE_JOINTS`] that can be measured in `pose`.
///
/// A joint is measured when it and both connected keypoints have confidence
/// above [`JOINT_CONFIDENCE`]; other joints are absent from the map.
pub fn joint_angles(pose: &Pose) -> BTreeMap<&'static str, f64> {
    ANGLE_JOINTS
        .iter()
        .filter_map(|&joint| joint_angle(pose, joint).map(|angle| (joint, angle)))
        .collect()
}

/// One joint's angle across a pose history, one sample per frame.
///
/// Frames where the joint cannot be measured yield NaN, which the scoring
/// layer filters out before alignment.
pub fn joint_angle_series(history: &[PoseFrame], joint: &str) -> Vec<f64> {
    history
        .iter()
        .map(|frame| joint_angle(&frame.pose, joint).unwrap_or(f64::NAN))
        .collect()
}
