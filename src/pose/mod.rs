//! Pose data model and pose-derived measurements.
//!
//! Poses arrive from an upstream estimator as named, confidence-scored 2-D
//! keypoints in pixel coordinates. This module turns them into joint angles
//! and classifies static techniques against a [`PoseReferenceStore`].

mod angles;
mod reference;

pub use angles::{
    ANGLE_JOINTS, JOINT_CONFIDENCE, calculate_angle, connected_keypoints, joint_angle_series,
    joint_angles,
};
pub use reference::{
    MATCH_CONFIDENCE, MIN_KEYPOINT_CONFIDENCE, Measurement, MeasurementCheck, MeasurementKind,
    PoseAnalysis, PoseDetection, PoseMatch, PoseReferenceStore, PoseSignature, Tolerances,
    analyze_keypoints,
};

/// A named body landmark in one frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keypoint {
    /// Landmark name, e.g. `"left_knee"`
    pub name: String,
    /// Horizontal position in pixels
    pub x: f64,
    /// Vertical position in pixels (grows downwards)
    pub y: f64,
    /// Detection confidence in `[0, 1]`
    pub score: f64,
}

impl Keypoint {
    /// Create a keypoint from its name, pixel position and confidence.
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }

    /// Pixel distance to another keypoint.
    pub fn distance_to(&self, other: &Keypoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// All keypoints detected for one person in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    /// Wrap the keypoints detected for one person.
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// First keypoint with the given name.
    pub fn keypoint(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }

    /// Keypoint with the given name if its confidence is strictly above
    /// `min_score`.
    pub fn confident(&self, name: &str, min_score: f64) -> Option<&Keypoint> {
        self.keypoint(name).filter(|kp| kp.score > min_score)
    }
}

/// A pose stamped with its capture time in milliseconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseFrame {
    pub pose: Pose,
    /// Capture time in milliseconds
    pub timestamp: f64,
}

impl PoseFrame {
    /// Stamp a pose with its capture time in milliseconds.
    pub fn new(pose: Pose, timestamp: f64) -> Self {
        Self { pose, timestamp }
    }
}
