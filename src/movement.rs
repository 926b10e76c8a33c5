//! Movement events and stillness gaps from a pose history.
//!
//! Each frame is compared with the frame [`LOOKBACK_FRAMES`] earlier. A
//! movement is flagged when keypoints moved on average more than the
//! displacement threshold, or when one of the key limb angles (elbows, knees)
//! changed by more than the angle threshold. The angle check catches
//! techniques executed in place, where the base barely moves.

use log::trace;

use crate::pose::{Pose, PoseFrame, calculate_angle};

/// Mean keypoint displacement, in pixels, above which a frame counts as moving.
pub const DISPLACEMENT_THRESHOLD: f64 = 0.08;

/// Limb angle change, in degrees, above which a frame counts as moving.
pub const ANGLE_CHANGE_THRESHOLD_DEG: f64 = 15.0;

/// Keypoint confidence (exclusive) required by movement detection.
pub const MOVEMENT_CONFIDENCE: f64 = 0.4;

/// Mean keypoint displacement below which a frame counts as still.
pub const STILLNESS_THRESHOLD: f64 = 0.05;

/// Keypoint confidence (exclusive) required by gap detection.
pub const STILLNESS_CONFIDENCE: f64 = 0.5;

/// Minimum duration, in milliseconds, of a reported stillness gap.
pub const MIN_GAP_MS: f64 = 500.0;

/// Number of frames between the compared poses.
pub const LOOKBACK_FRAMES: usize = 2;

/// Limb angles checked for in-place movement, as (start, vertex, end).
const KEY_LIMBS: [[&str; 3]; 4] = [
    ["right_shoulder", "right_elbow", "right_wrist"],
    ["left_shoulder", "left_elbow", "left_wrist"],
    ["right_hip", "right_knee", "right_ankle"],
    ["left_hip", "left_knee", "left_ankle"],
];

/// A span of stillness between two timestamps, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementGap {
    /// Timestamp of the first still frame
    pub start: f64,
    /// Timestamp where the gap ends
    pub end: f64,
}

impl MovementGap {
    /// Length of the gap in milliseconds.
    ///
    /// # Example
    /// ```
    /// use sensei::movement::MovementGap;
    ///
    /// let gap = MovementGap { start: 200.0, end: 900.0 };
    /// assert_eq!(gap.duration(), 700.0);
    /// ```
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Configuration for movement and stillness detection.
///
/// # Example
/// ```
/// use sensei::movement::MovementConfig;
///
/// let config = MovementConfig::new().with_angle_change_threshold(20.0);
/// assert!(config.detect_movements(&[]).is_empty());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementConfig {
    /// Mean displacement threshold in pixels
    pub displacement_threshold: f64,
    /// Limb angle change threshold in degrees
    pub angle_change_threshold: f64,
    /// Keypoint confidence for movement detection
    pub min_confidence: f64,
    /// Frames between compared poses
    pub lookback: usize,
    /// Mean displacement below which a frame is still
    pub stillness_threshold: f64,
    /// Keypoint confidence for gap detection
    pub stillness_confidence: f64,
    /// Minimum reported gap length in milliseconds
    pub min_gap_ms: f64,
}

impl MovementConfig {
    /// Create a movement configuration with the default tuning.
    pub fn new() -> Self {
        Self {
            displacement_threshold: DISPLACEMENT_THRESHOLD,
            angle_change_threshold: ANGLE_CHANGE_THRESHOLD_DEG,
            min_confidence: MOVEMENT_CONFIDENCE,
            lookback: LOOKBACK_FRAMES,
            stillness_threshold: STILLNESS_THRESHOLD,
            stillness_confidence: STILLNESS_CONFIDENCE,
            min_gap_ms: MIN_GAP_MS,
        }
    }

    /// Set the mean displacement threshold.
    pub fn with_displacement_threshold(mut self, threshold: f64) -> Self {
        self.displacement_threshold = threshold;
        self
    }

    /// Set the limb angle change threshold.
    pub fn with_angle_change_threshold(mut self, threshold: f64) -> Self {
        self.angle_change_threshold = threshold;
        self
    }

    /// Set the keypoint confidence for movement detection.
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Set the stillness threshold and its keypoint confidence.
    pub fn with_stillness(mut self, threshold: f64, confidence: f64) -> Self {
        self.stillness_threshold = threshold;
        self.stillness_confidence = confidence;
        self
    }

    /// Set the minimum reported gap length.
    pub fn with_min_gap_ms(mut self, min_gap_ms: f64) -> Self {
        self.min_gap_ms = min_gap_ms;
        self
    }

    /// Timestamps of frames showing significant movement.
    ///
    /// Needs at least `lookback + 1` frames; shorter histories yield no events.
    pub fn detect_movements(&self, history: &[PoseFrame]) -> Vec<f64> {
        let lookback = self.lookback.max(1);
        if history.len() <= lookback {
            return Vec::new();
        }

        let mut events = Vec::new();
        for i in lookback..history.len() {
            let prev = &history[i - lookback].pose;
            let current = &history[i].pose;

            let displacement = mean_displacement(prev, current, self.min_confidence);
            let moved = displacement > self.displacement_threshold
                || self.limb_angle_changed(prev, current);

            if moved {
                trace!(
                    "movement at {} ms (mean displacement {displacement:.3})",
                    history[i].timestamp
                );
                events.push(history[i].timestamp);
            }
        }
        events
    }

    /// Stillness spans longer than `min_gap_ms`.
    ///
    /// Needs at least five frames. Frames from `lookback` up to two before the
    /// end are classified; a gap starts at the first still frame and ends at
    /// the frame before movement resumes, or at the last frame of the history.
    pub fn detect_gaps(&self, history: &[PoseFrame]) -> Vec<MovementGap> {
        const MIN_FRAMES: usize = 5;
        const TRAILING_FRAMES: usize = 2;

        let lookback = self.lookback.max(1);
        if history.len() < MIN_FRAMES || history.len() < lookback + TRAILING_FRAMES + 1 {
            return Vec::new();
        }

        let mut gaps = Vec::new();
        let mut gap_start: Option<f64> = None;

        for i in lookback..history.len() - TRAILING_FRAMES {
            let displacement = mean_displacement(
                &history[i - lookback].pose,
                &history[i].pose,
                self.stillness_confidence,
            );
            let still = displacement < self.stillness_threshold;

            match (gap_start, still) {
                (None, true) => gap_start = Some(history[i].timestamp),
                (Some(start), false) => {
                    gaps.push(MovementGap {
                        start,
                        end: history[i - 1].timestamp,
                    });
                    gap_start = None;
                }
                _ => {}
            }
        }

        if let (Some(start), Some(last)) = (gap_start, history.last()) {
            gaps.push(MovementGap {
                start,
                end: last.timestamp,
            });
        }

        gaps.retain(|gap| gap.duration() > self.min_gap_ms);
        gaps
    }

    fn limb_angle_changed(&self, prev: &Pose, current: &Pose) -> bool {
        KEY_LIMBS.iter().any(|limb| {
            match (
                limb_angle(prev, limb, self.min_confidence),
                limb_angle(current, limb, self.min_confidence),
            ) {
                (Some(before), Some(after)) => (after - before).abs() > self.angle_change_threshold,
                _ => false,
            }
        })
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean pixel displacement of keypoints confidently seen in both poses.
///
/// Keypoints are matched by name; 0 when no keypoint qualifies.
fn mean_displacement(prev: &Pose, current: &Pose, min_confidence: f64) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for kp in &current.keypoints {
        if let Some(before) = prev.keypoint(&kp.name) {
            if kp.score > min_confidence && before.score > min_confidence {
                total += kp.distance_to(before);
                count += 1;
            }
        }
    }
    if count > 0 { total / count as f64 } else { 0.0 }
}

fn limb_angle(pose: &Pose, limb: &[&str; 3], min_confidence: f64) -> Option<f64> {
    let a = pose.confident(limb[0], min_confidence)?;
    let b = pose.confident(limb[1], min_confidence)?;
    let c = pose.confident(limb[2], min_confidence)?;
    Some(calculate_angle(a, b, c))
}

/// Timestamps of significant movements with the default [`MovementConfig`].
pub fn detect_significant_movements(history: &[PoseFrame]) -> Vec<f64> {
    MovementConfig::default().detect_movements(history)
}

/// Stillness gaps longer than 500 ms with the default [`MovementConfig`].
pub fn detect_movement_gaps(history: &[PoseFrame]) -> Vec<MovementGap> {
    MovementConfig::default().detect_gaps(history)
}
