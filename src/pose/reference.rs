use std::collections::BTreeMap;

use log::{debug, warn};

use super::Keypoint;
use crate::Error;

/// Keypoint confidence (inclusive) counted towards the minimum keypoint set.
pub const MIN_KEYPOINT_CONFIDENCE: f64 = 0.6;

/// Fraction of reference measurements that must be within tolerance.
pub const MATCH_CONFIDENCE: f64 = 0.7;

const MIN_CONFIDENT_KEYPOINTS: usize = 3;

/// A static body measurement used to characterise a technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Measurement {
    LeftKneeAngle,
    RightKneeAngle,
    /// Angle at the hip between the shoulder and the knee
    LeftHipAngle,
    RightHipAngle,
    LeftElbowAngle,
    RightElbowAngle,
    /// Angle at the shoulder between the hip and the elbow
    LeftShoulderAngle,
    RightShoulderAngle,
    /// Hip level minus ankle y; negative means the ankle is below the hips
    LeftAnkleHeight,
    RightAnkleHeight,
    /// Shoulder level minus wrist y; positive means the wrist is above the shoulders
    LeftWristHeight,
    RightWristHeight,
    /// Horizontal distance between the ankles
    StanceWidth,
    /// Lean of the hip-to-shoulder line away from vertical; 0 when upright
    TorsoAngle,
}

/// Unit family of a [`Measurement`], selecting which tolerance applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Angle,
    Height,
    Width,
}

impl Measurement {
    pub fn kind(&self) -> MeasurementKind {
        use Measurement::*;
        match self {
            LeftAnkleHeight | RightAnkleHeight | LeftWristHeight | RightWristHeight => {
                MeasurementKind::Height
            }
            StanceWidth => MeasurementKind::Width,
            _ => MeasurementKind::Angle,
        }
    }
}

/// Allowed deviation per measurement kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    /// Degrees
    pub angle: f64,
    /// Pixels
    pub height: f64,
    /// Pixels
    pub stance: f64,
}

impl Tolerances {
    pub fn new(angle: f64, height: f64, stance: f64) -> Self {
        Self {
            angle,
            height,
            stance,
        }
    }

    pub fn for_kind(&self, kind: MeasurementKind) -> f64 {
        match kind {
            MeasurementKind::Angle => self.angle,
            MeasurementKind::Height => self.height,
            MeasurementKind::Width => self.stance,
        }
    }
}

/// Expected measurements of a technique and how far each may deviate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseSignature {
    pub measurements: BTreeMap<Measurement, f64>,
    pub tolerances: Tolerances,
}

impl PoseSignature {
    pub fn new(measurements: &[(Measurement, f64)], tolerances: Tolerances) -> Self {
        Self {
            measurements: measurements.iter().copied().collect(),
            tolerances,
        }
    }
}

/// Measurements extracted from one set of keypoints.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseAnalysis {
    pub measurements: BTreeMap<Measurement, f64>,
}

impl PoseAnalysis {
    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        self.measurements.get(&measurement).copied()
    }
}

/// Expected versus observed value of one measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementCheck {
    pub expected: f64,
    /// `None` when the measurement could not be taken from the keypoints
    pub actual: Option<f64>,
    pub within_tolerance: bool,
}

/// Result of checking keypoints against one reference technique.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseMatch {
    pub pose: String,
    /// `confidence >= MATCH_CONFIDENCE`
    pub matched: bool,
    /// Fraction of reference measurements within tolerance
    pub confidence: f64,
    pub details: BTreeMap<Measurement, MeasurementCheck>,
}

/// Best-matching technique over a whole reference store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseDetection {
    /// Best technique, if its confidence reaches [`MATCH_CONFIDENCE`]
    pub pose: Option<String>,
    /// Confidence of the best-ranked technique, 0 for an empty store
    pub confidence: f64,
    /// Every technique with its confidence, best first
    pub ranking: Vec<(String, f64)>,
}

/// Reference signatures for static techniques, owned by a coaching session.
///
/// The store is a plain value: callers that share one across requests wrap
/// it in their own synchronisation.
///
/// # Example
/// ```
/// use sensei::pose::{Measurement, PoseAnalysis, PoseReferenceStore};
///
/// let mut store = PoseReferenceStore::with_defaults();
/// assert!(store.get("horse_stance").is_some());
///
/// let mut analysis = PoseAnalysis::default();
/// analysis.measurements.insert(Measurement::StanceWidth, 140.0);
/// store.update("horse_stance", &analysis).unwrap();
/// assert_eq!(store.get("horse_stance").unwrap().measurements[&Measurement::StanceWidth], 140.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseReferenceStore {
    poses: BTreeMap<String, PoseSignature>,
}

impl PoseReferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the built-in kicks, stances, blocks and punch.
    pub fn with_defaults() -> Self {
        use Measurement::*;

        let entries = [
            (
                "front_kick",
                PoseSignature::new(
                    &[
                        (LeftKneeAngle, 45.0),
                        (RightKneeAngle, 160.0),
                        (LeftAnkleHeight, -100.0),
                        (RightAnkleHeight, 50.0),
                        (StanceWidth, 30.0),
                    ],
                    Tolerances::new(30.0, 40.0, 20.0),
                ),
            ),
            (
                "side_kick",
                PoseSignature::new(
                    &[
                        (LeftKneeAngle, 90.0),
                        (RightKneeAngle, 160.0),
                        (LeftAnkleHeight, -80.0),
                        (RightAnkleHeight, 50.0),
                        (StanceWidth, 80.0),
                    ],
                    Tolerances::new(25.0, 35.0, 25.0),
                ),
            ),
            (
                "round_kick",
                PoseSignature::new(
                    &[
                        (LeftKneeAngle, 110.0),
                        (RightKneeAngle, 160.0),
                        (LeftAnkleHeight, -60.0),
                        (RightAnkleHeight, 50.0),
                        (StanceWidth, 70.0),
                    ],
                    Tolerances::new(30.0, 40.0, 25.0),
                ),
            ),
            (
                "back_kick",
                PoseSignature::new(
                    &[
                        (LeftKneeAngle, 45.0),
                        (RightKneeAngle, 160.0),
                        (LeftAnkleHeight, -90.0),
                        (RightAnkleHeight, 50.0),
                        (StanceWidth, 40.0),
                    ],
                    Tolerances::new(35.0, 45.0, 30.0),
                ),
            ),
            (
                "axe_kick",
                PoseSignature::new(
                    &[
                        (LeftKneeAngle, 170.0),
                        (RightKneeAngle, 160.0),
                        (LeftAnkleHeight, -120.0),
                        (RightAnkleHeight, 50.0),
                        (StanceWidth, 35.0),
                    ],
                    Tolerances::new(25.0, 50.0, 25.0),
                ),
            ),
            (
                "fighting_stance",
                PoseSignature::new(
                    &[
                        (LeftKneeAngle, 150.0),
                        (RightKneeAngle, 150.0),
                        (LeftAnkleHeight, 40.0),
                        (RightAnkleHeight, 40.0),
                        (StanceWidth, 60.0),
                        (LeftElbowAngle, 90.0),
                        (RightElbowAngle, 90.0),
                    ],
                    Tolerances::new(20.0, 25.0, 30.0),
                ),
            ),
            (
                "horse_stance",
                PoseSignature::new(
                    &[
                        (LeftKneeAngle, 120.0),
                        (RightKneeAngle, 120.0),
                        (LeftAnkleHeight, 45.0),
                        (RightAnkleHeight, 45.0),
                        (StanceWidth, 120.0),
                    ],
                    Tolerances::new(25.0, 30.0, 40.0),
                ),
            ),
            (
                "high_block",
                PoseSignature::new(
                    &[
                        (LeftElbowAngle, 120.0),
                        (RightElbowAngle, 160.0),
                        (LeftWristHeight, -80.0),
                        (RightWristHeight, 20.0),
                        (LeftKneeAngle, 150.0),
                        (RightKneeAngle, 150.0),
                    ],
                    Tolerances::new(30.0, 40.0, 30.0),
                ),
            ),
            (
                "low_block",
                PoseSignature::new(
                    &[
                        (LeftElbowAngle, 140.0),
                        (RightElbowAngle, 160.0),
                        (LeftWristHeight, 60.0),
                        (RightWristHeight, 20.0),
                        (LeftKneeAngle, 150.0),
                        (RightKneeAngle, 150.0),
                    ],
                    Tolerances::new(30.0, 40.0, 30.0),
                ),
            ),
            (
                "punch",
                PoseSignature::new(
                    &[
                        (LeftElbowAngle, 160.0),
                        (RightElbowAngle, 90.0),
                        (LeftWristHeight, -20.0),
                        (RightWristHeight, 10.0),
                        (LeftKneeAngle, 150.0),
                        (RightKneeAngle, 150.0),
                    ],
                    Tolerances::new(25.0, 35.0, 30.0),
                ),
            ),
        ];

        Self {
            poses: entries
                .into_iter()
                .map(|(name, signature)| (name.to_string(), signature))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PoseSignature> {
        self.poses.get(name)
    }

    /// Names of all stored techniques, in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.poses.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Add or replace a technique, returning the previous signature.
    pub fn insert(&mut self, name: impl Into<String>, signature: PoseSignature) -> Option<PoseSignature> {
        self.poses.insert(name.into(), signature)
    }

    /// Merge measured values into an existing technique's expectations.
    ///
    /// Tolerances are kept. Updating a technique the store does not hold is
    /// an [`Error::UnknownPose`].
    pub fn update(&mut self, name: &str, analysis: &PoseAnalysis) -> crate::Result<()> {
        let Some(signature) = self.poses.get_mut(name) else {
            warn!("cannot update unknown reference pose `{name}`");
            return Err(Error::UnknownPose(name.to_string()));
        };
        signature
            .measurements
            .extend(analysis.measurements.iter().map(|(&m, &v)| (m, v)));
        debug!("updated reference pose `{name}` with {} measurements", analysis.measurements.len());
        Ok(())
    }

    /// Check keypoints against one stored technique.
    ///
    /// Fewer than three keypoints with confidence of at least
    /// [`MIN_KEYPOINT_CONFIDENCE`] gives no match with confidence 0. Otherwise
    /// each reference measurement is checked against its tolerance; a
    /// measurement that cannot be taken counts as out of tolerance.
    pub fn compare(&self, keypoints: &[Keypoint], name: &str) -> crate::Result<PoseMatch> {
        let signature = self
            .get(name)
            .ok_or_else(|| Error::UnknownPose(name.to_string()))?;

        let confident = keypoints
            .iter()
            .filter(|kp| kp.score >= MIN_KEYPOINT_CONFIDENCE)
            .count();
        if confident < MIN_CONFIDENT_KEYPOINTS {
            debug!("{name}: only {confident} keypoints with confidence >= {MIN_KEYPOINT_CONFIDENCE}");
            return Ok(PoseMatch {
                pose: name.to_string(),
                matched: false,
                confidence: 0.0,
                details: BTreeMap::new(),
            });
        }

        let analysis = analyze_keypoints(keypoints);
        let mut details = BTreeMap::new();
        let mut passed = 0;

        for (&measurement, &expected) in &signature.measurements {
            let actual = analysis.get(measurement);
            let tolerance = signature.tolerances.for_kind(measurement.kind());
            let within_tolerance = actual.is_some_and(|v| (v - expected).abs() <= tolerance);
            if within_tolerance {
                passed += 1;
            }
            details.insert(
                measurement,
                MeasurementCheck {
                    expected,
                    actual,
                    within_tolerance,
                },
            );
        }

        let total = signature.measurements.len();
        let confidence = if total > 0 {
            passed as f64 / total as f64
        } else {
            0.0
        };

        Ok(PoseMatch {
            pose: name.to_string(),
            matched: confidence >= MATCH_CONFIDENCE,
            confidence,
            details,
        })
    }

    /// Rank every stored technique against the keypoints.
    pub fn detect(&self, keypoints: &[Keypoint]) -> PoseDetection {
        let mut ranking: Vec<(String, f64)> = self
            .poses
            .keys()
            .filter_map(|name| self.compare(keypoints, name).ok())
            .map(|m| (m.pose, m.confidence))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));

        let confidence = ranking.first().map_or(0.0, |(_, c)| *c);
        let pose = ranking
            .first()
            .filter(|(_, c)| *c >= MATCH_CONFIDENCE)
            .map(|(name, _)| name.clone());

        PoseDetection {
            pose,
            confidence,
            ranking,
        }
    }
}

/// Extract static measurements from raw keypoints.
///
/// Knee, hip, elbow and shoulder angles use the angle between the two limb
/// vectors (`acos` of their normalized dot product). The torso angle is the
/// lean of the hip-midpoint to shoulder-midpoint line from vertical. Ankle heights are taken
/// relative to the mean hip level and wrist heights relative to the mean
/// shoulder level; both need the left and right reference keypoints.
/// Keypoint confidence is not checked here.
pub fn analyze_keypoints(keypoints: &[Keypoint]) -> PoseAnalysis {
    use Measurement::*;

    let find = |name: &str| keypoints.iter().find(|kp| kp.name == name);
    let mut measurements = BTreeMap::new();

    let limbs = [
        (LeftKneeAngle, "left_hip", "left_knee", "left_ankle"),
        (RightKneeAngle, "right_hip", "right_knee", "right_ankle"),
        (LeftHipAngle, "left_shoulder", "left_hip", "left_knee"),
        (RightHipAngle, "right_shoulder", "right_hip", "right_knee"),
        (LeftElbowAngle, "left_shoulder", "left_elbow", "left_wrist"),
        (RightElbowAngle, "right_shoulder", "right_elbow", "right_wrist"),
        (LeftShoulderAngle, "left_hip", "left_shoulder", "left_elbow"),
        (RightShoulderAngle, "right_hip", "right_shoulder", "right_elbow"),
    ];
    for (measurement, a, b, c) in limbs {
        if let (Some(a), Some(b), Some(c)) = (find(a), find(b), find(c)) {
            if let Some(angle) = vector_angle(a, b, c) {
                measurements.insert(measurement, angle);
            }
        }
    }

    let level = |left: &str, right: &str| match (find(left), find(right)) {
        (Some(l), Some(r)) => Some((l.y + r.y) / 2.0),
        _ => None,
    };
    let heights = [
        (LeftAnkleHeight, "left_ankle", level("left_hip", "right_hip")),
        (RightAnkleHeight, "right_ankle", level("left_hip", "right_hip")),
        (LeftWristHeight, "left_wrist", level("left_shoulder", "right_shoulder")),
        (RightWristHeight, "right_wrist", level("left_shoulder", "right_shoulder")),
    ];
    for (measurement, name, reference_level) in heights {
        if let (Some(kp), Some(reference_level)) = (find(name), reference_level) {
            measurements.insert(measurement, reference_level - kp.y);
        }
    }

    if let (Some(l), Some(r)) = (find("left_ankle"), find("right_ankle")) {
        measurements.insert(StanceWidth, (l.x - r.x).abs());
    }

    let midpoint = |left: &str, right: &str| match (find(left), find(right)) {
        (Some(l), Some(r)) => Some(((l.x + r.x) / 2.0, (l.y + r.y) / 2.0)),
        _ => None,
    };
    if let (Some(hips), Some(shoulders)) = (
        midpoint("left_hip", "right_hip"),
        midpoint("left_shoulder", "right_shoulder"),
    ) {
        let (dx, dy) = (shoulders.0 - hips.0, shoulders.1 - hips.1);
        if dx != 0.0 || dy != 0.0 {
            // Image y grows downwards, so upright is (0, -1).
            measurements.insert(TorsoAngle, dx.abs().atan2(-dy).to_degrees());
        }
    }

    PoseAnalysis { measurements }
}

fn vector_angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> Option<f64> {
    let (ux, uy) = (a.x - b.x, a.y - b.y);
    let (vx, vy) = (c.x - b.x, c.y - b.y);
    let mags = ux.hypot(uy) * vx.hypot(vy);
    if mags == 0.0 {
        return None;
    }
    let cos = ((ux * vx + uy * vy) / mags).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}
