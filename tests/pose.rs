use approx::assert_relative_eq;
use sensei::Error;
use sensei::pose::{
    Keypoint, Measurement, Pose, PoseFrame, PoseReferenceStore, PoseSignature, Tolerances,
    joint_angle_series, joint_angles,
};
use sensei::scoring::compare_angles_with_dtw;

fn punch_keypoints(score: f64) -> Vec<Keypoint> {
    // Right arm fully extended at shoulder height, left arm chambered at the hip.
    vec![
        Keypoint::new("left_shoulder", 280.0, 150.0, score),
        Keypoint::new("right_shoulder", 360.0, 150.0, score),
        Keypoint::new("left_elbow", 280.0, 220.0, score),
        Keypoint::new("right_elbow", 430.0, 150.0, score),
        Keypoint::new("left_wrist", 320.0, 220.0, score),
        Keypoint::new("right_wrist", 500.0, 150.0, score),
        Keypoint::new("left_hip", 290.0, 300.0, score),
        Keypoint::new("right_hip", 350.0, 300.0, score),
    ]
}

#[test]
fn joint_angles_of_extended_arm() {
    let pose = Pose::new(punch_keypoints(0.9));
    let angles = joint_angles(&pose);
    assert_relative_eq!(angles["right_elbow"], 180.0, epsilon = 1e-9);
    assert_relative_eq!(angles["left_elbow"], 90.0, epsilon = 1e-9);
    // Wrists need the index finger, which this estimator output lacks.
    assert!(!angles.contains_key("right_wrist"));
}

#[test]
fn angle_series_feed_scoring() {
    let history: Vec<PoseFrame> = (0..6)
        .map(|i| PoseFrame::new(Pose::new(punch_keypoints(0.9)), i as f64 * 33.0))
        .collect();
    let series = joint_angle_series(&history, "right_elbow");
    let result = compare_angles_with_dtw(&series, &series, "right_elbow");
    assert_eq!(result.distance, 0.0);
    assert_eq!(result.path.last(), Some(&(5, 5)));
}

#[test]
fn custom_signature_round_trip() {
    let mut store = PoseReferenceStore::new();
    store.insert(
        "straight_punch",
        PoseSignature::new(
            &[(Measurement::RightElbowAngle, 175.0), (Measurement::RightWristHeight, 0.0)],
            Tolerances::new(15.0, 20.0, 20.0),
        ),
    );

    let result = store.compare(&punch_keypoints(0.9), "straight_punch").unwrap();
    assert!(result.matched);
    assert_relative_eq!(result.confidence, 1.0);

    let detection = store.detect(&punch_keypoints(0.9));
    assert_eq!(detection.pose.as_deref(), Some("straight_punch"));
}

#[test]
fn low_confidence_keypoints_never_match() {
    let store = PoseReferenceStore::with_defaults();
    let result = store.compare(&punch_keypoints(0.5), "punch").unwrap();
    assert!(!result.matched);
    assert_eq!(result.confidence, 0.0);

    let detection = store.detect(&punch_keypoints(0.5));
    assert!(detection.pose.is_none());
    assert_eq!(detection.ranking.len(), store.len());
}

#[test]
fn unknown_pose_is_an_error() {
    let mut store = PoseReferenceStore::with_defaults();
    assert!(matches!(
        store.compare(&punch_keypoints(0.9), "flying_kick"),
        Err(Error::UnknownPose(name)) if name == "flying_kick"
    ));
    assert!(store.update("flying_kick", &Default::default()).is_err());
}
