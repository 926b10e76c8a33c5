//! Movement detection and timing diagnostics over synthetic pose histories.

use approx::assert_relative_eq;
use sensei::movement::{MovementConfig, detect_movement_gaps, detect_significant_movements};
use sensei::pose::{Keypoint, Pose, PoseFrame};
use sensei::timing::{
    Direction, SpeedAssessment, TimingConfig, analyze_sequence_match, match_sequence_with_tolerance,
};

fn standing(dx: f64) -> Pose {
    let parts = [
        ("nose", 320.0, 80.0),
        ("left_shoulder", 280.0, 150.0),
        ("right_shoulder", 360.0, 150.0),
        ("left_hip", 290.0, 300.0),
        ("right_hip", 350.0, 300.0),
    ];
    Pose::new(
        parts
            .iter()
            .map(|&(name, x, y)| Keypoint::new(name, x + dx, y, 0.9))
            .collect(),
    )
}

/// Right leg with the knee bent to `knee_deg`.
fn leg(knee_deg: f64) -> Pose {
    let bend = (180.0 - knee_deg).to_radians();
    Pose::new(vec![
        Keypoint::new("right_hip", 0.0, 0.0, 0.9),
        Keypoint::new("right_knee", 0.0, 100.0, 0.9),
        Keypoint::new("right_ankle", 100.0 * bend.sin(), 100.0 + 100.0 * bend.cos(), 0.9),
    ])
}

/// Frames every 100 ms; the body steps sideways by 10 px at `shift_frame`.
fn stepping_history(frames: usize, shift_frame: usize) -> Vec<PoseFrame> {
    (0..frames)
        .map(|i| {
            let dx = if i >= shift_frame { 10.0 } else { 0.0 };
            PoseFrame::new(standing(dx), i as f64 * 100.0)
        })
        .collect()
}

#[test]
fn knee_extension_is_a_movement() {
    let history: Vec<PoseFrame> = [180.0, 180.0, 150.0, 150.0, 150.0]
        .iter()
        .enumerate()
        .map(|(i, &deg)| PoseFrame::new(leg(deg), i as f64 * 33.0))
        .collect();
    let events = detect_significant_movements(&history);
    assert!(events.contains(&66.0));
}

#[test]
fn in_place_angle_change_without_displacement() {
    // Only the angle check can see this: a huge displacement threshold rules
    // the displacement check out.
    let config = MovementConfig::new().with_displacement_threshold(1e9);
    let history: Vec<PoseFrame> = [180.0, 180.0, 150.0]
        .iter()
        .enumerate()
        .map(|(i, &deg)| PoseFrame::new(leg(deg), i as f64 * 33.0))
        .collect();
    assert_eq!(config.detect_movements(&history), vec![66.0]);

    let tolerant = config.with_angle_change_threshold(45.0);
    assert!(tolerant.detect_movements(&history).is_empty());
}

#[test]
fn static_history_has_no_movements() {
    let history: Vec<PoseFrame> = (0..5)
        .map(|i| PoseFrame::new(standing(0.0), i as f64 * 33.0))
        .collect();
    assert!(detect_significant_movements(&history).is_empty());
}

#[test]
fn step_produces_two_events() {
    let history = stepping_history(8, 4);
    assert_eq!(detect_significant_movements(&history), vec![400.0, 500.0]);
}

#[test]
fn long_stillness_is_a_gap() {
    let history = stepping_history(20, 5);
    let gaps = detect_movement_gaps(&history);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].start, 700.0);
    assert_eq!(gaps[0].end, 1900.0);
    assert_relative_eq!(gaps[0].duration(), 1200.0);
}

#[test]
fn timing_matching_is_idempotent() {
    let events = [120.0, 480.0, 1310.0, 2000.0];
    let result = match_sequence_with_tolerance(&events, &events, 300.0);
    assert_eq!(result.matched_movements, events.len());
    assert_eq!(result.avg_delay, 0.0);
    assert!(!result.has_timing_issue);
}

#[test]
fn consistent_lag_is_a_timing_issue() {
    let reference = [1000.0, 2000.0, 3000.0, 4000.0];
    let user = [1350.0, 2400.0, 3320.0, 4380.0];
    let result = match_sequence_with_tolerance(&user, &reference, 500.0);
    assert_eq!(result.matched_movements, 4);
    assert_relative_eq!(result.avg_delay, 362.5);
    assert!(result.has_consistent_direction);
    assert!(result.significant_delay);
    assert!(result.has_timing_issue);
    assert_eq!(result.direction, Direction::Behind);

    let early: Vec<f64> = reference.iter().map(|t| t - 400.0).collect();
    let result = match_sequence_with_tolerance(&early, &reference, 500.0);
    assert_eq!(result.direction, Direction::Ahead);
    assert!(result.has_timing_issue);
}

#[test]
fn sequence_analysis_of_late_user() {
    let reference = stepping_history(20, 5);
    let user = stepping_history(20, 9);

    let analysis = TimingConfig::new()
        .with_tolerance_ms(500.0)
        .analyze(&user, &reference)
        .unwrap();

    assert_eq!(analysis.timing.matched_delays, vec![300.0, 400.0]);
    assert!(analysis.has_delays);
    assert_eq!(analysis.timing.direction, Direction::Behind);
    assert_eq!(analysis.speed, SpeedAssessment::Good);
    assert_eq!(analysis.user_gaps.len(), 2);
    assert_eq!(analysis.reference_gaps.len(), 1);
    assert!(!analysis.has_extra_gaps);
}

#[test]
fn sequence_analysis_detects_slow_user() {
    let reference = stepping_history(12, 5);
    let user: Vec<PoseFrame> = stepping_history(12, 5)
        .into_iter()
        .map(|f| PoseFrame::new(f.pose, f.timestamp * 2.0))
        .collect();
    let analysis = analyze_sequence_match(&user, &reference).unwrap();
    assert_eq!(analysis.speed, SpeedAssessment::Slow);
}
