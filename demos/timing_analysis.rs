//! Timing Analysis Example
//!
//! This example checks whether a student keeps pace with the instructor:
//! - Building pose histories with a delayed technique
//! - Detecting movement events and stillness gaps
//! - Matching events and reporting lag and speed

use log::info;
use sensei::movement::{detect_movement_gaps, detect_significant_movements};
use sensei::pose::{Keypoint, Pose, PoseFrame};
use sensei::timing::{TimingConfig, find_best_matching_pose};

/// Stance with the right leg kicked out to `knee_deg`, shifted by `dx` pixels.
fn stance(knee_deg: f64, dx: f64) -> Pose {
    let bend = (180.0 - knee_deg).to_radians();
    Pose::new(vec![
        Keypoint::new("left_shoulder", 280.0 + dx, 150.0, 0.9),
        Keypoint::new("right_shoulder", 360.0 + dx, 150.0, 0.9),
        Keypoint::new("left_hip", 290.0 + dx, 300.0, 0.9),
        Keypoint::new("right_hip", 350.0 + dx, 300.0, 0.9),
        Keypoint::new("right_knee", 350.0 + dx, 400.0, 0.9),
        Keypoint::new(
            "right_ankle",
            350.0 + dx + 100.0 * bend.sin(),
            400.0 + 100.0 * bend.cos(),
            0.9,
        ),
    ])
}

/// 30 frames at 10 fps with a front kick starting at `kick_frame`.
fn performance(kick_frame: usize) -> Vec<PoseFrame> {
    (0..30)
        .map(|i| {
            let knee = if (kick_frame..kick_frame + 4).contains(&i) { 100.0 } else { 180.0 };
            PoseFrame::new(stance(knee, 0.0), i as f64 * 100.0)
        })
        .collect()
}

fn main() {
    env_logger::init();
    info!("Timing Analysis Example");

    let reference = performance(8);
    let student = performance(12);

    // Movement events
    let reference_events = detect_significant_movements(&reference);
    let student_events = detect_significant_movements(&student);
    info!("Reference movements at {reference_events:?} ms");
    info!("Student movements at {student_events:?} ms");

    // Stillness gaps
    for gap in detect_movement_gaps(&student) {
        info!("  - student still from {} to {} ms", gap.start, gap.end);
    }

    // Full analysis
    let config = TimingConfig::new().with_tolerance_ms(500.0);
    match config.analyze(&student, &reference) {
        Some(analysis) => {
            let timing = &analysis.timing;
            info!(
                "\nMatched {} of {} movements, mean delay {:.0} ms ({:?})",
                timing.matched_movements, timing.total_movements, timing.avg_delay, timing.direction
            );
            info!("Timing issue: {}", analysis.has_delays);
            info!("Extra pauses: {}", analysis.has_extra_gaps);
            info!("Speed: {:?}", analysis.speed);
        }
        None => info!("Not enough frames for a timing analysis"),
    }

    // Nearest reference frame for a student moment
    if let Some(best) = find_best_matching_pose(1250.0, &reference, 100.0) {
        info!(
            "\nReference frame nearest to 1250 ms: {} ms (offset {:+.0} ms, in window: {})",
            best.frame.timestamp, best.offset_ms, best.within_window
        );
    }
}
