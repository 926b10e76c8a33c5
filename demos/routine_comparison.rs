//! Routine Comparison Example
//!
//! This example compares a student's kata against the instructor's:
//! - Building multi-joint angle routines
//! - Scoring the whole routine with FastDTW
//! - Scoring one joint with exact DTW and listing its error windows

use log::info;
use ndarray::Array2;
use sensei::align::DEFAULT_RADIUS;
use sensei::scoring::{compare_angles_with_dtw, compare_routines};

const JOINTS: [&str; 4] = ["left_elbow", "right_elbow", "left_knee", "right_knee"];

fn main() {
    env_logger::init();
    info!("Routine Comparison Example");

    // Instructor performs the form in 90 frames, the student takes 120.
    let instructor = Array2::from_shape_fn((90, JOINTS.len()), |(t, k)| {
        120.0 + 50.0 * (t as f64 * 0.07 + k as f64).sin()
    });
    let student = Array2::from_shape_fn((120, JOINTS.len()), |(t, k)| {
        let drift = if k == 1 && (50..80).contains(&t) { 25.0 } else { 0.0 };
        120.0 + 50.0 * (t as f64 * 0.0525 + k as f64).sin() + drift
    });
    info!(
        "Instructor: {} frames, student: {} frames, {} joints\n",
        instructor.nrows(),
        student.nrows(),
        JOINTS.len()
    );

    // Whole routine
    let routine = compare_routines(&instructor, &student, DEFAULT_RADIUS).unwrap();
    info!("Overall score: {}", routine.overall_score);
    info!("Alignment path: {} steps", routine.alignment_path.len());
    for (joint, error) in JOINTS.iter().zip(routine.joint_errors.iter()) {
        info!("  - {joint}: mean error {error:.1} deg");
    }

    // Single joint
    let reference: Vec<f64> = instructor.column(1).to_vec();
    let user: Vec<f64> = student.column(1).to_vec();
    let joint = compare_angles_with_dtw(&user, &reference, JOINTS[1]);
    info!("\n{} score: {} (distance {:.4})", joint.joint, joint.score, joint.distance);
    for window in &joint.error_windows {
        info!(
            "  - steps {}..={}: {:.1} deg off on average",
            window.start, window.end, window.avg_error
        );
    }
}
