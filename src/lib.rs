//! Motion-sequence comparison for martial-arts coaching.
//!
//! Sensei compares a student's performance of a technique or form against an
//! instructor's reference. Poses come in as confidence-scored keypoints from
//! an upstream estimator; the crate derives joint angles, aligns sequences of
//! different speeds with Dynamic Time Warping, and turns the alignment into a
//! 0-100 similarity score, localized error windows and timing diagnostics.
//!
//! # Features
//!
//! - **Alignment** - exact DTW on scalar and vector series, FastDTW
//!   (multi-resolution, radius-constrained) for long routines
//! - **Scoring** - logistic per-joint scores, sustained error windows,
//!   per-frame routine similarity
//! - **Timing** - movement event detection, tolerance-based event matching,
//!   systematic lag and pace diagnostics, stillness gaps
//! - **Poses** - joint angles from keypoints, static technique classification
//!   against a reference store
//!
//! # Quick Start
//!
//! ```rust
//! use sensei::scoring::compare_angles_with_dtw;
//!
//! let reference = [90.0, 100.0, 120.0, 150.0, 170.0];
//! let user = [90.0, 92.0, 101.0, 119.0, 151.0, 168.0];
//!
//! let result = compare_angles_with_dtw(&user, &reference, "right_elbow");
//! assert!(result.score > 50);
//! assert!(result.error_windows.is_empty());
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`normalize`] | Min-max normalization of angle series |
//! | [`align`] | DTW, FastDTW, distance metrics, search windows |
//! | [`scoring`] | Joint scores, error windows, routine comparison |
//! | [`pose`] | Keypoints, joint angles, reference pose store |
//! | [`movement`] | Movement events and stillness gaps |
//! | [`timing`] | Event matching, lag and speed diagnostics |
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Degenerate but well-formed input (empty
//! sequences, too few valid samples) is not an error: it yields the
//! documented "incomparable" or empty result instead.
//!
//! # Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade at `debug`
//! and `trace` level. Install any logger, e.g. `env_logger`, to see them.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `serde` | `Serialize`/`Deserialize` for result and configuration types |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod align;
pub mod movement;
pub mod normalize;
pub mod pose;
pub mod scoring;
pub mod timing;
