//! Timing and lag diagnostics between user and reference movement events.
//!
//! User events are matched to their nearest reference event within a
//! tolerance window. The signed delays reveal whether the user runs
//! systematically behind or ahead of the reference, and how consistently.

use log::debug;

use crate::movement::{MovementConfig, MovementGap};
use crate::pose::PoseFrame;

/// Maximum distance, in milliseconds, between matched events.
pub const DEFAULT_TOLERANCE_MS: f64 = 300.0;

/// Mean absolute delay, in milliseconds, above which a delay is significant.
pub const SIGNIFICANT_DELAY_MS: f64 = 300.0;

/// Share of matched delays that must agree in sign for a consistent direction.
pub const CONSISTENCY_RATIO: f64 = 0.7;

/// Duration ratio (user / reference) above which the user is too slow.
pub const SLOW_RATIO: f64 = 1.25;

/// Duration ratio (user / reference) below which the user is too fast.
pub const FAST_RATIO: f64 = 0.75;

/// Histories must have more frames than this to be analysed as sequences.
pub const MIN_SEQUENCE_FRAMES: usize = 10;

/// Which side of the reference the user is on, on average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// User moves after the reference (positive mean delay)
    Behind,
    /// User moves before the reference, or exactly with it
    Ahead,
}

/// Overall pace of the user relative to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedAssessment {
    Good,
    Slow,
    Fast,
}

/// Result of matching user events against reference events.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingMatch {
    /// Mean signed delay (user - reference) over matched events, 0 if none
    pub avg_delay: f64,
    /// Number of user events with a reference event within tolerance
    pub matched_movements: usize,
    /// `max(user events, reference events)`
    pub total_movements: usize,
    /// `matched / max(user events, reference events, 1)`
    pub match_quality: f64,
    /// At least 70% of matched delays share the majority sign
    pub has_consistent_direction: bool,
    /// `|avg_delay|` exceeds the significant-delay threshold
    pub significant_delay: bool,
    /// Significant and consistent
    pub has_timing_issue: bool,
    pub direction: Direction,
    /// Signed delay of every matched user event, in user-event order
    pub matched_delays: Vec<f64>,
}

/// Timing analysis of two complete pose histories.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceAnalysis {
    pub timing: TimingMatch,
    /// Same as `timing.has_timing_issue`
    pub has_delays: bool,
    /// The user paused more than once beyond the reference's pauses
    pub has_extra_gaps: bool,
    pub speed: SpeedAssessment,
    pub user_gaps: Vec<MovementGap>,
    pub reference_gaps: Vec<MovementGap>,
}

/// Reference frame closest in time to a query timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch<'a> {
    pub frame: &'a PoseFrame,
    /// `frame.timestamp - query`, in milliseconds
    pub offset_ms: f64,
    /// Whether the frame lies within the search window
    pub within_window: bool,
}

/// Configuration for timing analysis.
///
/// # Example
/// ```
/// use sensei::timing::TimingConfig;
///
/// let config = TimingConfig::new().with_tolerance_ms(150.0);
/// let result = config.match_events(&[1000.0, 2000.0], &[1100.0, 2400.0]);
/// assert_eq!(result.matched_movements, 1);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Matching tolerance in milliseconds
    pub tolerance_ms: f64,
    /// Significant mean delay in milliseconds
    pub significant_delay_ms: f64,
    /// Required share of same-sign delays
    pub consistency_ratio: f64,
    /// Duration ratio above which the user is slow
    pub slow_ratio: f64,
    /// Duration ratio below which the user is fast
    pub fast_ratio: f64,
    /// Frame count histories must exceed for sequence analysis
    pub min_sequence_frames: usize,
    /// Event and gap detection settings
    pub movement: MovementConfig,
}

impl TimingConfig {
    /// Create a timing configuration with the default tuning.
    pub fn new() -> Self {
        Self {
            tolerance_ms: DEFAULT_TOLERANCE_MS,
            significant_delay_ms: SIGNIFICANT_DELAY_MS,
            consistency_ratio: CONSISTENCY_RATIO,
            slow_ratio: SLOW_RATIO,
            fast_ratio: FAST_RATIO,
            min_sequence_frames: MIN_SEQUENCE_FRAMES,
            movement: MovementConfig::default(),
        }
    }

    /// Set the matching tolerance.
    pub fn with_tolerance_ms(mut self, tolerance_ms: f64) -> Self {
        self.tolerance_ms = tolerance_ms;
        self
    }

    /// Set the significant mean delay.
    pub fn with_significant_delay_ms(mut self, significant_delay_ms: f64) -> Self {
        self.significant_delay_ms = significant_delay_ms;
        self
    }

    /// Set the required share of same-sign delays.
    pub fn with_consistency_ratio(mut self, ratio: f64) -> Self {
        self.consistency_ratio = ratio;
        self
    }

    /// Set the duration ratio bounds for the speed assessment.
    pub fn with_speed_ratios(mut self, fast_ratio: f64, slow_ratio: f64) -> Self {
        self.fast_ratio = fast_ratio;
        self.slow_ratio = slow_ratio;
        self
    }

    /// Set the event and gap detection settings.
    pub fn with_movement(mut self, movement: MovementConfig) -> Self {
        self.movement = movement;
        self
    }

    /// Match each user event to its nearest reference event.
    ///
    /// Neither list has to be sorted. On equal distances the earlier
    /// reference event in the list wins. A match counts only when the
    /// nearest reference event is within `tolerance_ms` (inclusive).
    pub fn match_events(&self, user_events: &[f64], reference_events: &[f64]) -> TimingMatch {
        let mut matched_delays = Vec::new();

        for &user_time in user_events {
            let nearest = reference_events
                .iter()
                .copied()
                .fold(None, |best: Option<f64>, ref_time| match best {
                    Some(b) if (user_time - b).abs() <= (user_time - ref_time).abs() => Some(b),
                    _ => Some(ref_time),
                });

            if let Some(ref_time) = nearest {
                if (user_time - ref_time).abs() <= self.tolerance_ms {
                    matched_delays.push(user_time - ref_time);
                }
            }
        }

        let matched_movements = matched_delays.len();
        let avg_delay = if matched_movements > 0 {
            matched_delays.iter().sum::<f64>() / matched_movements as f64
        } else {
            0.0
        };

        let behind = matched_delays.iter().filter(|&&d| d > 0.0).count();
        let ahead = matched_delays.iter().filter(|&&d| d < 0.0).count();
        let majority_share = if matched_movements > 0 {
            behind.max(ahead) as f64 / matched_movements as f64
        } else {
            0.0
        };

        let has_consistent_direction = majority_share >= self.consistency_ratio;
        let significant_delay = avg_delay.abs() > self.significant_delay_ms;
        let total_movements = user_events.len().max(reference_events.len());

        TimingMatch {
            avg_delay,
            matched_movements,
            total_movements,
            match_quality: matched_movements as f64 / total_movements.max(1) as f64,
            has_consistent_direction,
            significant_delay,
            has_timing_issue: significant_delay && has_consistent_direction,
            direction: if avg_delay > 0.0 {
                Direction::Behind
            } else {
                Direction::Ahead
            },
            matched_delays,
        }
    }

    /// Compare the overall durations of two performances.
    pub fn assess_speed(&self, user_duration: f64, reference_duration: f64) -> SpeedAssessment {
        if reference_duration <= 0.0 {
            return SpeedAssessment::Good;
        }
        let ratio = user_duration / reference_duration;
        if ratio > self.slow_ratio {
            SpeedAssessment::Slow
        } else if ratio < self.fast_ratio {
            SpeedAssessment::Fast
        } else {
            SpeedAssessment::Good
        }
    }

    /// Full timing analysis of two pose histories.
    ///
    /// Returns `None` unless both histories have more than
    /// `min_sequence_frames` frames.
    pub fn analyze(
        &self,
        user_history: &[PoseFrame],
        reference_history: &[PoseFrame],
    ) -> Option<SequenceAnalysis> {
        if user_history.len() <= self.min_sequence_frames
            || reference_history.len() <= self.min_sequence_frames
        {
            debug!(
                "sequence analysis skipped: {} user frames, {} reference frames",
                user_history.len(),
                reference_history.len()
            );
            return None;
        }

        let user_events = self.movement.detect_movements(user_history);
        let reference_events = self.movement.detect_movements(reference_history);
        let timing = self.match_events(&user_events, &reference_events);

        let user_gaps = self.movement.detect_gaps(user_history);
        let reference_gaps = self.movement.detect_gaps(reference_history);
        let has_extra_gaps = user_gaps.len() > reference_gaps.len() + 1;

        let speed = self.assess_speed(duration(user_history), duration(reference_history));

        debug!(
            "sequence analysis: {} of {} movements matched, mean delay {:.0} ms, speed {:?}",
            timing.matched_movements, timing.total_movements, timing.avg_delay, speed
        );

        Some(SequenceAnalysis {
            has_delays: timing.has_timing_issue,
            timing,
            has_extra_gaps,
            speed,
            user_gaps,
            reference_gaps,
        })
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn duration(history: &[PoseFrame]) -> f64 {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) if history.len() > 1 => last.timestamp - first.timestamp,
        _ => 0.0,
    }
}

/// Match user events to reference events with the default configuration.
///
/// # Arguments
/// * `user_events` - User movement timestamps in milliseconds
/// * `reference_events` - Reference movement timestamps in milliseconds
/// * `tolerance_ms` - Maximum matching distance, see [`DEFAULT_TOLERANCE_MS`]
///
/// # Example
/// ```
/// use sensei::timing::{Direction, match_sequence_with_tolerance};
///
/// let user = [1400.0, 2450.0, 3380.0];
/// let reference = [1000.0, 2100.0, 3000.0];
/// let result = match_sequence_with_tolerance(&user, &reference, 500.0);
/// assert_eq!(result.matched_movements, 3);
/// assert!(result.has_timing_issue);
/// assert_eq!(result.direction, Direction::Behind);
/// ```
pub fn match_sequence_with_tolerance(
    user_events: &[f64],
    reference_events: &[f64],
    tolerance_ms: f64,
) -> TimingMatch {
    TimingConfig::new()
        .with_tolerance_ms(tolerance_ms)
        .match_events(user_events, reference_events)
}

/// Speed assessment from overall durations with the default ratios.
pub fn assess_speed(user_duration: f64, reference_duration: f64) -> SpeedAssessment {
    TimingConfig::default().assess_speed(user_duration, reference_duration)
}

/// Full timing analysis of two pose histories with the default configuration.
pub fn analyze_sequence_match(
    user_history: &[PoseFrame],
    reference_history: &[PoseFrame],
) -> Option<SequenceAnalysis> {
    TimingConfig::default().analyze(user_history, reference_history)
}

/// Find the reference frame nearest in time to `timestamp`.
///
/// When no frame lies within `window_ms`, the nearest frame is still returned
/// with `within_window` unset. On equal distances the earlier frame in the
/// history wins. `None` only for an empty history.
pub fn find_best_matching_pose(
    timestamp: f64,
    history: &[PoseFrame],
    window_ms: f64,
) -> Option<BestMatch<'_>> {
    let mut best: Option<&PoseFrame> = None;
    for frame in history {
        let closer = best.is_none_or(|b| {
            (frame.timestamp - timestamp).abs() < (b.timestamp - timestamp).abs()
        });
        if closer {
            best = Some(frame);
        }
    }

    best.map(|frame| {
        let offset_ms = frame.timestamp - timestamp;
        BestMatch {
            frame,
            offset_ms,
            within_window: offset_ms.abs() <= window_ms,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Pose;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_events() {
        let events = [100.0, 500.0, 900.0];
        let result = match_sequence_with_tolerance(&events, &events, DEFAULT_TOLERANCE_MS);
        assert_eq!(result.matched_movements, 3);
        assert_eq!(result.avg_delay, 0.0);
        assert!(!result.has_consistent_direction);
        assert!(!result.has_timing_issue);
        assert_eq!(result.direction, Direction::Ahead);
        assert_relative_eq!(result.match_quality, 1.0);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let result = match_sequence_with_tolerance(&[1300.0], &[1000.0], 300.0);
        assert_eq!(result.matched_movements, 1);
        let result = match_sequence_with_tolerance(&[1300.5], &[1000.0], 300.0);
        assert_eq!(result.matched_movements, 0);
        assert_eq!(result.total_movements, 1);
        assert_eq!(result.match_quality, 0.0);
    }

    #[test]
    fn test_nearest_reference_chosen() {
        let result = match_sequence_with_tolerance(&[1000.0], &[700.0, 1100.0, 900.0], 300.0);
        assert_eq!(result.matched_delays, vec![-100.0]);
    }

    #[test]
    fn test_equal_distance_prefers_first() {
        let result = match_sequence_with_tolerance(&[1000.0], &[1100.0, 900.0], 300.0);
        assert_eq!(result.matched_delays, vec![-100.0]);
    }

    #[test]
    fn test_mixed_direction_not_consistent() {
        let user = [1250.0, 1750.0, 3250.0];
        let reference = [1000.0, 2000.0, 3000.0];
        let result = match_sequence_with_tolerance(&user, &reference, 300.0);
        assert_eq!(result.matched_delays, vec![250.0, -250.0, 250.0]);
        assert!(!result.has_consistent_direction);
        assert!(!result.significant_delay);
    }

    #[test]
    fn test_empty_lists() {
        let result = match_sequence_with_tolerance(&[], &[], 300.0);
        assert_eq!(result.matched_movements, 0);
        assert_eq!(result.total_movements, 0);
        assert_eq!(result.match_quality, 0.0);
        assert_eq!(result.avg_delay, 0.0);
    }

    #[test]
    fn test_speed_assessment() {
        assert_eq!(assess_speed(1300.0, 1000.0), SpeedAssessment::Slow);
        assert_eq!(assess_speed(700.0, 1000.0), SpeedAssessment::Fast);
        assert_eq!(assess_speed(1250.0, 1000.0), SpeedAssessment::Good);
        assert_eq!(assess_speed(750.0, 1000.0), SpeedAssessment::Good);
        assert_eq!(assess_speed(5000.0, 0.0), SpeedAssessment::Good);
    }

    #[test]
    fn test_best_matching_pose() {
        let history: Vec<PoseFrame> = [0.0, 100.0, 200.0, 300.0]
            .iter()
            .map(|&t| PoseFrame::new(Pose::default(), t))
            .collect();

        let best = find_best_matching_pose(140.0, &history, 50.0).unwrap();
        assert_eq!(best.frame.timestamp, 100.0);
        assert_relative_eq!(best.offset_ms, -40.0);
        assert!(best.within_window);

        let far = find_best_matching_pose(1000.0, &history, 300.0).unwrap();
        assert_eq!(far.frame.timestamp, 300.0);
        assert!(!far.within_window);

        assert!(find_best_matching_pose(0.0, &[], 300.0).is_none());
    }

    #[test]
    fn test_analyze_needs_enough_frames() {
        let history: Vec<PoseFrame> = (0..10)
            .map(|i| PoseFrame::new(Pose::default(), i as f64 * 100.0))
            .collect();
        assert!(analyze_sequence_match(&history, &history).is_none());
    }
}
