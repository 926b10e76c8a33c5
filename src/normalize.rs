//! Min-max rescaling of scalar time series into `[0, 1]`.

/// Output value for elements that carry no usable signal.
pub const NEUTRAL_MIDPOINT: f64 = 0.5;

/// Output value for a constant, all-negative series.
pub const NEGATIVE_CONSTANT_LEVEL: f64 = 0.25;

/// Output value for a constant, all-positive series.
pub const POSITIVE_CONSTANT_LEVEL: f64 = 0.75;

/// Rescale a series into `[0, 1]` with min-max scaling.
///
/// Non-finite values are ignored when computing the range and individually
/// map to [`NEUTRAL_MIDPOINT`]. Degenerate inputs never produce NaN:
///
/// - no finite values at all: every element becomes `0.5`
/// - constant series: every element becomes `0.5` when the constant is zero,
///   `0.25` when negative and `0.75` when positive
///
/// # Example
/// ```
/// use sensei::normalize::normalize_sequence;
///
/// assert_eq!(normalize_sequence(&[1.0, 2.0, 3.0]), vec![0.0, 0.5, 1.0]);
/// assert_eq!(normalize_sequence(&[-5.0, -5.0]), vec![0.25, 0.25]);
/// ```
pub fn normalize_sequence(sequence: &[f64]) -> Vec<f64> {
    if sequence.is_empty() {
        return Vec::new();
    }

    let (min, max) = finite_range(sequence);
    let (min, max) = match (min, max) {
        (Some(min), Some(max)) => (min, max),
        _ => return vec![NEUTRAL_MIDPOINT; sequence.len()],
    };

    if min == max {
        let level = if max == 0.0 {
            NEUTRAL_MIDPOINT
        } else if max < 0.0 {
            NEGATIVE_CONSTANT_LEVEL
        } else {
            POSITIVE_CONSTANT_LEVEL
        };
        return vec![level; sequence.len()];
    }

    let span = max - min;
    sequence
        .iter()
        .map(|&v| {
            if v.is_finite() {
                (v - min) / span
            } else {
                NEUTRAL_MIDPOINT
            }
        })
        .collect()
}

/// Keep only the finite values of a series, preserving order.
pub fn finite_values(sequence: &[f64]) -> Vec<f64> {
    sequence.iter().copied().filter(|v| v.is_finite()).collect()
}

fn finite_range(sequence: &[f64]) -> (Option<f64>, Option<f64>) {
    sequence
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((None, None), |(lo, hi), v| {
            (
                Some(lo.map_or(v, |lo: f64| lo.min(v))),
                Some(hi.map_or(v, |hi: f64| hi.max(v))),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_linear_ramp() {
        let out = normalize_sequence(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let expected = [0.0, 0.25, 0.5, 0.75, 1.0];
        for (got, want) in out.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_normalize_constant_levels() {
        assert_eq!(normalize_sequence(&[5.0, 5.0, 5.0]), vec![0.75; 3]);
        assert_eq!(normalize_sequence(&[0.0, 0.0]), vec![0.5; 2]);
        assert_eq!(normalize_sequence(&[-5.0, -5.0]), vec![0.25; 2]);
    }

    #[test]
    fn test_normalize_non_finite_elements() {
        let out = normalize_sequence(&[0.0, f64::NAN, 10.0, f64::INFINITY]);
        assert_eq!(out, vec![0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_normalize_all_invalid() {
        let out = normalize_sequence(&[f64::NAN, f64::NEG_INFINITY]);
        assert_eq!(out, vec![0.5, 0.5]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_sequence(&[]).is_empty());
    }

    #[test]
    fn test_finite_values() {
        let kept = finite_values(&[1.0, f64::NAN, 2.0, f64::INFINITY, 3.0]);
        assert_eq!(kept, vec![1.0, 2.0, 3.0]);
    }
}
