/// A contiguous run of aligned steps whose error exceeds the threshold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorWindow {
    /// Index of the first step in the run
    pub start: usize,
    /// Index of the last step in the run (inclusive)
    pub end: usize,
    /// Mean error over the run
    pub avg_error: f64,
}

/// Find runs of at least `min_len` consecutive errors above `threshold`.
///
/// A run opens on the first value strictly above `threshold` and closes on
/// the first value at or below it. A run still open at the end of the input
/// closes on the last index.
///
/// # Example
/// ```
/// use sensei::scoring::find_error_windows;
///
/// let errors = [2.0, 20.0, 30.0, 25.0, 5.0, 40.0];
/// let windows = find_error_windows(&errors, 15.0, 3);
/// assert_eq!(windows.len(), 1);
/// assert_eq!((windows[0].start, windows[0].end), (1, 3));
/// assert_eq!(windows[0].avg_error, 25.0);
/// ```
pub fn find_error_windows(errors: &[f64], threshold: f64, min_len: usize) -> Vec<ErrorWindow> {
    let mut windows = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &e) in errors.iter().enumerate() {
        match (start, e > threshold) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                push_window(&mut windows, errors, s, i - 1, min_len);
                start = None;
            }
            _ => {}
        }
    }

    if let Some(s) = start {
        push_window(&mut windows, errors, s, errors.len() - 1, min_len);
    }

    windows
}

fn push_window(windows: &mut Vec<ErrorWindow>, errors: &[f64], start: usize, end: usize, min_len: usize) {
    let run = &errors[start..=end];
    if run.len() < min_len {
        return;
    }
    windows.push(ErrorWindow {
        start,
        end,
        avg_error: run.iter().sum::<f64>() / run.len() as f64,
    });
}
