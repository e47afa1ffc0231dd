//! Suspicious time windows over time-sampled scores.

use atrust_core::TimeWindow;

/// Window shaping options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentOptions {
    /// Half-width of each window in seconds.
    pub pad_secs: f64,
    /// Collapse overlapping windows into one.
    pub merge: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            pad_secs: 0.25,
            merge: false,
        }
    }
}

/// One window per sample at or above `threshold`, centred on `index / fps`.
///
/// Samples without content (`None` upstream) should simply not be passed
/// in. Windows keep sample order and are independent unless
/// `options.merge` is set.
pub fn extract_segments(
    samples: &[(usize, f64)],
    fps: f64,
    threshold: f64,
    options: &SegmentOptions,
) -> Vec<TimeWindow> {
    if !(fps.is_finite() && fps > 0.0) {
        return Vec::new();
    }
    let pad = options.pad_secs.max(0.0);

    let windows: Vec<TimeWindow> = samples
        .iter()
        .filter(|(_, score)| *score >= threshold)
        .map(|(index, _)| {
            let t = *index as f64 / fps;
            TimeWindow::new((t - pad).max(0.0), t + pad)
        })
        .collect();

    if options.merge {
        merge_overlapping(windows)
    } else {
        windows
    }
}

fn merge_overlapping(mut windows: Vec<TimeWindow>) -> Vec<TimeWindow> {
    windows.sort_by(|a, b| a.start.total_cmp(&b.start));
    let mut merged: Vec<TimeWindow> = Vec::with_capacity(windows.len());
    for w in windows {
        match merged.last_mut() {
            Some(last) if last.overlaps(&w) => last.end = last.end.max(w.end),
            _ => merged.push(w),
        }
    }
    merged
}

/// Evidence severity for `count` emitted windows; `None` when there are none.
pub fn segment_severity(count: usize) -> Option<u8> {
    match count {
        0 => None,
        1 | 2 => Some(3),
        _ => Some(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_window_per_qualifying_sample() {
        let windows = extract_segments(
            &[(0, 0.8), (1, 0.3), (2, 0.9)],
            2.0,
            0.65,
            &SegmentOptions::default(),
        );
        assert_eq!(
            windows,
            vec![TimeWindow::new(0.0, 0.25), TimeWindow::new(0.75, 1.25)]
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        let windows = extract_segments(&[(4, 0.65)], 2.0, 0.65, &SegmentOptions::default());
        assert_eq!(windows, vec![TimeWindow::new(1.75, 2.25)]);
    }

    #[test]
    fn overlapping_windows_stay_separate_by_default() {
        let samples = [(0, 0.9), (1, 0.9), (2, 0.9)];
        let windows = extract_segments(&samples, 4.0, 0.5, &SegmentOptions::default());
        assert_eq!(windows.len(), 3);
    }

    #[test]
    fn merge_collapses_overlaps() {
        let samples = [(0, 0.9), (1, 0.9), (2, 0.9), (10, 0.9)];
        let opts = SegmentOptions { pad_secs: 0.25, merge: true };
        let windows = extract_segments(&samples, 4.0, 0.5, &opts);
        assert_eq!(
            windows,
            vec![TimeWindow::new(0.0, 0.75), TimeWindow::new(2.25, 2.75)]
        );
    }

    #[test]
    fn invalid_fps_emits_nothing() {
        assert!(extract_segments(&[(0, 1.0)], 0.0, 0.5, &SegmentOptions::default()).is_empty());
    }

    #[test]
    fn severity_by_count() {
        assert_eq!(segment_severity(0), None);
        assert_eq!(segment_severity(1), Some(3));
        assert_eq!(segment_severity(2), Some(3));
        assert_eq!(segment_severity(3), Some(4));
        assert_eq!(segment_severity(40), Some(4));
    }
}
