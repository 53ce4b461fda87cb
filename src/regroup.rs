//! Regrouping fine-grained series into coarser step-function bars.
//!
//! Half-hourly usage is too noisy to read directly; averaging blocks of k
//! intervals (a day, a week) and rendering the result as flat-topped bars is
//! what makes the longer-term shape visible. The output is a pair of arrays
//! with duplicated x boundaries, suitable for area fills: the polyline rises
//! from the zero baseline at the first block edge and returns to it after the
//! last.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegroupError {
    #[error("group size must be at least 1, got {0}")]
    InvalidGroupSize(usize),
    #[error("series lengths differ: {times} timestamps vs {values} values")]
    LengthMismatch { times: usize, values: usize },
}

/// Groups `values` into blocks of `k`, averaging each block, and emits bar
/// outline arrays: y holds each block average twice (top of the bar at both
/// edges) framed by the zero baseline, and x holds the matching block-end
/// timestamps.
///
/// A trailing partial block shorter than `k` is dropped. With fewer than `k`
/// input points the result is empty.
pub fn step_bars(
    times: &[i64],
    values: &[f64],
    k: usize,
) -> Result<(Vec<i64>, Vec<f64>), RegroupError> {
    if k == 0 {
        return Err(RegroupError::InvalidGroupSize(k));
    }
    if times.len() != values.len() {
        return Err(RegroupError::LengthMismatch {
            times: times.len(),
            values: values.len(),
        });
    }

    let blocks = times.len() / k;
    if blocks == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    let block_ends: Vec<i64> = (0..blocks).map(|i| times[i * k + k - 1]).collect();
    let block_means: Vec<f64> = (0..blocks)
        .map(|i| values[i * k..(i + 1) * k].iter().sum::<f64>() / k as f64)
        .collect();

    let mut x = Vec::with_capacity(2 * blocks + 2);
    let mut y = Vec::with_capacity(2 * blocks + 2);
    x.extend([block_ends[0], block_ends[0]]);
    y.extend([0.0, block_means[0]]);
    for i in 1..blocks {
        x.extend([block_ends[i], block_ends[i]]);
        y.extend([block_means[i - 1], block_means[i]]);
    }
    x.extend([block_ends[blocks - 1], block_ends[blocks - 1]]);
    y.extend([block_means[blocks - 1], 0.0]);

    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_of_values_average_into_step_bars() {
        let times = [10, 20, 30, 40];
        let values = [1.0, 2.0, 3.0, 4.0];

        let (x, y) = step_bars(&times, &values, 2).unwrap();
        assert_eq!(y, vec![0.0, 1.5, 1.5, 3.5, 3.5, 0.0]);
        assert_eq!(x, vec![20, 20, 40, 40, 40, 40]);
        assert_eq!(x.len(), y.len());
        // Starts and ends on the zero baseline.
        assert_eq!(y[0], 0.0);
        assert_eq!(*y.last().unwrap(), 0.0);
    }

    #[test]
    fn group_size_one_yields_one_bar_per_value() {
        let times = [10, 20, 30];
        let values = [5.0, 7.0, 6.0];

        let (x, y) = step_bars(&times, &values, 1).unwrap();
        assert_eq!(x.len(), 2 * 3 + 2);
        assert_eq!(y, vec![0.0, 5.0, 5.0, 7.0, 7.0, 6.0, 6.0, 0.0]);
    }

    #[test]
    fn trailing_partial_group_is_truncated() {
        let times = [10, 20, 30, 40, 50];
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];

        let (x, y) = step_bars(&times, &values, 2).unwrap();
        // The fifth point does not fill a block of 2 and is dropped.
        assert_eq!(y, vec![0.0, 1.5, 1.5, 3.5, 3.5, 0.0]);
        assert!(!x.contains(&50));
    }

    #[test]
    fn fewer_points_than_the_group_size_yields_empty_output() {
        let (x, y) = step_bars(&[10, 20], &[1.0, 2.0], 5).unwrap();
        assert!(x.is_empty());
        assert!(y.is_empty());
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert_eq!(
            step_bars(&[10], &[1.0], 0).unwrap_err(),
            RegroupError::InvalidGroupSize(0)
        );
        assert_eq!(
            step_bars(&[10, 20], &[1.0], 1).unwrap_err(),
            RegroupError::LengthMismatch { times: 2, values: 1 }
        );
    }
}
