//! Onset detection and re-basing of the velocity trace.

use crate::error::{DataError, StepIdError};
use crate::types::{AlignedVelocitySample, VelocityPoint, VelocitySample};

/// Time of the first adjacent pair with `earlier <= threshold < later`.
///
/// Returns the earlier point's time, or `CrossingNotFound`.
pub fn rising_edge_time<P: VelocityPoint>(points: &[P], threshold: f64) -> Result<i64, StepIdError> {
    points
        .windows(2)
        .find(|w| w[0].velocity() <= threshold && threshold < w[1].velocity())
        .map(|w| w[0].time())
        .ok_or(StepIdError::CrossingNotFound { threshold })
}

/// Velocity trace starting at the onset of motion.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Device time of the onset in the original trace.
    pub alignment_time: i64,
    /// Samples at or after the onset, with `time - alignment_time`.
    pub samples: Vec<AlignedVelocitySample>,
}

/// Find the onset (rising edge through `threshold`) and re-base the trace
/// so the onset is time 0. Samples before the onset are dropped.
///
/// A re-based time that does not fit in an `i64` is a `DataError`.
pub fn align(velocities: &[VelocitySample], threshold: f64) -> Result<Alignment, StepIdError> {
    let alignment_time = rising_edge_time(velocities, threshold)?;
    let samples = velocities
        .iter()
        .enumerate()
        .filter(|(_, v)| v.time >= alignment_time)
        .map(|(index, v)| {
            let time = v
                .time
                .checked_sub(alignment_time)
                .ok_or(DataError::TimeOverflow {
                    index,
                    prev: alignment_time,
                    next: v.time,
                })?;
            Ok(AlignedVelocitySample {
                time,
                velocity: v.velocity,
            })
        })
        .collect::<Result<Vec<_>, StepIdError>>()?;
    tracing::debug!(alignment_time, threshold, "onset found");
    Ok(Alignment {
        alignment_time,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    fn trace(points: &[(i64, f64)]) -> Vec<VelocitySample> {
        points
            .iter()
            .map(|&(time, velocity)| VelocitySample {
                time,
                phase: Phase::Step,
                velocity,
            })
            .collect()
    }

    #[test]
    fn crossing_requires_strictly_above_on_the_later_sample() {
        let v = trace(&[(0, 0.0), (10, 0.0), (20, 0.5), (30, 1.0)]);
        assert_eq!(rising_edge_time(&v, 0.0).unwrap(), 10);
        assert_eq!(rising_edge_time(&v, 0.5).unwrap(), 20);
    }

    #[test]
    fn starting_above_threshold_is_not_a_crossing() {
        let v = trace(&[(0, 2.0), (10, 3.0), (20, 4.0)]);
        assert_eq!(
            rising_edge_time(&v, 1.0),
            Err(StepIdError::CrossingNotFound { threshold: 1.0 })
        );
    }

    #[test]
    fn falling_edges_are_ignored() {
        let v = trace(&[(0, 5.0), (10, 0.0), (20, -1.0), (30, 2.0)]);
        assert_eq!(rising_edge_time(&v, 0.0).unwrap(), 20);
    }

    #[test]
    fn empty_and_single_traces_have_no_crossing() {
        assert!(rising_edge_time::<VelocitySample>(&[], 0.0).is_err());
        assert!(rising_edge_time(&trace(&[(0, 1.0)]), 0.0).is_err());
    }

    #[test]
    fn onset_too_far_from_the_tail_is_a_data_error() {
        let v = trace(&[(i64::MIN, 0.0), (-1, 1.0), (i64::MAX - 1, 2.0)]);
        let err = align(&v, 0.0).unwrap_err();
        assert_eq!(
            err,
            StepIdError::Data(DataError::TimeOverflow {
                index: 2,
                prev: i64::MIN,
                next: i64::MAX - 1
            })
        );
    }

    #[test]
    fn align_drops_pre_onset_and_rebases() {
        let v = trace(&[(0, 0.0), (10, 0.0), (20, 3.0), (30, 4.0)]);
        let a = align(&v, 0.0).unwrap();
        assert_eq!(a.alignment_time, 10);
        let got: Vec<(i64, f64)> = a.samples.iter().map(|s| (s.time, s.velocity)).collect();
        assert_eq!(got, vec![(0, 0.0), (10, 3.0), (20, 4.0)]);
    }
}
